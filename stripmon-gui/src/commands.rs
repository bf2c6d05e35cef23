use std::sync::Arc;

use stripmon_cli::CommandRegistry;

use crate::monitor::SharedMonitor;

/// Register the window-lifecycle commands. Every handler takes the global
/// monitor lock for its whole run, so a command never interleaves with the
/// frame pass.
pub fn install_commands(registry: &CommandRegistry, monitor: &SharedMonitor) {
    {
        let monitor = Arc::clone(monitor);
        let registry_handle = registry.clone();
        registry.add_cmd("AddPlotWindow", move |arg| {
            let name = arg.trim();
            monitor.lock().unwrap().add_plot_window(name)?;
            register_back_length(&registry_handle, &monitor, name);
            Ok(String::new())
        });
    }

    {
        let monitor = Arc::clone(monitor);
        registry.add_cmd("AddImageWindow", move |arg| {
            monitor.lock().unwrap().add_image_window(arg.trim())?;
            Ok(String::new())
        });
    }

    {
        let monitor = Arc::clone(monitor);
        let registry_handle = registry.clone();
        registry.add_cmd("RemoveWindow", move |arg| {
            let target = arg.trim();
            let removed = {
                let mut monitor = monitor.lock().unwrap();
                if monitor.manager.window_named(target).is_some() {
                    monitor.manager.remove_window_named(target)?
                } else if let Ok(index) = target.parse::<usize>() {
                    monitor.manager.remove_window(index)?
                } else {
                    return Err(format!("No window named '{target}'."));
                }
            };
            if removed.is_plot() {
                registry_handle.remove_cmd(&format!("{}_BackLength", removed.name()));
            }
            Ok(String::new())
        });
    }

    {
        let monitor = Arc::clone(monitor);
        let registry_handle = registry.clone();
        registry.add_cmd("RemoveAllWindows", move |_arg| {
            let removed = monitor.lock().unwrap().manager.remove_all();
            for window in &removed {
                if window.is_plot() {
                    registry_handle.remove_cmd(&format!("{}_BackLength", window.name()));
                }
            }
            // removing is always successful
            Ok(String::new())
        });
    }
}

/// Each plot window gets its own `<channel>_BackLength <seconds>` command
/// while it exists.
fn register_back_length(registry: &CommandRegistry, monitor: &SharedMonitor, name: &str) {
    let monitor = Arc::clone(monitor);
    let channel = name.to_string();
    registry.add_cmd(format!("{name}_BackLength"), move |arg| {
        let seconds: f64 = arg
            .trim()
            .parse()
            .map_err(|_| format!("Invalid back length '{}'.", arg.trim()))?;
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err("Back length must be a positive number of seconds.".to_string());
        }
        monitor
            .lock()
            .unwrap()
            .manager
            .set_back_length(&channel, seconds)?;
        Ok(String::new())
    });
}
