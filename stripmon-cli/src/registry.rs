use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A command handler: takes the argument remainder of the line, returns a
/// success message (may be empty) or a human-readable error.
pub type CommandFn = dyn Fn(&str) -> Result<String, String> + Send + Sync;

/// Shared name → handler table for the remote command interface.
///
/// Cloning yields another handle onto the same table, so windows can
/// register and unregister their own commands at runtime.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    inner: Arc<Mutex<HashMap<String, Arc<CommandFn>>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cmd<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        self.inner
            .lock()
            .unwrap()
            .insert(name.into(), Arc::new(handler));
    }

    pub fn remove_cmd(&self, name: &str) -> bool {
        self.inner.lock().unwrap().remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().unwrap().contains_key(name)
    }

    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Split a line into command name and argument and run the handler.
    ///
    /// The handler is cloned out of the table before the call, so a handler
    /// may itself add or remove commands without deadlocking.
    pub fn dispatch(&self, line: &str) -> Result<String, String> {
        let line = line.trim();
        if line.is_empty() {
            return Err("Empty command.".to_string());
        }
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        let handler = self.inner.lock().unwrap().get(name).cloned();
        match handler {
            Some(handler) => handler(arg),
            None => Err(format!("Unknown command '{name}'.")),
        }
    }
}
