use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use feed::{Feed, InProcessFeed};
use stripmon_core::settings::{load_or_default, MonitorSettings};
use stripmon_cli::server::spawn_server;
use stripmon_cli::CommandRegistry;
use stripmon_gui::images::FileImageSource;
use stripmon_gui::{install_commands, run_gui, GuiConfig, Monitor, WindowManager};

mod sim;

#[derive(Parser)]
#[command(name = "stripmon", version, about = "Tiled strip-chart monitor for live control-system channels")]
struct Cli {
    /// Settings file (TOML); missing file means defaults
    #[arg(long, default_value = "stripmon.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one command line to a running monitor and print the reply
    Send {
        /// Command listener address; defaults to the configured one
        #[arg(long)]
        addr: Option<String>,
        /// e.g. `AddPlotWindow sim:sine` or `sim:sine_BackLength 120`
        command: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = load_or_default(&cli.config)?;

    match cli.command {
        Some(Commands::Send { addr, command }) => {
            if command.is_empty() {
                eprintln!("Nothing to send.");
                return Ok(());
            }
            let addr = addr.unwrap_or_else(|| settings.command_bind.clone());
            match stripmon_cli::send_command(&addr, &command.join(" ")) {
                Ok(reply) => println!("{reply}"),
                Err(err) => eprintln!("{err}"),
            }
            Ok(())
        }
        None => run_monitor(settings),
    }
}

fn run_monitor(settings: MonitorSettings) -> Result<(), Box<dyn std::error::Error>> {
    let epoch = Instant::now();
    let feed = Arc::new(InProcessFeed::new());
    let publisher = feed.publisher();
    let feed_dyn: Arc<dyn Feed> = feed;

    let placeholder = format!(
        "No windows. Connect to {} and AddPlotWindow.",
        settings.command_bind
    );
    let manager = WindowManager::new(
        settings.width as f64,
        settings.height as f64,
        &placeholder,
    );
    let monitor = Monitor::new(
        manager,
        feed_dyn,
        Arc::new(FileImageSource::new(settings.image_dir.as_str())),
        settings.default_back_length,
        epoch,
    )
    .into_shared();

    let registry = CommandRegistry::new();
    install_commands(&registry, &monitor);
    let (addr, _server) = spawn_server(&settings.command_bind, registry)?;
    println!("Command listener on {addr}");

    sim::spawn_simulator(settings.sim_channels.clone(), publisher, epoch);

    let config = GuiConfig {
        title: settings.title.clone(),
        width: settings.width,
        height: settings.height,
    };
    run_gui(config, monitor)?;
    Ok(())
}
