//! MIDI Commander
//!
//! Listens to note events from a MIDI controller and launches
//! platform-specific shell commands for mapped pads.

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod device;
mod dispatcher;
mod launcher;
mod mapping;
mod midi;
mod platform;

use crate::config::AppConfig;
use crate::device::MidiListener;
use crate::dispatcher::Dispatcher;
use crate::launcher::ShellLauncher;
use crate::mapping::MappingTable;
use crate::platform::Platform;

/// MIDI Commander - launch shell commands from MIDI controller pads
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a pad mapping file (YAML); uses the built-in layout when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// MIDI input port (index or name substring); prompts interactively when omitted
    #[arg(short, long)]
    port: Option<String>,

    /// List available MIDI input ports
    #[arg(long)]
    list_ports: bool,

    /// Print the resolved pad mappings and exit
    #[arg(long)]
    show_mappings: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    if args.list_ports {
        list_ports_formatted()?;
        return Ok(());
    }

    // Load configuration (file or embedded default)
    let config = match &args.config {
        Some(path) => {
            info!("Loading mappings from {}", path);
            AppConfig::load(path).await?
        }
        None => AppConfig::default_embedded()?,
    };

    let platform = Platform::current();
    let table = MappingTable::from_entries(config.pads)?;
    info!("Loaded {} pad mappings (platform: {})", table.len(), platform);

    if args.show_mappings {
        show_mappings(&table, platform);
        return Ok(());
    }

    // Open the input device
    let mut listener = MidiListener::new();
    let selection = args.port.as_deref().or(config.midi.port.as_deref());
    let port_name = connect_input(&mut listener, selection)?;

    let mut event_rx = listener
        .take_event_receiver()
        .ok_or_else(|| anyhow::anyhow!("Event receiver already taken"))?;

    let dispatcher = Dispatcher::new(table, platform, Box::new(ShellLauncher));

    println!("\n{}", "=== MIDI Commander ===".bold().cyan());
    println!("Connected to: {}", port_name.bright_white());
    println!("Press a pad to launch its command, Ctrl+C to quit.\n");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    // Events are processed strictly in arrival order; command launches are
    // fire-and-forget and never stall the loop.
    loop {
        tokio::select! {
            maybe_message = event_rx.recv() => {
                match maybe_message {
                    Some(message) => dispatcher.handle(&message),
                    None => {
                        info!("MIDI event stream ended");
                        break;
                    }
                }
            }

            _ = &mut shutdown => {
                break;
            }
        }
    }

    listener.disconnect();
    info!("MIDI Commander shutdown complete");
    Ok(())
}

/// Pick and connect an input port: explicit selection when given, otherwise an
/// indexed list with a single interactive prompt.
fn connect_input(listener: &mut MidiListener, selection: Option<&str>) -> Result<String> {
    let ports = MidiListener::list_input_ports()?;
    if ports.is_empty() {
        bail!("No MIDI input ports found. Is the controller connected?");
    }

    if let Some(selection) = selection {
        return listener.connect_matching(selection);
    }

    println!("{}", "Available MIDI input ports:".bold());
    for (i, name) in ports.iter().enumerate() {
        println!("  [{}] {}", i, name);
    }

    let index = device::prompt_port_index(ports.len())?;
    listener.connect_by_index(index)
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}

fn list_ports_formatted() -> Result<()> {
    println!("\n{}", "=== Available MIDI Input Ports ===".bold().cyan());

    let ports = MidiListener::list_input_ports()?;
    if ports.is_empty() {
        println!("  {}", "No input ports found".dimmed());
    } else {
        for (i, name) in ports.iter().enumerate() {
            println!("  [{}] {}", i.to_string().green(), name);
        }
    }

    println!();
    Ok(())
}

fn show_mappings(table: &MappingTable, platform: Platform) {
    println!("\n{}", "=== Pad Mappings ===".bold().cyan());
    println!("Platform: {}\n", platform.to_string().bright_white());

    for pad in table.iter_sorted() {
        let command = pad
            .command
            .resolve(platform)
            .map(|c| c.green())
            .unwrap_or_else(|| "(no command for this platform)".dimmed());

        println!("  [{:3}] {:40} {}", pad.note.to_string().yellow(), pad.name, command);
    }

    println!();
}
