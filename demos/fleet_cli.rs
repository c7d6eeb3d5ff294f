//! CLI for a persisted fleet of Wiz lights.
//!
//! Run with: cargo run --example fleet_cli -- --help

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wiz_fleet::{DeviceRecord, DispatchReport, Fleet, FleetConfig, Outcome, PowerState};

#[derive(Parser)]
#[command(name = "wiz-fleet")]
#[command(about = "Discover and control a fleet of Wiz smart lights", long_about = None)]
struct Cli {
    /// Registry file
    #[arg(short, long, global = true, default_value = "wiz-fleet.json")]
    registry: PathBuf,

    /// Optional JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover bulbs and refresh every known bulb
    Scan,

    /// Turn bulbs on ("all", an IP address or a name)
    On { target: String },

    /// Turn bulbs off
    Off { target: String },

    /// Activate a scene by id (e.g. 3 = Sunset, 14 = Night light)
    Scene { target: String, scene_id: u16 },

    /// Activate a scene, or switch off bulbs already showing it
    Toggle { target: String, scene_id: u16 },

    /// List the registry without contacting any bulb
    List,

    /// Show one bulb from the registry
    Show { address: String },

    /// Give a bulb a display name
    Rename { address: String, name: String },

    /// Forget a bulb
    Delete { address: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FleetConfig::load(path)?,
        None => FleetConfig::default(),
    };
    let fleet = Fleet::open(&cli.registry, config).await?;

    match cli.command {
        Commands::Scan => {
            println!(
                "Scanning for Wiz lights ({}s window)...",
                fleet.config().discovery_window().as_secs()
            );
            print_records(&fleet.scan().await?);
        }
        Commands::On { target } => print_report(&fleet.power_on(&target).await?),
        Commands::Off { target } => print_report(&fleet.power_off(&target).await?),
        Commands::Scene { target, scene_id } => {
            print_report(&fleet.activate_scene(&target, scene_id).await?)
        }
        Commands::Toggle { target, scene_id } => {
            print_report(&fleet.toggle_scene(&target, scene_id).await?)
        }
        Commands::List => print_records(&fleet.list_all().await?),
        Commands::Show { address } => print_records(&[fleet.list_one(&address).await?]),
        Commands::Rename { address, name } => {
            print_records(&[fleet.rename(&address, &name).await?])
        }
        Commands::Delete { address } => {
            let removed = fleet.delete(&address).await?;
            println!("Removed {} ({})", removed.display_name(), removed.address());
        }
    }

    Ok(())
}

fn power_label(state: PowerState) -> &'static str {
    match state {
        PowerState::Offline => "OFFLINE",
        PowerState::Off => "OFF",
        PowerState::On => "ON",
    }
}

fn print_records(records: &[DeviceRecord]) {
    if records.is_empty() {
        println!("No lights known.");
        return;
    }
    for record in records {
        println!(
            "  {:15}  {:20}  {:7}  {}",
            record.address(),
            record.display_name(),
            power_label(record.power_state()),
            record.active_scene_name()
        );
    }
}

fn print_report(report: &DispatchReport) {
    if report.is_empty() {
        println!("No online lights to control.");
        return;
    }
    for target in &report.targets {
        let note = match &target.outcome {
            Outcome::Applied => String::from("ok"),
            Outcome::CommandFailed(reason) => format!("command failed: {}", reason),
            Outcome::Offline => String::from("unreachable"),
        };
        println!(
            "  {:15}  {:20}  {:7}  {}  ({}: {})",
            target.record.address(),
            target.record.display_name(),
            power_label(target.record.power_state()),
            target.record.active_scene_name(),
            target.action,
            note
        );
    }
}
