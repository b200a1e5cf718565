//! gearaxis - shifter to virtual gear axis
//!
//! Reads an H-pattern / sequential shifter over USB HID and exposes the
//! selected gear as one analog axis on a Linux uinput joystick.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod config;
mod dry_run;
mod error;
mod output;
mod runner;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{ListArgs, TableArgs};
use crate::config::RunArgs;

#[derive(Parser)]
#[command(name = "gearaxis")]
#[command(about = "Map an H-pattern / sequential shifter onto a virtual joystick gear axis")]
#[command(version)]
#[command(long_about = "
gearaxis reads a USB shifter (Thrustmaster TH8A/TH8RS by default) and writes
the selected gear to a single analog axis of a virtual joystick, so games
that only accept an analog gear input can use an H-pattern shifter.

Each forward gear gets its own axis position, reverse sits at the top of
the range and neutral at the center. In sequential mode up pins the axis
to the maximum and down to the minimum.
")]
struct Cli {
    /// Output in JSON format for machine parsing
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the shifter and drive the virtual axis until Ctrl-C
    Run(RunArgs),

    /// List attached HID devices
    List(ListArgs),

    /// Print the gear-to-axis table for a range
    Table(TableArgs),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("gearaxis={log_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            ExitCode::from(error::exit_code(&e))
        }
    }
}

fn execute_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::List(args) => commands::list::execute(args, cli.json),
        Commands::Table(args) => commands::table::execute(args, cli.json),
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}
