use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    check_config::{self, CheckConfigArgs},
    diagram::{self, DiagramArgs},
    estimate::{self, EstimateArgs},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "fsim-sim", about = "Diagrammatic Monte Carlo toolbox")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate a parameter file.
    CheckConfig(CheckConfigArgs),
    /// Build or load a diagram, repair it and print its rendering.
    Diagram(DiagramArgs),
    /// Print the estimates stored in a monitor checkpoint.
    Estimate(EstimateArgs),
}

fn main() {
    // FSIM_LOG_FORMAT=json switches to machine-readable logs; logs go to stderr.
    let log_format = std::env::var("FSIM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fsim=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::CheckConfig(args) => check_config::run(&args),
        Command::Diagram(args) => diagram::run(&args),
        Command::Estimate(args) => estimate::run(&args),
    }
}
