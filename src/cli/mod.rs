pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

#[derive(Parser)]
#[command(name = "wizard")]
#[command(about = "Nobl9 project wizard - validate, preview and submit project requests")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Validate a request file offline")]
    Validate {
        #[arg(help = "Request file (JSON or YAML)")]
        file: PathBuf,
    },

    #[command(about = "Show the objects a request would apply, without contacting Nobl9")]
    Plan {
        #[arg(help = "Request file (JSON or YAML)")]
        file: PathBuf,
    },

    #[command(about = "Submit a request file to a running wizard API")]
    Create {
        #[arg(help = "Request file (JSON or YAML)")]
        file: PathBuf,
        #[arg(long, env = "WIZARD_SERVER", default_value = DEFAULT_SERVER, help = "Wizard API base URL")]
        server: String,
    },

    #[command(about = "Check the health endpoint of a running wizard API")]
    Health {
        #[arg(long, env = "WIZARD_SERVER", default_value = DEFAULT_SERVER, help = "Wizard API base URL")]
        server: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Validate { file } => commands::validate::handle(&file, output_format),
        Commands::Plan { file } => commands::plan::handle(&file, output_format).await,
        Commands::Create { file, server } => {
            commands::create::handle(&file, &server, output_format).await
        }
        Commands::Health { server } => commands::health::handle(&server, output_format).await,
    }
}
