pub mod commands;
pub mod config;
pub mod console;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Portfolio CLI - manage folders and videos of the portfolio site")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format instead of text")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the config directory and the record store tables")]
    Init,

    #[command(about = "Sign in, sign out and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Folder management")]
    Folders {
        #[command(subcommand)]
        cmd: commands::folders::FolderCommands,
    },

    #[command(about = "Video management within a folder")]
    Videos {
        #[command(subcommand)]
        cmd: commands::videos::VideoCommands,
    },

    #[command(about = "Folder and video totals")]
    Dashboard,

    #[command(about = "Show where a console path leads for the current session")]
    Open {
        #[arg(help = "Console path, e.g. /admin/folders")]
        path: String,
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
        Commands::Init => commands::init::handle(output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Folders { cmd } => commands::folders::handle(cmd, output_format).await,
        Commands::Videos { cmd } => commands::videos::handle(cmd, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(output_format).await,
        Commands::Open { path } => commands::open::handle(&path, output_format).await,
    }
}
