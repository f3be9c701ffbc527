use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::console::Console;
use crate::cli::utils::{output_empty_collection, output_success, output_value, StdinConfirm};
use crate::cli::OutputFormat;
use crate::content::folders::DELETE_FOLDER_PROMPT;
use crate::content::{Confirm, FileUpload, FolderManager, FolderSummary};
use crate::navigation::FOLDERS_PATH;

#[derive(Subcommand)]
pub enum FolderCommands {
    #[command(about = "List folders by order with their video counts")]
    List,

    #[command(about = "Create a folder, optionally with a logo image")]
    Create {
        #[arg(help = "Folder name")]
        name: String,
        #[arg(long, help = "Path to a logo image")]
        logo: Option<PathBuf>,
    },

    #[command(about = "Rename a folder and/or replace its logo")]
    Update {
        #[arg(help = "Folder id")]
        id: Uuid,
        #[arg(long, help = "New name (keeps the current one if omitted)")]
        name: Option<String>,
        #[arg(long, help = "Path to a replacement logo image")]
        logo: Option<PathBuf>,
    },

    #[command(about = "Delete a folder after confirmation; its videos are kept")]
    Delete {
        #[arg(help = "Folder id")]
        id: Uuid,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle(cmd: FolderCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::restore().await?;
    console.require(FOLDERS_PATH)?;

    let folders = console.folders().await?;
    let listed = folders.list().await?;

    match cmd {
        FolderCommands::List => print_folders(&output_format, &listed),
        FolderCommands::Create { name, logo } => {
            let logo = read_image(logo).await?;
            folders.create(&name, logo).await?;
            output_success(
                &output_format,
                &format!("Folder '{}' created", name.trim()),
                Some(json!({ "folders": folders.folders().await })),
            )
        }
        FolderCommands::Update { id, name, logo } => {
            let name = match name {
                Some(name) => name,
                None => current_name(&listed, id)?,
            };
            let logo = read_image(logo).await?;
            folders.update(id, &name, logo).await?;
            output_success(
                &output_format,
                &format!("Folder {} updated", id),
                Some(json!({ "folders": folders.folders().await })),
            )
        }
        FolderCommands::Delete { id, yes } => delete(&folders, id, yes, &output_format).await,
    }
}

async fn delete(folders: &FolderManager, id: Uuid, yes: bool, output_format: &OutputFormat) -> anyhow::Result<()> {
    folders.request_delete(id).await;

    let confirmed = yes || StdinConfirm.confirm(DELETE_FOLDER_PROMPT);
    if !confirmed {
        folders.cancel_delete().await;
        return output_success(output_format, "Delete cancelled", Some(json!({ "deleted": false })));
    }

    folders.confirm_delete().await?;
    output_success(
        output_format,
        &format!("Folder {} deleted", id),
        Some(json!({ "deleted": true, "folders": folders.folders().await })),
    )
}

fn current_name(listed: &[FolderSummary], id: Uuid) -> anyhow::Result<String> {
    listed
        .iter()
        .find(|f| f.folder.id == id)
        .map(|f| f.folder.name.clone())
        .ok_or_else(|| anyhow::anyhow!("Folder {} not found", id))
}

pub(crate) async fn read_image(path: Option<PathBuf>) -> anyhow::Result<Option<FileUpload>> {
    match path {
        Some(path) => {
            let upload = FileUpload::from_path(&path)
                .await
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?;
            Ok(Some(upload))
        }
        None => Ok(None),
    }
}

fn print_folders(output_format: &OutputFormat, folders: &[FolderSummary]) -> anyhow::Result<()> {
    if folders.is_empty() {
        return output_empty_collection(output_format, "folders", "No folders yet");
    }

    output_value(output_format, &json!({ "folders": folders }), || {
        println!("{:<38} {:>5} {:>6}  NAME", "ID", "ORDER", "VIDEOS");
        for summary in folders {
            println!(
                "{:<38} {:>5} {:>6}  {}",
                summary.folder.id, summary.folder.order, summary.video_count, summary.folder.name
            );
        }
    })
}
