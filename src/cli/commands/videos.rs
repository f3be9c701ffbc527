use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::console::Console;
use crate::cli::utils::{output_success, output_value, StdinConfirm};
use crate::cli::OutputFormat;
use crate::content::{Playback, VideoManager};
use crate::navigation::Route;

use super::folders::read_image;

#[derive(Subcommand)]
pub enum VideoCommands {
    #[command(about = "List the videos of a folder")]
    List {
        #[arg(help = "Folder id")]
        folder_id: String,
    },

    #[command(about = "Add a video to a folder")]
    Create {
        #[arg(help = "Folder id")]
        folder_id: String,
        #[arg(long, help = "Video title")]
        title: String,
        #[arg(long, help = "External video link")]
        url: String,
        #[arg(long, help = "Path to a thumbnail image")]
        thumbnail: Option<PathBuf>,
    },

    #[command(about = "Edit a video; omitted fields keep their values")]
    Update {
        #[arg(help = "Folder id")]
        folder_id: String,
        #[arg(help = "Video id")]
        video_id: Uuid,
        #[arg(long, help = "Video title")]
        title: Option<String>,
        #[arg(long, help = "External video link")]
        url: Option<String>,
        #[arg(long, help = "Path to a replacement thumbnail image")]
        thumbnail: Option<PathBuf>,
    },

    #[command(about = "Delete a video after confirmation")]
    Delete {
        #[arg(help = "Folder id")]
        folder_id: String,
        #[arg(help = "Video id")]
        video_id: Uuid,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

impl VideoCommands {
    fn folder_id(&self) -> &str {
        match self {
            VideoCommands::List { folder_id }
            | VideoCommands::Create { folder_id, .. }
            | VideoCommands::Update { folder_id, .. }
            | VideoCommands::Delete { folder_id, .. } => folder_id,
        }
    }
}

pub async fn handle(cmd: VideoCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::restore().await?;
    console.require(&Route::Videos(cmd.folder_id().to_string()).path())?;

    let videos = console.videos(cmd.folder_id()).await?;
    videos.load().await?;

    match cmd {
        VideoCommands::List { .. } => print_videos(&output_format, &videos).await,
        VideoCommands::Create { title, url, thumbnail, .. } => {
            let thumbnail = read_image(thumbnail).await?;
            videos.create(&title, &url, thumbnail).await?;
            output_success(
                &output_format,
                &format!("Video '{}' added", title),
                Some(json!({ "videos": videos.videos().await })),
            )
        }
        VideoCommands::Update { video_id, title, url, thumbnail, .. } => {
            let current = videos.find(video_id).await?;
            let title = title.unwrap_or(current.title);
            let url = url.unwrap_or(current.video_url);
            let thumbnail = read_image(thumbnail).await?;

            videos.update(video_id, &title, &url, thumbnail).await?;
            output_success(
                &output_format,
                &format!("Video {} updated", video_id),
                Some(json!({ "videos": videos.videos().await })),
            )
        }
        VideoCommands::Delete { video_id, yes, .. } => {
            let deleted = if yes {
                videos.delete(video_id, &true).await?
            } else {
                videos.delete(video_id, &StdinConfirm).await?
            };

            let message = if deleted { "Video deleted" } else { "Delete cancelled" };
            output_success(&output_format, message, Some(json!({ "deleted": deleted })))
        }
    }
}

async fn print_videos(output_format: &OutputFormat, videos: &VideoManager) -> anyhow::Result<()> {
    let folder = videos.folder().await;
    let list = videos.videos().await;
    let playback: Vec<Playback> = list.iter().map(|v| Playback::for_url(&v.video_url)).collect();

    let value = json!({ "folder": folder, "videos": list, "playback": playback });
    output_value(output_format, &value, || {
        if let Some(folder) = &folder {
            println!("Folder: {}", folder.name);
        }
        if list.is_empty() {
            println!("No videos in this folder");
        }
        for (video, playback) in list.iter().zip(&playback) {
            println!("{:>3}  {}  {}", video.order, video.title, playback.url());
        }
    })
}
