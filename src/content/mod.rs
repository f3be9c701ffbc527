//! Folder and video management workflows.
//!
//! Each manager owns its in-memory snapshot and replaces it wholesale after
//! every mutation by re-running its list/load query.

pub mod dashboard;
pub mod error;
pub mod folders;
pub mod models;
pub mod playback;
pub mod upload;
pub mod videos;

pub use dashboard::{fetch_stats, DashboardStats};
pub use error::ContentError;
pub use folders::FolderManager;
pub use models::{Folder, FolderSummary, Video};
pub use playback::Playback;
pub use upload::FileUpload;
pub use videos::{Confirm, VideoManager};
