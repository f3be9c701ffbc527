use serde::Serialize;
use tracing::debug;

use crate::filter::FilterData;
use crate::remote::RecordStore;
use crate::types::Table;

use super::error::ContentError;

/// Headline numbers for the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub folders: i64,
    pub videos: i64,
    /// Videos per folder, rounded to the nearest whole number; 0 without folders
    pub average_per_folder: i64,
}

impl DashboardStats {
    pub fn new(folders: i64, videos: i64) -> Self {
        let average_per_folder = if folders > 0 {
            (videos as f64 / folders as f64).round() as i64
        } else {
            0
        };
        Self { folders, videos, average_per_folder }
    }
}

pub async fn fetch_stats(records: &dyn RecordStore) -> Result<DashboardStats, ContentError> {
    let (folders, videos) = futures::try_join!(
        records.count(Table::Folders, FilterData::new()),
        records.count(Table::Videos, FilterData::new()),
    )
    .map_err(ContentError::remote("load dashboard"))?;

    debug!("dashboard: {} folders, {} videos", folders, videos);
    Ok(DashboardStats::new(folders, videos))
}
