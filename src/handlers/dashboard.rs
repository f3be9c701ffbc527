use axum::extract::State;

use crate::content::{fetch_stats, DashboardStats};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /admin/dashboard - folder and video totals
pub async fn get(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let stats = fetch_stats(state.records.as_ref()).await?;
    Ok(ApiResponse::success(stats))
}
