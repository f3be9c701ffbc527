use serde_json::json;

use crate::cli::config::get_config_dir;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::remote::PgRecordStore;

/// Create the config directory and apply the record store schema
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config_dir = get_config_dir()?;

    let store = PgRecordStore::connect(&config().database).await?;
    store.health_check().await?;
    store.apply_schema().await?;

    output_success(
        &output_format,
        "Initialized configuration and record store schema",
        Some(json!({ "config_dir": config_dir.display().to_string() })),
    )
}
