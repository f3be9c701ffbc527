use serde_json::json;

use crate::cli::console::Console;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;
use crate::content::fetch_stats;
use crate::navigation::DASHBOARD_PATH;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::restore().await?;
    console.require(DASHBOARD_PATH)?;

    let records = console.records().await?;
    let stats = fetch_stats(records.as_ref()).await?;

    output_value(&output_format, &json!(stats), || {
        println!("Folders:            {}", stats.folders);
        println!("Videos:             {}", stats.videos);
        println!("Average per folder: {}", stats.average_per_folder);
    })
}
