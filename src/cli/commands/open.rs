use serde_json::json;

use crate::cli::console::Console;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;
use crate::navigation::{navigate, Navigation};

/// Print the guard's decision for a console path
pub async fn handle(path: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::restore().await?;
    let outcome = navigate(path, &console.session.state());

    output_value(&output_format, &json!(outcome), || match &outcome {
        Navigation::Loading => println!("{}: loading", path),
        Navigation::Redirect { to } => println!("{} -> {}", path, to),
        Navigation::Render { route } => println!("{}: render {}", path, route.path()),
    })
}
