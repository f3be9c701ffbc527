use clap::Parser;
use portfolio_admin::cli::utils::output_error;
use portfolio_admin::cli::{Cli, OutputFormat};
use portfolio_admin::content::ContentError;
use portfolio_admin::session::SessionError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = portfolio_admin::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => output_error(&output_format, &user_message(&e), None)?,
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Content and session failures print the same message the web console shows
fn user_message(err: &anyhow::Error) -> String {
    if let Some(content) = err.downcast_ref::<ContentError>() {
        return content.user_message();
    }
    if let Some(session) = err.downcast_ref::<SessionError>() {
        return session.to_string();
    }
    err.to_string()
}
