use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{clear_session, save_session};
use crate::cli::console::Console;
use crate::cli::utils::{output_success, output_value, prompt_line};
use crate::cli::OutputFormat;
use crate::navigation::{AFTER_LOGIN_PATH, AFTER_LOGOUT_PATH};
use crate::session::SessionError;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and forget the stored session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::restore().await?;

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_line("Password: ")?,
            };

            let user = console.session.login(email.trim(), &password).await?;
            if let Some(session) = console.session.current_session().await {
                save_session(&session)?;
            }

            output_success(
                &output_format,
                &format!("Signed in as {}", user.email.as_deref().unwrap_or(&email)),
                Some(json!({ "user": user, "redirect": AFTER_LOGIN_PATH })),
            )
        }
        AuthCommands::Logout => {
            let result = console.session.logout().await;
            clear_session()?;

            match result {
                Ok(()) => {}
                Err(SessionError::NotSignedIn) => {
                    return output_success(&output_format, "Not signed in", None);
                }
                Err(e) => tracing::warn!("Remote sign-out failed: {}", e),
            }

            output_success(
                &output_format,
                "Signed out",
                Some(json!({ "redirect": AFTER_LOGOUT_PATH })),
            )
        }
        AuthCommands::Status => {
            let state = console.session.state();
            let value = json!({ "session": state });

            output_value(&output_format, &value, || match state.user() {
                Some(user) => println!("Signed in as {}", user.email.as_deref().unwrap_or("<no email>")),
                None => println!("Not signed in"),
            })
        }
    }
}
