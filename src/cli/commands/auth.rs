use clap::Subcommand;
use serde_json::json;

use crate::cli::context::{CliContext, TerminalConfirm};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::dashboard::LOGOUT_PROMPT;
use crate::guard::{AccessGuard, Navigation};
use crate::records::Confirm;
use crate::session::Registration;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the backend and store the session")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Clear the stored session")]
    Logout {
        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Register new account")]
    Register {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Password confirmation (will prompt if not provided)")]
        password_confirmation: Option<String>,
    },
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = value_or_prompt(password, "Password")?;

            let outcome = ctx
                .session
                .login(&email, &password)
                .await
                .map_err(|e| report(&output_format, e))?;

            output_success(
                &output_format,
                &format!("{} Welcome, {}", outcome.message, outcome.user.name),
                Some(json!({ "user": outcome.user })),
            )
        }
        AuthCommands::Logout { yes } => {
            if !(TerminalConfirm { assume_yes: yes }).confirm(LOGOUT_PROMPT) {
                return output_success(&output_format, "Logout cancelled", None);
            }
            ctx.session.logout();
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let guard = AccessGuard::new(&ctx.session);
            match guard.protect(|user| user) {
                Navigation::Render(user) => output_success(
                    &output_format,
                    &format!("Logged in as {} <{}>", user.name, user.email),
                    Some(json!({ "authenticated": true, "user": user })),
                ),
                Navigation::Redirect(route) => output_success(
                    &output_format,
                    &format!("Not logged in (login at {})", route),
                    Some(json!({ "authenticated": false })),
                ),
            }
        }
        AuthCommands::Register { name, email, password, password_confirmation } => {
            let password = value_or_prompt(password, "Password")?;
            let password_confirmation = value_or_prompt(password_confirmation, "Confirm password")?;

            let registration = Registration {
                name,
                email,
                password,
                password_confirmation,
            };

            let message = ctx
                .session
                .register(&registration)
                .await
                .map_err(|e| report(&output_format, e))?;

            output_success(
                &output_format,
                &format!("{} You can now log in as {}", message, registration.email),
                Some(json!({ "email": registration.email })),
            )
        }
    }
}
