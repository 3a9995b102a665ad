use clap::Subcommand;
use serde_json::json;

use crate::cli::context::{CliContext, TerminalConfirm};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::dashboard::Dashboard;
use crate::error::ApiError;
use crate::guard::Navigation;
use crate::records::DeleteOutcome;
use crate::types::UserId;

#[derive(Subcommand)]
pub enum UsersCommands {
    #[command(about = "List all users")]
    List,

    #[command(about = "Create a user")]
    Create {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Update a user; omitted fields keep their current value")]
    Update {
        #[arg(help = "User ID")]
        id: UserId,
        #[arg(long, help = "New display name")]
        name: Option<String>,
        #[arg(long, help = "New email address")]
        email: Option<String>,
        #[arg(long, help = "New password (left unchanged if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Delete a user")]
    Delete {
        #[arg(help = "User ID")]
        id: UserId,
        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },
}

pub async fn handle(cmd: UsersCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut dashboard = match Dashboard::open(ctx.records.clone()).await {
        Navigation::Render(dashboard) => dashboard,
        Navigation::Redirect(route) => {
            return Err(report(
                &output_format,
                ApiError::unauthorized(format!("Not logged in. Login first (see {}).", route)),
            ));
        }
    };

    // The first fetch already ran; a 401 there has ended the session
    if ctx.session.current_user().is_none() {
        let notice = dashboard.notice().unwrap_or_default().to_string();
        return Err(report(&output_format, ApiError::unauthorized(notice)));
    }

    match cmd {
        UsersCommands::List => {
            if let Some(notice) = dashboard.notice() {
                tracing::warn!("user list unavailable: {}", notice);
                eprintln!("Warning: {}", notice);
            }
            output_users(&output_format, dashboard.users())
        }
        UsersCommands::Create { name, email, password } => {
            let password = value_or_prompt(password, "Password")?;

            dashboard.open_add();
            if let Some(draft) = dashboard.draft_mut() {
                draft.name = name;
                draft.email = email;
                draft.password = password;
            }
            dashboard.submit().await.map_err(|e| report(&output_format, e))?;

            output_success(
                &output_format,
                "User added",
                Some(json!({ "users": dashboard.users() })),
            )
        }
        UsersCommands::Update { id, name, email, password } => {
            let Some(current) = dashboard.users().iter().find(|u| u.id == id).cloned() else {
                return Err(report(&output_format, missing_user(id, dashboard.notice())));
            };

            dashboard.open_edit(&current);
            if let Some(draft) = dashboard.draft_mut() {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(email) = email {
                    draft.email = email;
                }
                if let Some(password) = password {
                    draft.password = password;
                }
            }
            dashboard.submit().await.map_err(|e| report(&output_format, e))?;

            output_success(
                &output_format,
                &format!("User {} updated", id),
                Some(json!({ "users": dashboard.users() })),
            )
        }
        UsersCommands::Delete { id, yes } => {
            let outcome = dashboard
                .delete(id, &TerminalConfirm { assume_yes: yes })
                .await
                .map_err(|e| report(&output_format, e))?;

            match outcome {
                DeleteOutcome::Deleted => output_success(
                    &output_format,
                    &format!("User {} deleted", id),
                    Some(json!({ "users": dashboard.users() })),
                ),
                DeleteOutcome::Cancelled => output_success(&output_format, "Delete cancelled", None),
            }
        }
    }
}

// The list is empty with a notice when it could not be loaded; the user may
// still exist then
fn missing_user(id: UserId, notice: Option<&str>) -> ApiError {
    match notice {
        Some(notice) => ApiError::validation(format!("Cannot look up user {}: {}", id, notice)),
        None => ApiError::validation(format!("User {} not found", id)),
    }
}
