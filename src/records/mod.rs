pub mod draft;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::response::extract_collection;
use crate::api::routes;
use crate::error::{ApiError, SESSION_EXPIRED_MESSAGE};
use crate::guard::{Navigator, Route};
use crate::session::SessionStore;
use crate::types::{User, UserId};
pub use draft::{CreatePayload, UpdatePayload, UserDraft};

pub const DELETE_PROMPT: &str = "Are you sure? This action cannot be undone.";

/// Blocking yes/no question put to the operator before a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// CRUD facade over `/v1/users`.
///
/// The token is read from the session on every call. A 401 from any call
/// ends the session and sends the navigator to the login route once per
/// failing request.
#[derive(Clone)]
pub struct RecordsManager {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl RecordsManager {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// All user records. A 2xx reply that is not JSON, or not a record
    /// array, yields an empty list.
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        let body = match self
            .authorized(Method::GET, routes::USERS, None::<&()>, "Error loading users.")
            .await
        {
            Ok(body) => body,
            Err(ApiError::UnexpectedResponse(detail)) => {
                tracing::warn!("unreadable user list reply, showing no records: {}", detail);
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let Some(items) = extract_collection(&body) else {
            tracing::warn!("unexpected user list shape, showing no records: {}", body);
            return Ok(Vec::new());
        };

        match serde_json::from_value::<Vec<User>>(Value::Array(items.clone())) {
            Ok(users) => Ok(users),
            Err(e) => {
                tracing::warn!("unreadable user records, showing none: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Validates the draft locally; nothing is sent when that fails.
    pub async fn create(&self, draft: &UserDraft) -> Result<(), ApiError> {
        let payload = draft.create_payload()?;
        self.authorized(Method::POST, routes::USERS, Some(&payload), "Error adding user.")
            .await?;
        tracing::info!("created user {}", payload.email);
        Ok(())
    }

    /// A blank password in the draft leaves the stored one unchanged.
    pub async fn update(&self, id: UserId, draft: &UserDraft) -> Result<(), ApiError> {
        let payload = draft.update_payload()?;
        self.authorized(
            Method::PUT,
            &routes::user(id),
            Some(&payload),
            "Error updating user.",
        )
        .await?;
        tracing::info!(user.id = id, password_changed = payload.password.is_some(), "updated user");
        Ok(())
    }

    /// Asks `confirm` first; a declined prompt sends nothing.
    pub async fn delete(&self, id: UserId, confirm: &dyn Confirm) -> Result<DeleteOutcome, ApiError> {
        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(user.id = id, "delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        self.authorized(Method::DELETE, &routes::user(id), None::<&()>, "Error deleting user.")
            .await?;
        tracing::info!(user.id = id, "deleted user");
        Ok(DeleteOutcome::Deleted)
    }

    async fn authorized<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        fallback: &str,
    ) -> Result<Value, ApiError> {
        let Some(token) = self.session.token() else {
            return Err(self.force_logout("no stored token"));
        };

        match self
            .session
            .client()
            .send(method, path, Some(&token), body, fallback)
            .await
        {
            Err(err) if err.is_unauthorized() => Err(self.force_logout(&err.to_string())),
            other => other,
        }
    }

    fn force_logout(&self, reason: &str) -> ApiError {
        tracing::warn!("session rejected ({}), logging out", reason);
        self.session.logout();
        self.navigator.redirect(Route::Login);
        ApiError::unauthorized(SESSION_EXPIRED_MESSAGE)
    }
}
