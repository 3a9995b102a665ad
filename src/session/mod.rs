pub mod storage;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{routes, ApiClient};
use crate::error::ApiError;
use crate::types::User;
use crate::validation::{self, MIN_PASSWORD_LEN, MIN_REGISTRATION_PASSWORD_LEN};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};

/// Storage key of the opaque bearer token
pub const TOKEN_KEY: &str = "authToken";
/// Storage key of the JSON-serialized user profile
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: User,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize)]
struct LoginReply {
    #[serde(default)]
    success: bool,
    token: Option<String>,
    user: Option<User>,
    message: Option<String>,
}

/// The authenticated-user context. Owns the storage the session lives in and
/// is handed to whatever needs to read or end the session.
pub struct SessionStore {
    client: ApiClient,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(client: ApiClient, storage: impl SessionStorage + 'static) -> Self {
        Self {
            client,
            storage: Box::new(storage),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Authenticate against `POST /login` and persist the session on success.
    ///
    /// Nothing is persisted unless the backend reports `success: true` with
    /// both a token and a user. A failed attempt leaves any previous session
    /// untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        validation::require_email(email)?;
        validation::require_password_len(password, MIN_PASSWORD_LEN)?;

        let payload = json!({ "email": email, "password": password });
        let reply = self
            .client
            .send(Method::POST, routes::LOGIN, None, Some(&payload), "Unknown error.")
            .await?;

        let reply: LoginReply = serde_json::from_value(reply)
            .map_err(|e| ApiError::unexpected_response(e.to_string()))?;

        if !reply.success {
            return Err(ApiError::unauthorized(
                reply.message.unwrap_or_else(|| "Invalid credentials.".to_string()),
            ));
        }

        let (Some(token), Some(user)) = (reply.token, reply.user) else {
            return Err(ApiError::unexpected_response(
                "login reply is missing the token or the user",
            ));
        };

        self.persist(&token, &user)?;
        tracing::info!(user.id = user.id, "logged in as {}", user.email);

        Ok(LoginOutcome {
            user,
            message: reply.message.unwrap_or_else(|| "Login successful.".to_string()),
        })
    }

    /// Create an account through `POST /register`. Does not log in.
    pub async fn register(&self, registration: &Registration) -> Result<String, ApiError> {
        if registration.name.trim().is_empty() {
            return Err(ApiError::validation("Name is required."));
        }
        if registration.password != registration.password_confirmation {
            return Err(ApiError::validation("Passwords do not match."));
        }
        validation::require_password_len(&registration.password, MIN_REGISTRATION_PASSWORD_LEN)?;
        validation::require_email(&registration.email)?;

        let reply = self
            .client
            .send(
                Method::POST,
                routes::REGISTER,
                None,
                Some(registration),
                "An error occurred.",
            )
            .await?;

        tracing::info!("registered {}", registration.email);

        Ok(reply
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Registration successful.")
            .to_string())
    }

    /// Clear the persisted session. Safe to call when already logged out.
    pub fn logout(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                tracing::warn!("failed to clear {} from session storage: {}", key, e);
            }
        }
        tracing::info!("session cleared");
    }

    /// The persisted user, or `None` when it is missing or unreadable
    pub fn current_user(&self) -> Option<User> {
        let raw = self.storage.get_item(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!("ignoring unparsable stored user: {}", e);
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get_item(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn session(&self) -> Option<Session> {
        Some(Session {
            token: self.token()?,
            user: self.current_user()?,
        })
    }

    fn persist(&self, token: &str, user: &User) -> Result<(), ApiError> {
        let serialized = serde_json::to_string(user).map_err(StorageError::from)?;

        self.storage.set_item(TOKEN_KEY, token)?;
        if let Err(e) = self.storage.set_item(USER_KEY, &serialized) {
            if let Err(rollback) = self.storage.remove_item(TOKEN_KEY) {
                tracing::warn!("failed to roll back {} after a partial login: {}", TOKEN_KEY, rollback);
            }
            return Err(e.into());
        }
        Ok(())
    }
}
