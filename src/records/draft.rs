use serde::Serialize;

use crate::error::ApiError;
use crate::types::User;
use crate::validation::{self, MIN_PASSWORD_LEN};

/// Form buffer behind the add and edit dialogs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePayload {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// `password` is left out entirely when unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePayload {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Edit buffer for an existing record; the password always starts blank
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
        }
    }

    pub fn create_payload(&self) -> Result<CreatePayload, ApiError> {
        let name = self.name.trim();
        let email = self.email.trim().to_lowercase();

        if name.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(ApiError::validation("All fields are required."));
        }
        validation::require_email(&email)?;
        validation::require_password_len(&self.password, MIN_PASSWORD_LEN)?;

        Ok(CreatePayload {
            name: name.to_string(),
            email,
            password: self.password.clone(),
        })
    }

    pub fn update_payload(&self) -> Result<UpdatePayload, ApiError> {
        let name = self.name.trim();
        let email = self.email.trim();

        if name.is_empty() || email.is_empty() {
            return Err(ApiError::validation("Name and email are required."));
        }
        validation::require_email(email)?;

        let password = if self.password.is_empty() {
            None
        } else {
            validation::require_password_len(&self.password, MIN_PASSWORD_LEN)?;
            Some(self.password.clone())
        };

        Ok(UpdatePayload {
            name: name.to_string(),
            email: email.to_string(),
            password,
        })
    }
}
