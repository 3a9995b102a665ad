// Client-side error taxonomy
use thiserror::Error;

pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to connect to the server. Please check your connection.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Every failure a view can be handed. Callers branch on `kind()`, never on
/// the raw response shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    // Client-side validation, blocks the request
    #[error("{0}")]
    Validation(String),

    // Backend rejected the payload with a per-field error map, kept in
    // the order the backend listed the fields
    #[error("{}", render_field_errors(.message, .field_errors))]
    BackendValidation {
        message: String,
        field_errors: Vec<(String, String)>,
    },

    // 401: expired or invalid token
    #[error("{0}")]
    Unauthorized(String),

    // Any other error status from the backend
    #[error("{message}")]
    Server { status: u16, message: String },

    // No reply at all
    #[error("{}", CONNECTIVITY_MESSAGE)]
    Connectivity,

    // 2xx with a body we could not read
    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    BackendValidation,
    Unauthorized,
    Server,
    Connectivity,
    UnexpectedResponse,
    Storage,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::BackendValidation { .. } => ErrorKind::BackendValidation,
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Connectivity => ErrorKind::Connectivity,
            ApiError::UnexpectedResponse(_) => ErrorKind::UnexpectedResponse,
            ApiError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// HTTP status that produced this error, when there was a reply
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stable code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::BackendValidation => "BACKEND_VALIDATION_ERROR",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Server => "SERVER_ERROR",
            ErrorKind::Connectivity => "CONNECTIVITY_ERROR",
            ErrorKind::UnexpectedResponse => "UNEXPECTED_RESPONSE",
            ErrorKind::Storage => "STORAGE_ERROR",
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn backend_validation(
        message: impl Into<String>,
        field_errors: Vec<(String, String)>,
    ) -> Self {
        ApiError::BackendValidation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        ApiError::Server {
            status,
            message: message.into(),
        }
    }

    pub fn unexpected_response(message: impl Into<String>) -> Self {
        ApiError::UnexpectedResponse(message.into())
    }
}

impl From<crate::session::storage::StorageError> for ApiError {
    fn from(err: crate::session::storage::StorageError) -> Self {
        tracing::error!("Session storage error: {}", err);
        ApiError::Storage(err.to_string())
    }
}

// First message per field, one per line; the summary only when there are none
fn render_field_errors(message: &str, field_errors: &[(String, String)]) -> String {
    if field_errors.is_empty() {
        message.to_string()
    } else {
        field_errors
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
