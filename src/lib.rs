pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod records;
pub mod session;
pub mod types;
pub mod validation;

pub use error::{ApiError, ErrorKind};
pub use types::{User, UserId};
