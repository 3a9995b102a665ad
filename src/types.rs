//! Shared types used across the codebase

use serde::{Deserialize, Serialize};

pub type UserId = u64;

/// A user record as the backend reports it. The password is write-only and
/// never part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}
