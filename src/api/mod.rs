pub mod client;
pub mod response;

pub use client::ApiClient;
pub use response::normalize_error;

/// Backend routes
pub mod routes {
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const USERS: &str = "/v1/users";

    pub fn user(id: u64) -> String {
        format!("{}/{}", USERS, id)
    }
}
