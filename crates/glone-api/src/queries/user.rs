//! User-related API queries.

use serde::{Deserialize, Serialize};

/// Endpoint for the authenticated user.
pub const CURRENT_USER_PATH: &str = "user";

/// Current authenticated user info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Username.
    pub username: String,
    /// Public or primary email, when the token may read it.
    pub email: Option<String>,
}

impl CurrentUser {
    /// Email for display, or an empty string.
    pub fn display_email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}
