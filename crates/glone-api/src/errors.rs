//! API error types.

/// Errors from the GitLab API.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// HTTP error response.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// The identity check against `GET /user` failed.
    #[error("authentication failed")]
    Authentication {
        /// The underlying API error.
        #[source]
        source: Box<ApiError>,
    },

    /// The requested group does not exist or is not visible.
    #[error("group not found: {0}")]
    GroupNotFound(String),

    /// Network/transport error.
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("failed to parse API response: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The API base URL or a request path could not be parsed.
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Check if this is a 404 Not Found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// Check if this is a 401 Unauthorized error.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }

    /// Wrap an error from the identity check.
    pub fn authentication(source: ApiError) -> Self {
        Self::Authentication {
            source: Box::new(source),
        }
    }
}
