//! GitLab instance handling.
//!
//! Normalizes user-supplied hostnames and derives the REST API base URL.

/// REST API path prefix.
const API_PATH: &str = "api/v4/";

/// Normalize a GitLab hostname by removing protocol and trailing slashes.
pub fn normalize_hostname(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);

    host.trim_end_matches('/').to_lowercase()
}

/// Get the HTTPS URL prefix for a hostname (e.g., `https://gitlab.com/`).
pub fn host_prefix(host: &str) -> String {
    format!("https://{}/", normalize_hostname(host))
}

/// Get the REST API base URL for a given hostname.
pub fn api_url(host: &str) -> String {
    format!("{}{API_PATH}", host_prefix(host))
}

/// Whether a credentials-file machine label refers to a GitLab host.
pub fn is_gitlab_label(label: &str) -> bool {
    label.to_lowercase().contains("gitlab")
}
