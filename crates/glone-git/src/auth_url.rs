//! Token-embedded clone URLs.

/// Username GitLab expects for token-based HTTP authentication.
pub const OAUTH2_USER: &str = "oauth2";

const HTTP_SCHEMES: [&str; 2] = ["https://", "http://"];

/// Insert `oauth2:{token}@` right after an `http://` or `https://` prefix.
///
/// Other URLs, and any URL when the token is empty, are returned unchanged.
pub fn authenticated_url(clone_url: &str, token: &str) -> String {
    if token.is_empty() {
        return clone_url.to_string();
    }

    HTTP_SCHEMES
        .iter()
        .find_map(|scheme| {
            clone_url
                .strip_prefix(scheme)
                .map(|rest| format!("{scheme}{OAUTH2_USER}:{token}@{rest}"))
        })
        .unwrap_or_else(|| clone_url.to_string())
}
