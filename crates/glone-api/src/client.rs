//! Low-level GitLab REST client.
//!
//! Wraps reqwest with token authentication, error mapping and
//! `X-Next-Page` pagination.

use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::errors::ApiError;
use glone_core::instance;

/// Header carrying the personal access token.
pub const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Header GitLab uses to announce the next page number.
pub const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Fixed page size for list endpoints.
pub const PER_PAGE: u32 = 100;

/// GitLab API client wrapping reqwest with auth and error handling.
///
/// Tokens are stored as [`SecretString`] to prevent accidental logging or
/// exposure through `Debug` output.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    hostname: String,
    token: SecretString,
    /// Optional base URL override for testing (e.g., `"http://127.0.0.1:PORT/"`).
    api_url_override: Option<String>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("hostname", &self.hostname)
            .field("token", &"[REDACTED]")
            .field("api_url_override", &self.api_url_override)
            .finish_non_exhaustive()
    }
}

/// A page of results from a list endpoint.
#[derive(Debug)]
#[non_exhaustive]
pub struct RestPage<T> {
    /// The deserialized response body.
    pub data: T,
    /// Number of the next page, if any.
    pub next_page: Option<u32>,
}

impl Client {
    /// Create a new API client for a specific hostname.
    pub fn new(http: reqwest::Client, hostname: &str, token: SecretString) -> Self {
        Self {
            http,
            hostname: instance::normalize_hostname(hostname),
            token,
            api_url_override: None,
        }
    }

    /// Set a base URL override.
    ///
    /// When set, all requests are routed to this base URL instead of
    /// `https://{host}/api/v4/`.
    #[must_use]
    pub fn with_url_override(mut self, url: String) -> Self {
        self.api_url_override = Some(url);
        self
    }

    /// Get the hostname this client is configured for.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Base URL every relative path is resolved against.
    pub fn base_url(&self) -> String {
        let base = match self.api_url_override {
            Some(ref url) => url.clone(),
            None => instance::api_url(&self.hostname),
        };
        if base.ends_with('/') {
            base
        } else {
            format!("{base}/")
        }
    }

    /// GET a single JSON resource.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, non-success status, or an
    /// unparsable body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.resolve_url(path, query)?;
        let resp = self.send(url).await?;
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// GET one page of a list endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, non-success status, or an
    /// unparsable body.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        page: u32,
    ) -> Result<RestPage<Vec<T>>, ApiError> {
        let per_page = PER_PAGE.to_string();
        let page_str = page.to_string();
        let mut full_query = query.to_vec();
        full_query.push(("per_page", per_page.as_str()));
        full_query.push(("page", page_str.as_str()));

        let url = self.resolve_url(path, &full_query)?;
        let resp = self.send(url).await?;
        let next_page = parse_next_page(resp.headers());
        let text = resp.text().await?;
        let data = serde_json::from_str(&text)?;

        Ok(RestPage { data, next_page })
    }

    /// Collect all pages from a list endpoint.
    ///
    /// Starts at page 1 and follows `X-Next-Page` until the server stops
    /// announcing one. Items are returned in page order.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; items already fetched are dropped.
    pub async fn paginate<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        match self.paginate_partial(path, query).await {
            (items, None) => Ok(items),
            (_, Some(err)) => Err(err),
        }
    }

    /// Like [`paginate`](Self::paginate), but keep the pages fetched before
    /// an error and hand the error back alongside them.
    pub async fn paginate_partial<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> (Vec<T>, Option<ApiError>) {
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            let result: RestPage<Vec<T>> = match self.get_page(path, query, page).await {
                Ok(result) => result,
                Err(e) => return (all_items, Some(e)),
            };
            info!("Fetched page {page}: {} items", result.data.len());
            all_items.extend(result.data);

            match result.next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        (all_items, None)
    }

    fn resolve_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let base = Url::parse(&self.base_url())?;
        let mut url = base.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send(&self, url: Url) -> Result<reqwest::Response, ApiError> {
        debug!(path = url.path(), "GET");
        let resp = self
            .http
            .get(url)
            .header(TOKEN_HEADER, self.token.expose_secret())
            .send()
            .await?;
        Self::check_response(resp).await
    }

    /// Map a non-success response to [`ApiError::Http`].
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        Err(ApiError::Http {
            status: status.as_u16(),
            message: error_message(&text),
        })
    }
}

/// Parse the `X-Next-Page` header. Missing, empty, or invalid means no next page.
fn parse_next_page(headers: &HeaderMap) -> Option<u32> {
    headers
        .get(NEXT_PAGE_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Extract GitLab's `message` (or `error`) field, falling back to the raw body.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("error")))
        .map(|m| match m.as_str() {
            Some(s) => s.to_string(),
            None => m.to_string(),
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use rstest::rstest;

    use super::*;

    fn headers_with_next(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(NEXT_PAGE_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[rstest]
    #[case("2", Some(2))]
    #[case(" 17 ", Some(17))]
    #[case("", None)]
    #[case("next", None)]
    fn test_should_parse_next_page(#[case] value: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_next_page(&headers_with_next(value)), expected);
    }

    #[test]
    fn test_should_treat_missing_header_as_last_page() {
        assert_eq!(parse_next_page(&HeaderMap::new()), None);
    }

    #[rstest]
    #[case(r#"{"message": "404 Group Not Found"}"#, "404 Group Not Found")]
    #[case(r#"{"error": "invalid_token"}"#, "invalid_token")]
    #[case(r#"{"message": {"name": ["is invalid"]}}"#, r#"{"name":["is invalid"]}"#)]
    #[case("Bad Gateway\n", "Bad Gateway")]
    fn test_should_extract_error_message(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(error_message(body), expected);
    }

    #[test]
    fn test_should_create_client_and_normalize_hostname() {
        let client = Client::new(
            reqwest::Client::new(),
            "https://GitLab.Example.com/",
            "tok".to_string().into(),
        );
        assert_eq!(client.hostname(), "gitlab.example.com");
        assert_eq!(client.base_url(), "https://gitlab.example.com/api/v4/");
    }

    #[test]
    fn test_should_append_slash_to_override() {
        let client = Client::new(reqwest::Client::new(), "gitlab.com", "t".to_string().into())
            .with_url_override("http://127.0.0.1:9999/api/v4".to_string());
        assert_eq!(client.base_url(), "http://127.0.0.1:9999/api/v4/");
    }

    #[test]
    fn test_should_resolve_url_with_query() {
        let client = Client::new(reqwest::Client::new(), "gitlab.com", "t".to_string().into());
        let url = client
            .resolve_url("/groups/a%2Fb", &[("include_subgroups", "true")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://gitlab.com/api/v4/groups/a%2Fb?include_subgroups=true"
        );
    }

    #[test]
    fn test_should_redact_token_in_debug() {
        let client = Client::new(
            reqwest::Client::new(),
            "gitlab.com",
            "glpat-secret".to_string().into(),
        );
        let debug = format!("{client:?}");
        assert!(!debug.contains("glpat-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
