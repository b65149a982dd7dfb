//! Backend connection settings.

/// Default local development endpoint.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:54321";

/// Connection settings for [`crate::RestBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project base URL; REST lives under `/rest/v1`, auth under `/auth/v1`.
    pub url: String,
    /// Public (anon) API key, sent on every request.
    pub anon_key: String,
    /// User access token (JWT) from a completed sign-in. `None` browses
    /// anonymously.
    pub access_token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { url: DEFAULT_BACKEND_URL.to_string(), anon_key: String::new(), access_token: None }
    }
}
