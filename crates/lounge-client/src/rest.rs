//! REST backend.
//!
//! Talks to a hosted backend exposing PostgREST under `/rest/v1` and a
//! GoTrue-style auth API under `/auth/v1`:
//!
//! | operation                  | request                                             |
//! |----------------------------|-----------------------------------------------------|
//! | insert membership          | `POST /rest/v1/memberships`                         |
//! | delete membership          | `DELETE /rest/v1/memberships?user_id=eq.&lounge_id=eq.` |
//! | stored procedures          | `POST /rest/v1/rpc/{name}`                          |
//! | current user               | `GET /auth/v1/user`                                 |
//! | email sign-in (magic link) | `POST /auth/v1/otp`                                 |
//! | sign out                   | `POST /auth/v1/logout`                              |
//!
//! Every request carries the project's `apikey`. The bearer token is the
//! user's access token when signed in and the anon key otherwise, so RPCs
//! annotate rows for whoever is asking.

use std::sync::Arc;

use lounge_core::{Identity, Lounge, Membership};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::{
    AuthError, BackendConfig, ConfigError, IdentityProvider, MembershipStore, StoreError,
    store::validate_email,
};

const MEMBERSHIPS_PATH: &str = "rest/v1/memberships";
const RPC_LOUNGES_WITH_MEMBERSHIP: &str = "get_lounges_with_user_membership";
const RPC_MY_LOUNGES: &str = "get_my_lounges";
const RPC_LOUNGE_BY_SLUG: &str = "get_lounge_by_slug";

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// HTTP backend implementing both [`MembershipStore`] and
/// [`IdentityProvider`].
///
/// Cheap to clone; clones share the HTTP connection pool and the session
/// token.
#[derive(Clone)]
pub struct RestBackend {
    inner: Arc<RestInner>,
}

struct RestInner {
    http: reqwest::Client,
    /// Project base URL, always ending in `/`
    base: Url,
    anon_key: String,
    access_token: RwLock<Option<String>>,
}

/// PostgREST error body.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

/// Auth API error body. Field names vary between versions.
#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl RestBackend {
    /// Create a backend from connection settings.
    pub fn new(config: BackendConfig) -> Result<Self, ConfigError> {
        let mut base = Url::parse(&config.url).map_err(|e| ConfigError::InvalidUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: config.url,
                reason: "URL cannot be a base".to_string(),
            });
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("lounge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Http(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(RestInner {
                http,
                base,
                anon_key: config.anon_key,
                access_token: RwLock::new(config.access_token),
            }),
        })
    }

    /// Replace the session token.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.inner.access_token.write().await = token;
    }

    /// Current session token, if signed in.
    pub async fn access_token(&self) -> Option<String> {
        self.inner.access_token.read().await.clone()
    }

    fn endpoint(&self, path: &str) -> Result<Url, String> {
        self.inner.base.join(path).map_err(|e| format!("invalid endpoint {path:?}: {e}"))
    }

    /// Attach `apikey` and bearer headers.
    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .inner
            .access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.inner.anon_key.clone());
        request.header("apikey", &self.inner.anon_key).bearer_auth(bearer)
    }

    async fn rpc(&self, name: &str, args: Value) -> Result<Vec<Lounge>, StoreError> {
        let url = self.endpoint(&format!("rest/v1/rpc/{name}")).map_err(StoreError::Transport)?;
        tracing::debug!(rpc = name, "calling stored procedure");

        let response = self
            .authorized(self.inner.http.post(url))
            .await
            .json(&args)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let response = check_store(response).await?;
        response.json::<Vec<Lounge>>().await.map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Pass successful responses through; turn failures into [`StoreError`].
async fn check_store(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<PostgrestError>(&body).ok();
    let code = parsed.as_ref().and_then(|p| p.code.clone());
    let message = parsed
        .and_then(|p| p.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback_message(status, &body));

    tracing::warn!(status = status.as_u16(), code = ?code, %message, "store request rejected");

    // A 409 without a SQLSTATE is still a duplicate; other codes (23503 for a
    // missing lounge) stay rejections.
    let unique = match code.as_deref() {
        Some(code) => code == UNIQUE_VIOLATION,
        None => status == StatusCode::CONFLICT,
    };
    let err = if unique {
        StoreError::Conflict { message }
    } else if status == StatusCode::UNAUTHORIZED {
        StoreError::Unauthorized { message }
    } else {
        StoreError::Rejected { status: status.as_u16(), code, message }
    };
    Err(err)
}

/// Pass successful responses through; turn failures into [`AuthError`].
async fn check_auth(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<AuthErrorBody>(&body)
        .ok()
        .and_then(|b| b.msg.or(b.message).or(b.error_description).or(b.error))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback_message(status, &body));

    tracing::warn!(status = status.as_u16(), %message, "auth request rejected");
    Err(AuthError::Rejected { status: status.as_u16(), message })
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        body.to_string()
    }
}

impl MembershipStore for RestBackend {
    async fn insert_membership(&self, membership: Membership) -> Result<(), StoreError> {
        let url = self.endpoint(MEMBERSHIPS_PATH).map_err(StoreError::Transport)?;

        let response = self
            .authorized(self.inner.http.post(url))
            .await
            .header("Prefer", "return=minimal")
            .json(&membership)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        check_store(response).await.map(drop)
    }

    async fn delete_membership(&self, membership: Membership) -> Result<(), StoreError> {
        let mut url = self.endpoint(MEMBERSHIPS_PATH).map_err(StoreError::Transport)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("user_id", &format!("eq.{}", membership.user_id));
            query.append_pair("lounge_id", &format!("eq.{}", membership.lounge_id));
        }

        let response = self
            .authorized(self.inner.http.delete(url))
            .await
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        check_store(response).await.map(drop)
    }

    async fn lounges_with_membership(&self) -> Result<Vec<Lounge>, StoreError> {
        self.rpc(RPC_LOUNGES_WITH_MEMBERSHIP, json!({})).await
    }

    async fn my_lounges(&self) -> Result<Vec<Lounge>, StoreError> {
        self.rpc(RPC_MY_LOUNGES, json!({})).await
    }

    async fn lounge_by_slug(&self, slug: &str) -> Result<Vec<Lounge>, StoreError> {
        self.rpc(RPC_LOUNGE_BY_SLUG, json!({ "slug": slug })).await
    }
}

impl IdentityProvider for RestBackend {
    async fn current_user(&self) -> Result<Option<Identity>, AuthError> {
        let Some(token) = self.access_token().await else {
            return Ok(None);
        };
        let url = self.endpoint("auth/v1/user").map_err(AuthError::Transport)?;

        let response = self
            .inner
            .http
            .get(url)
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::debug!("access token rejected, treating as signed out");
            return Ok(None);
        }

        let response = check_auth(response).await?;
        let identity =
            response.json::<Identity>().await.map_err(|e| AuthError::Decode(e.to_string()))?;
        Ok(Some(identity))
    }

    async fn sign_in_with_email(&self, email: &str) -> Result<(), AuthError> {
        let email = validate_email(email)?;
        let url = self.endpoint("auth/v1/otp").map_err(AuthError::Transport)?;
        tracing::debug!(%email, "requesting magic link");

        let response = self
            .inner
            .http
            .post(url)
            .header("apikey", &self.inner.anon_key)
            .json(&json!({ "email": email, "create_user": true }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        check_auth(response).await.map(drop)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(token) = self.access_token().await else {
            return Ok(());
        };
        let url = self.endpoint("auth/v1/logout").map_err(AuthError::Transport)?;

        let response = self
            .inner
            .http
            .post(url)
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        // An already-invalid token means the session is gone either way.
        if response.status() != StatusCode::UNAUTHORIZED {
            check_auth(response).await?;
        }
        self.set_access_token(None).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let backend = RestBackend::new(BackendConfig {
            url: "https://project.example/api".into(),
            ..BackendConfig::default()
        })
        .unwrap();

        assert_eq!(
            backend.endpoint(MEMBERSHIPS_PATH).unwrap().as_str(),
            "https://project.example/api/rest/v1/memberships"
        );
    }

    #[test]
    fn rejects_unparseable_url() {
        let err = RestBackend::new(BackendConfig { url: "not a url".into(), ..Default::default() });
        assert!(matches!(err, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn rejects_non_base_url() {
        let err = RestBackend::new(BackendConfig {
            url: "mailto:someone@example.com".into(),
            ..Default::default()
        });
        assert!(matches!(err, Err(ConfigError::InvalidUrl { .. })));
    }
}
