//! Bearer-token provider for the skill-extraction service.
//!
//! Tokens come from an OAuth client-credentials exchange and are cached with
//! a sliding expiry: every hit inside the window pushes the expiry out again.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default sliding lifetime of a cached token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(59 * 60);

const GRANT_TYPE: &str = "client_credentials";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint returned status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("token response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("token response has no access_token")]
    MissingAccessToken,
}

/// Source of bearer tokens for outbound calls.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String, CredentialError>;
}

/// Client-credentials grant parameters.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    scope: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn new(token: String, now: Instant, ttl: Duration) -> Self {
        Self {
            token,
            expires_at: now + ttl,
        }
    }

    /// Returns the token if still live at `now`, sliding the expiry forward.
    fn touch(&mut self, now: Instant, ttl: Duration) -> Option<&str> {
        if now >= self.expires_at {
            return None;
        }
        self.expires_at = now + ttl;
        Some(&self.token)
    }
}

/// Caching [`CredentialProvider`].
///
/// The check-then-fill sequence runs under one async lock, so callers that
/// arrive while a fetch is in flight wait for it and reuse its token.
pub struct TokenCache {
    http: Client,
    credentials: ClientCredentials,
    ttl: Duration,
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(http: Client, credentials: ClientCredentials, ttl: Duration) -> Self {
        Self {
            http,
            credentials,
            ttl,
            slot: Mutex::new(None),
        }
    }

    async fn fetch(&self) -> Result<String, CredentialError> {
        let form = TokenRequest {
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            grant_type: GRANT_TYPE,
            scope: &self.credentials.scope,
        };

        let response = self
            .http
            .post(&self.credentials.token_url)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Token endpoint returned {status}: {body}");
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(CredentialError::MissingAccessToken)
    }
}

#[async_trait]
impl CredentialProvider for TokenCache {
    async fn bearer_token(&self) -> Result<String, CredentialError> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_mut() {
            if let Some(token) = cached.touch(Instant::now(), self.ttl) {
                debug!("Access token served from cache");
                return Ok(token.to_string());
            }
            debug!("Cached access token expired");
        }

        let token = self.fetch().await?;
        info!("Fetched new access token from {}", self.credentials.token_url);
        *slot = Some(CachedToken::new(token.clone(), Instant::now(), self.ttl));

        Ok(token)
    }
}

/// Provider that always hands out the same token. Used where the token is
/// issued out of band.
pub struct StaticToken(pub String);

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Result<String, CredentialError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_string_contains, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn credentials(server: &MockServer) -> ClientCredentials {
        ClientCredentials {
            token_url: format!("{}/connect/token", server.uri()),
            client_id: "client-42".to_string(),
            client_secret: "s3cret".to_string(),
            scope: "emsi_open".to_string(),
        }
    }

    async fn mount_token(server: &MockServer, body: serde_json::Value, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[test]
    fn test_touch_slides_expiry() {
        let ttl = Duration::from_secs(60);
        let start = Instant::now();
        let mut cached = CachedToken::new("tok".to_string(), start, ttl);

        // Each access inside the window restarts the countdown.
        for step in 1..=5 {
            let now = start + Duration::from_secs(45 * step);
            assert_eq!(cached.touch(now, ttl), Some("tok"));
        }

        let idle = start + Duration::from_secs(45 * 5 + 60);
        assert_eq!(cached.touch(idle, ttl), None);
    }

    #[test]
    fn test_touch_zero_ttl_is_always_expired() {
        let now = Instant::now();
        let mut cached = CachedToken::new("tok".to_string(), now, Duration::ZERO);
        assert_eq!(cached.touch(now, Duration::ZERO), None);
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_hits_cache() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=client-42"))
            .and(body_string_contains("scope=emsi_open"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "abc",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cache = TokenCache::new(Client::new(), credentials(&server), DEFAULT_TOKEN_TTL);
        assert_eq!(cache.bearer_token().await.unwrap(), "abc");
        assert_eq!(cache.bearer_token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_expired_token_is_refetched() {
        let server = MockServer::start().await;
        mount_token(&server, json!({ "access_token": "abc" }), 2).await;

        let cache = TokenCache::new(Client::new(), credentials(&server), Duration::ZERO);
        cache.bearer_token().await.unwrap();
        cache.bearer_token().await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_first_callers_share_one_fetch() {
        let server = MockServer::start().await;
        mount_token(&server, json!({ "access_token": "shared" }), 1).await;

        let cache = TokenCache::new(Client::new(), credentials(&server), DEFAULT_TOKEN_TTL);
        let (a, b, c) = tokio::join!(cache.bearer_token(), cache.bearer_token(), cache.bearer_token());
        assert_eq!(a.unwrap(), "shared");
        assert_eq!(b.unwrap(), "shared");
        assert_eq!(c.unwrap(), "shared");
    }

    #[tokio::test]
    async fn test_missing_access_token_is_error_and_not_cached() {
        let server = MockServer::start().await;
        mount_token(&server, json!({ "error": "invalid_client" }), 2).await;

        let cache = TokenCache::new(Client::new(), credentials(&server), DEFAULT_TOKEN_TTL);
        assert!(matches!(
            cache.bearer_token().await,
            Err(CredentialError::MissingAccessToken)
        ));
        assert!(matches!(
            cache.bearer_token().await,
            Err(CredentialError::MissingAccessToken)
        ));
    }

    #[tokio::test]
    async fn test_rejected_request_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let cache = TokenCache::new(Client::new(), credentials(&server), DEFAULT_TOKEN_TTL);
        match cache.bearer_token().await {
            Err(CredentialError::Rejected { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
