//! Application state shared across handlers.

use history_core::{BearerToken, Error, ResolveRequest, ResolveResponse, Result, UserId};
use history_service::BrowsingHistoryService;
use moka::future::Cache;
use std::time::Duration;
use telemetry::health;
use tracing::{debug, warn};

/// Cache TTL for resolved tokens (30 seconds).
const AUTH_CACHE_TTL: Duration = Duration::from_secs(30);

/// Maximum cache entries.
const AUTH_CACHE_MAX_CAPACITY: u64 = 10_000;

/// Prefix of tokens accepted in mock mode.
const MOCK_TOKEN_PREFIX: &str = "user_";

/// Auth gateway client.
///
/// Calls the gateway's `/internal/auth/resolve` endpoint to turn a bearer
/// token into a user id. Responses are cached for 30 seconds.
#[derive(Clone)]
pub struct AuthClient {
    /// Auth gateway URL (e.g., "http://auth-gateway:8000")
    base_url: String,
    http_client: reqwest::Client,
    /// Token -> gateway response
    cache: Cache<String, ResolveResponse>,
    /// Resolve `user_<id>` tokens locally (development and tests)
    mock_mode: bool,
}

impl AuthClient {
    /// Creates a new auth client. An empty URL or `"mock"` enables mock mode.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let mock_mode = base_url.is_empty() || base_url == "mock";
        if mock_mode {
            // No gateway to lose; resolution is local.
            health().auth.set_healthy();
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build auth HTTP client, using defaults");
                reqwest::Client::new()
            });

        Self {
            base_url,
            http_client,
            cache: Cache::builder()
                .max_capacity(AUTH_CACHE_MAX_CAPACITY)
                .time_to_live(AUTH_CACHE_TTL)
                .build(),
            mock_mode,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.mock_mode
    }

    /// Resolve a bearer token to the user it belongs to.
    ///
    /// Returns the cached gateway response if available.
    pub async fn resolve(&self, token: &BearerToken) -> Result<UserId> {
        let cache_key = token.as_str().to_string();

        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!("Auth cache hit");
            return cached.user_id();
        }

        let response = if self.mock_mode {
            mock_resolve(token)
        } else {
            self.remote_resolve(token).await?
        };

        self.cache.insert(cache_key, response.clone()).await;

        response.user_id()
    }

    async fn remote_resolve(&self, token: &BearerToken) -> Result<ResolveResponse> {
        let url = format!("{}/internal/auth/resolve", self.base_url);

        debug!(url = %url, "Calling auth gateway");

        let response = self
            .http_client
            .post(&url)
            .json(&ResolveRequest::new(token))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Auth gateway request failed");
                health().auth.set_unhealthy(e.to_string());
                Error::internal(format!("Auth gateway unavailable: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Auth gateway returned error");
            health()
                .auth
                .set_unhealthy(format!("gateway returned {}", status));
            return Err(Error::internal(format!(
                "Auth gateway returned {}: {}",
                status, body
            )));
        }

        let resolved: ResolveResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse auth gateway response");
            Error::internal(format!("Invalid auth gateway response: {}", e))
        })?;

        health().auth.set_healthy();
        Ok(resolved)
    }
}

/// Mock resolution: `user_<id>` resolves to `<id>`, anything else is rejected.
fn mock_resolve(token: &BearerToken) -> ResolveResponse {
    debug!("Using mock auth resolution");
    match token
        .as_str()
        .strip_prefix(MOCK_TOKEN_PREFIX)
        .and_then(|id| id.parse::<i64>().ok())
        .filter(|id| *id > 0)
    {
        Some(id) => ResolveResponse::resolved(UserId(id)),
        None => ResolveResponse::rejected("Invalid or expired token"),
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: BrowsingHistoryService,
    pub auth_client: AuthClient,
}

impl AppState {
    pub fn new(service: BrowsingHistoryService, auth_url: impl Into<String>) -> Self {
        Self {
            service,
            auth_client: AuthClient::new(auth_url),
        }
    }
}
