//! Request extractors.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};
use history_core::{extract_bearer_token, Error, UserId};
use serde::de::DeserializeOwned;
use telemetry::metrics;
use tracing::debug;

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated user of the request.
///
/// Resolved from the `Authorization: Bearer` header through the auth gateway.
/// Handlers scope every operation to `user_id`.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: UserId,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let resolved = match extract_bearer_token(auth_header) {
            Ok(token) => state.auth_client.resolve(&token).await,
            Err(e) => Err(e),
        };

        match resolved {
            Ok(user_id) => Ok(AuthContext { user_id }),
            Err(e) => {
                if e.is_client_error() {
                    metrics().auth_failures.inc();
                    debug!(code = e.error_code(), "Request authentication failed");
                }
                Err(e.into())
            }
        }
    }
}

/// Query string extractor whose rejection is a VALID_001 error body.
///
/// axum's `Query` answers duplicate or undecodable parameters with a plain
/// text 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for HistoryQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "Malformed query string");
                Err(Error::invalid_argument("Query string is malformed").into())
            }
        }
    }
}
