//! Authentication types and bearer token validation.
//!
//! This module provides:
//! - Bearer token format validation
//! - Resolve request/response types for auth gateway communication
//! - The resolved `UserId` every history operation is scoped to

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::error::{AuthErrorCode, Error, Result};
use crate::limits::{MAX_TOKEN_LEN, TOKEN_PATTERN};

/// Compiled token regex (lazy initialization).
static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOKEN_PATTERN).expect("invalid token pattern"));

/// Identity of an authenticated storefront user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parsed and format-checked bearer token from a request.
///
/// Format checks only; the auth gateway decides whether the token is valid.
#[derive(Debug, Clone)]
pub struct BearerToken {
    raw: String,
}

impl BearerToken {
    /// Parse and validate a bearer token. An empty token is malformed;
    /// a missing one is caught at the header.
    pub fn parse(token: &str) -> Result<Self> {
        if token.is_empty() || token.len() > MAX_TOKEN_LEN || !TOKEN_REGEX.is_match(token) {
            return Err(Error::auth(
                AuthErrorCode::InvalidFormat,
                "Invalid token format",
            ));
        }

        Ok(Self {
            raw: token.to_string(),
        })
    }

    /// Get the raw token string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Extract the bearer token from an `Authorization` header value.
///
/// Accepts `Bearer <token>` (scheme is case-insensitive).
pub fn extract_bearer_token(auth_header: Option<&str>) -> Result<BearerToken> {
    let Some(header) = auth_header else {
        return Err(Error::auth(
            AuthErrorCode::MissingToken,
            "Authentication credentials were not provided",
        ));
    };

    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Error::auth(
            AuthErrorCode::InvalidFormat,
            "Authorization header must use the Bearer scheme",
        ));
    }

    BearerToken::parse(parts.next().unwrap_or_default().trim())
}

/// Request to the auth gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub token: String,
}

impl ResolveRequest {
    pub fn new(token: &BearerToken) -> Self {
        Self {
            token: token.as_str().to_string(),
        }
    }
}

/// Response from the auth gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    /// Whether the token is valid.
    pub valid: bool,
    /// User the token belongs to.
    pub user_id: Option<i64>,
    /// Error details if invalid.
    pub error: Option<ResolveError>,
}

/// Auth error in response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveError {
    pub code: String,
    pub message: String,
}

impl ResolveResponse {
    /// A successful resolution for `user_id`.
    pub fn resolved(user_id: UserId) -> Self {
        Self {
            valid: true,
            user_id: Some(user_id.get()),
            error: None,
        }
    }

    /// A rejection with AUTH_003.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            user_id: None,
            error: Some(ResolveError {
                code: AuthErrorCode::InvalidToken.code().to_string(),
                message: message.into(),
            }),
        }
    }

    /// Check if resolution succeeded and extract the user.
    pub fn user_id(&self) -> Result<UserId> {
        if !self.valid {
            let err = self.error.as_ref();
            let code = err.map(|e| e.code.as_str()).unwrap_or("AUTH_003");
            let msg = err
                .map(|e| e.message.as_str())
                .unwrap_or("Invalid or expired token");

            return Err(match code {
                "AUTH_001" => Error::auth(AuthErrorCode::MissingToken, msg),
                "AUTH_002" => Error::auth(AuthErrorCode::InvalidFormat, msg),
                _ => Error::auth(AuthErrorCode::InvalidToken, msg),
            });
        }

        self.user_id.map(UserId).ok_or_else(|| {
            Error::auth(AuthErrorCode::InvalidToken, "Missing user ID in response")
        })
    }
}
