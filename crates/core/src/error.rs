//! Error taxonomy shared by every layer.
//!
//! | Code          | HTTP | Meaning                                  |
//! |---------------|------|------------------------------------------|
//! | AUTH_001      | 401  | no bearer token                          |
//! | AUTH_002      | 401  | token is not a plausible bearer token    |
//! | AUTH_003      | 401  | auth gateway did not resolve the token   |
//! | VALID_001     | 400  | missing or malformed argument            |
//! | NOT_FOUND_001 | 404  | product missing or delisted              |
//! | DB_001        | 500  | store query or connection failure        |
//! | INTERNAL_001  | 500  | anything else                            |

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    MissingToken,
    InvalidFormat,
    InvalidToken,
}

impl AuthErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "AUTH_001",
            Self::InvalidFormat => "AUTH_002",
            Self::InvalidToken => "AUTH_003",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorCode {
    QueryFailed,
}

impl DbErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::QueryFailed => "DB_001",
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("[{}] {message}", .code.code())]
    Auth {
        code: AuthErrorCode,
        message: String,
    },

    #[error("[VALID_001] {0}")]
    InvalidArgument(String),

    #[error("[NOT_FOUND_001] Product not found")]
    ProductNotFound,

    /// The message may name hosts or SQL; never shown to callers.
    #[error("[{}] {message}", .code.code())]
    Database {
        code: DbErrorCode,
        message: String,
    },

    #[error("[INTERNAL_001] {0}")]
    Internal(String),
}

impl Error {
    pub fn auth(code: AuthErrorCode, msg: impl Into<String>) -> Self {
        Self::Auth {
            code,
            message: msg.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn product_not_found() -> Self {
        Self::ProductNotFound
    }

    pub fn database(code: DbErrorCode, msg: impl Into<String>) -> Self {
        Self::Database {
            code,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::Auth { .. } => 401,
            Self::InvalidArgument(_) => 400,
            Self::ProductNotFound => 404,
            Self::Database { .. } | Self::Internal(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Auth { code, .. } => code.code(),
            Self::InvalidArgument(_) => "VALID_001",
            Self::ProductNotFound => "NOT_FOUND_001",
            Self::Database { code, .. } => code.code(),
            Self::Internal(_) => "INTERNAL_001",
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }

    /// The message a caller may see, without the code prefix.
    /// `None` for server-side failures.
    pub fn client_message(&self) -> Option<String> {
        match self {
            Self::Auth { message, .. } | Self::InvalidArgument(message) => Some(message.clone()),
            Self::ProductNotFound => Some("Product not found".to_string()),
            Self::Database { .. } | Self::Internal(_) => None,
        }
    }
}
