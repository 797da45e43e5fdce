//! Limits and defaults for the browsing history service.

/// Default number of entries returned by the history listing.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Upper bound for the listing `limit` parameter.
///
/// Larger requested values are clamped, not rejected.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Maximum bearer token length (chars).
/// Signed JWTs with a handful of claims stay well under 2KB.
pub const MAX_TOKEN_LEN: usize = 4096;

/// Allowed bearer token alphabet: base64url, JWT separators, and padding.
pub const TOKEN_PATTERN: &str = r"^[A-Za-z0-9\-_.~+/]+=*$";
