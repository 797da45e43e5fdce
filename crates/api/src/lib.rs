//! HTTP API layer for the browsing history service.

pub mod extractors;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, AuthClient};
