//! Browsing history operations over a `HistoryStore` and a `Catalog`.

pub mod config;
pub mod service;

pub use config::HistoryConfig;
pub use service::BrowsingHistoryService;
