//! Component health for the status endpoint.
//!
//! The store is required to serve anything; the auth gateway is only
//! observed as a side effect of resolving tokens, so losing it degrades the
//! service rather than taking it out of rotation.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// The store is required; a missing auth gateway only degrades.
    pub fn from_components(database: bool, auth: bool) -> Self {
        match (database, auth) {
            (true, true) => Self::Healthy,
            (true, false) => Self::Degraded,
            (false, _) => Self::Unhealthy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Observation {
    healthy: bool,
    message: Option<String>,
    checked_at: Option<DateTime<Utc>>,
}

/// Last known state of one dependency.
#[derive(Debug)]
pub struct ComponentHealth {
    name: &'static str,
    last: RwLock<Observation>,
}

impl ComponentHealth {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            last: RwLock::new(Observation::default()),
        }
    }

    pub fn set_healthy(&self) {
        *self.last.write() = Observation {
            healthy: true,
            message: None,
            checked_at: Some(Utc::now()),
        };
    }

    pub fn set_unhealthy(&self, msg: impl Into<String>) {
        *self.last.write() = Observation {
            healthy: false,
            message: Some(msg.into()),
            checked_at: Some(Utc::now()),
        };
    }

    pub fn is_healthy(&self) -> bool {
        self.last.read().healthy
    }

    fn report(&self) -> ComponentReport {
        let last = self.last.read().clone();
        ComponentReport {
            name: self.name.to_string(),
            healthy: last.healthy,
            message: last.message,
            checked_at: last.checked_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentReport {
    pub name: String,
    pub healthy: bool,
    pub message: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: Vec<ComponentReport>,
}

#[derive(Debug)]
pub struct HealthRegistry {
    pub database: ComponentHealth,
    pub auth: ComponentHealth,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self {
            database: ComponentHealth::new("database"),
            auth: ComponentHealth::new("auth"),
        }
    }
}

impl HealthRegistry {
    pub fn report(&self) -> HealthReport {
        let status =
            HealthStatus::from_components(self.database.is_healthy(), self.auth.is_healthy());

        HealthReport {
            status,
            components: vec![self.database.report(), self.auth.report()],
        }
    }
}

static HEALTH: LazyLock<HealthRegistry> = LazyLock::new(HealthRegistry::default);

pub fn health() -> &'static HealthRegistry {
    &HEALTH
}
