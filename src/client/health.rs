//! Health reporting over cached service handles.
//!
//! A health check only probes handles that already exist. A cold slot is
//! reported as [`HealthStatus::NotConnected`]; no connection is ever made
//! to answer a health query.
//!
//! ```rust,ignore
//! let report = gateway.health().await;
//! println!("{}", report);
//!
//! // Periodic probing until the token is cancelled
//! let shutdown = CancellationToken::new();
//! let probe = gateway.spawn_health_probe(Duration::from_secs(30), shutdown.clone());
//! ```

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cache::ConnectionCache;
use crate::transport::ServiceKind;

/// Health of the gateway's backing services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall status.
    pub status: HealthStatus,
    /// Time taken to probe every cached handle.
    #[serde(with = "duration_millis")]
    pub latency: Duration,
    /// Per-service status, keyed by service name.
    pub components: BTreeMap<String, ComponentHealth>,
    /// When the report was produced.
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    /// Returns `true` if the overall status is healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }

    /// Returns the status of one service.
    pub fn component(&self, kind: ServiceKind) -> Option<&ComponentHealth> {
        self.components.get(&kind.to_string())
    }

    /// Returns a one-line summary.
    pub fn summary(&self) -> String {
        let components = self
            .components
            .iter()
            .map(|(name, health)| format!("{}: {}", name, health.status))
            .collect::<Vec<_>>()
            .join(", ");

        format!("{} (latency: {:?}, components: [{}])", self.status, self.latency, components)
    }

    fn from_components(components: BTreeMap<String, ComponentHealth>, latency: Duration) -> Self {
        let statuses: Vec<_> = components
            .values()
            .map(|c| c.status)
            .filter(|s| *s != HealthStatus::NotConnected)
            .collect();

        let status = if statuses.is_empty() {
            HealthStatus::NotConnected
        } else if statuses.iter().all(|s| *s == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else if statuses.iter().all(|s| *s == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        };

        Self { status, latency, components, timestamp: Utc::now() }
    }
}

impl std::fmt::Display for HealthReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Gateway Health")?;
        writeln!(f, "==============")?;
        writeln!(f, "Status:    {}", self.status)?;
        writeln!(f, "Latency:   {:?}", self.latency)?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;

        for (name, health) in &self.components {
            writeln!(f, "  {}: {}", name, health.status)?;
            if let Some(endpoint) = &health.endpoint {
                writeln!(f, "    Endpoint: {}", endpoint)?;
            }
            if let Some(msg) = &health.message {
                writeln!(f, "    Message: {}", msg)?;
            }
            if let Some(latency) = health.latency {
                writeln!(f, "    Latency: {:?}", latency)?;
            }
        }

        Ok(())
    }
}

/// Health status of a service or of the gateway as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Probes succeeded.
    Healthy,
    /// Some probes failed.
    Degraded,
    /// Every probe failed.
    Unhealthy,
    /// No handle is cached, so nothing was probed.
    NotConnected,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
            HealthStatus::NotConnected => write!(f, "not connected"),
        }
    }
}

/// Health of one backing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Status of this service.
    pub status: HealthStatus,
    /// Endpoint of the cached handle.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub endpoint: Option<String>,
    /// Generation of the cached handle.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub generation: Option<u64>,
    /// Probe failure message.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    /// Probe latency.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(with = "duration_millis_opt")]
    #[serde(default)]
    pub latency: Option<Duration>,
    /// When this service was last checked.
    pub last_check: DateTime<Utc>,
}

impl ComponentHealth {
    /// A service with no cached handle.
    pub fn not_connected() -> Self {
        Self {
            status: HealthStatus::NotConnected,
            endpoint: None,
            generation: None,
            message: None,
            latency: None,
            last_check: Utc::now(),
        }
    }

    /// A successful probe.
    pub fn healthy() -> Self {
        Self { status: HealthStatus::Healthy, ..Self::not_connected() }
    }

    /// A failed probe.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
            ..Self::not_connected()
        }
    }

    /// Sets the probe latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    #[must_use]
    fn with_handle(mut self, endpoint: &str, generation: u64) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self.generation = Some(generation);
        self
    }
}

/// Probes every cached handle.
///
/// Each handle is cloned under the slot's shared lock and probed with no
/// lock held, so a slow probe never blocks logins or invalidation.
pub(crate) async fn check(cache: &ConnectionCache) -> HealthReport {
    let started = Instant::now();
    let mut components = BTreeMap::new();

    for kind in ServiceKind::ALL {
        let component = match cache.peek(kind).await {
            None => ComponentHealth::not_connected(),
            Some(handle) => {
                let probe_started = Instant::now();
                let health = match handle.probe().await {
                    Ok(()) => ComponentHealth::healthy(),
                    Err(e) => {
                        tracing::warn!(service = %kind, error = %e, "health probe failed");
                        ComponentHealth::unhealthy(e.to_string())
                    },
                };
                health
                    .with_latency(probe_started.elapsed())
                    .with_handle(handle.endpoint(), handle.generation())
            },
        };
        components.insert(kind.to_string(), component);
    }

    HealthReport::from_components(components, started.elapsed())
}

/// Serde helper for Duration as milliseconds.
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Serde helper for `Option<Duration>` as milliseconds.
mod duration_millis_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => d.as_millis().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<u64>::deserialize(deserializer)?;
        Ok(opt.map(Duration::from_millis))
    }
}
