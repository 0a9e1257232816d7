//! Health report served by `GET /health`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall health: healthy only when every component is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub is_healthy: bool,
    pub components: Vec<ComponentHealth>,
    pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self { is_healthy: true, components: Vec::new(), checked_at: Utc::now() }
    }

    /// Returns self for method chaining
    pub fn add_component(mut self, component: ComponentHealth) -> Self {
        self.is_healthy &= component.is_healthy;
        self.components.push(component);
        self
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    /// Component identifier (e.g., "database", "scheduler")
    pub name: String,
    pub is_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    /// Healthy, with a note (e.g. a component that is disabled by config)
    pub fn healthy_with(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: Some(message.into()) }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_status_is_healthy() {
        let status = HealthStatus::new();
        assert!(status.is_healthy);
        assert!(status.components.is_empty());
    }

    #[test]
    fn one_unhealthy_component_fails_the_status() {
        let status = HealthStatus::new()
            .add_component(ComponentHealth::healthy("database"))
            .add_component(ComponentHealth::unhealthy("scheduler", "stopped"))
            .add_component(ComponentHealth::healthy_with("cache", "disabled"));

        assert!(!status.is_healthy);
        assert_eq!(status.components.len(), 3);
        assert_eq!(status.components[1].message.as_deref(), Some("stopped"));
    }

    #[test]
    fn serializes_in_camel_case() {
        let status = HealthStatus::new().add_component(ComponentHealth::healthy("database"));
        let value = serde_json::to_value(status).expect("serializes");

        assert_eq!(value["isHealthy"], true);
        assert_eq!(value["components"][0]["name"], "database");
        assert!(value["components"][0].get("message").is_none());
    }
}
