//! Appliance readiness polling
//!
//! After a reboot or initial provisioning the management API answers long
//! before the configuration daemons are up. The prober waits until enough
//! services report active, then returns a flat snapshot of the device.

use ltmflow_core::{Request, Transport};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

const SERVICES_PATH: &str = "sys/service";
const DEVICE_PATH: &str = "cm/device";
const ACTIVE_STATES: &[&str] = &["run", "running", "active", "up"];

/// Polling budget
#[derive(Debug, Clone)]
pub struct ReadinessConfig {
    /// Total time budget, divided by `interval` into attempts
    pub timeout: Duration,

    /// Fixed wait between attempts
    pub interval: Duration,

    /// Services that must report active before the device counts as ready
    pub min_active: usize,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(40),
            interval: Duration::from_secs(10),
            min_active: 2,
        }
    }
}

impl ReadinessConfig {
    /// Number of polls the budget allows, never less than one
    pub fn attempts(&self) -> u32 {
        if self.interval.is_zero() {
            return 1;
        }
        let attempts = self.timeout.as_millis().div_ceil(self.interval.as_millis());
        u32::try_from(attempts).unwrap_or(u32::MAX).max(1)
    }
}

/// Result of a readiness wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready(BTreeMap<String, String>),
    NotReady {
        attempts: u32,
        last_error: Option<String>,
    },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready(_))
    }
}

/// Polls the appliance until it is ready or the budget runs out
pub struct ReadinessProber<T> {
    transport: T,
    config: ReadinessConfig,
}

impl<T: Transport> ReadinessProber<T> {
    pub fn new(transport: T, config: ReadinessConfig) -> Self {
        Self { transport, config }
    }

    /// Block the calling task between attempts until ready or out of attempts
    pub async fn wait(&self) -> Readiness {
        let attempts = self.config.attempts();
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.check().await {
                Ok(Some(snapshot)) => {
                    tracing::info!("Appliance ready after {} attempt(s)", attempt);
                    return Readiness::Ready(snapshot);
                }
                Ok(None) => {
                    tracing::debug!("Attempt {}/{}: services not active yet", attempt, attempts);
                    last_error = Some("required services not active".to_string());
                }
                Err(e) => {
                    tracing::debug!("Attempt {}/{}: {}", attempt, attempts, e);
                    last_error = Some(e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.interval).await;
            }
        }

        tracing::warn!("Appliance not ready after {} attempt(s)", attempts);
        Readiness::NotReady {
            attempts,
            last_error,
        }
    }

    /// One poll: `Ok(None)` while services are still coming up
    async fn check(&self) -> Result<Option<BTreeMap<String, String>>, String> {
        let services = self.get_json(SERVICES_PATH).await?;
        let active = active_services(&services);
        if active.len() < self.config.min_active {
            return Ok(None);
        }

        let device = self.get_json(DEVICE_PATH).await?;
        let mut snapshot = device
            .get("items")
            .and_then(|items| items.get(0))
            .map(flatten_scalars)
            .ok_or_else(|| "device response has no items".to_string())?;
        snapshot.insert("activeServices".to_string(), active.join(","));
        Ok(Some(snapshot))
    }

    async fn get_json(&self, path: &str) -> Result<Value, String> {
        let response = self
            .transport
            .send(Request::get(path))
            .await
            .map_err(|e| e.to_string())?;
        if response.status != 200 {
            return Err(format!("GET {} returned {}: {}", path, response.status, response.body));
        }
        response.json().map_err(|e| e.to_string())
    }
}

/// Names of services whose status reads as active
fn active_services(services: &Value) -> Vec<String> {
    let Some(items) = services.get("items").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| is_active(item))
        .filter_map(|item| item.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn is_active(item: &Value) -> bool {
    if let Some(active) = item.get("isActive").and_then(Value::as_bool) {
        return active;
    }
    ["status", "state"].iter().any(|key| {
        item.get(*key)
            .and_then(Value::as_str)
            .is_some_and(|s| ACTIVE_STATES.contains(&s.to_ascii_lowercase().as_str()))
    })
}

fn flatten_scalars(item: &Value) -> BTreeMap<String, String> {
    let Some(object) = item.as_object() else {
        return BTreeMap::new();
    };
    object
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ltmflow_core::{Response, TransportError};
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Reports services active from the `ready_on`-th services poll onwards
    struct BootingAppliance {
        ready_on: u32,
        service_polls: AtomicU32,
    }

    impl BootingAppliance {
        fn new(ready_on: u32) -> Self {
            Self {
                ready_on,
                service_polls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for BootingAppliance {
        async fn send(&self, request: Request) -> Result<Response, TransportError> {
            match request.path.as_str() {
                SERVICES_PATH => {
                    let poll = self.service_polls.fetch_add(1, Ordering::SeqCst) + 1;
                    let active = poll >= self.ready_on;
                    let body = json!({"items": [
                        {"name": "mcpd", "isActive": active},
                        {"name": "tmm", "status": if active { "running" } else { "down" }},
                        {"name": "httpd", "isActive": true},
                    ]});
                    Ok(Response::new(200, body.to_string()))
                }
                DEVICE_PATH => {
                    let body = json!({"items": [{
                        "name": "bigip1.example.net",
                        "version": "17.1.0",
                        "build": "0.0.16",
                        "marketingName": "BIG-IP Virtual Edition",
                        "chassisId": "abc-123",
                        "unicastAddress": [{"ip": "10.0.0.1"}],
                    }]});
                    Ok(Response::new(200, body.to_string()))
                }
                _ => Ok(Response::new(404, "")),
            }
        }
    }

    fn fast_config(attempts: u32) -> ReadinessConfig {
        ReadinessConfig {
            timeout: Duration::from_millis(attempts as u64),
            interval: Duration::from_millis(1),
            min_active: 2,
        }
    }

    #[test]
    fn test_default_budget_is_four_attempts() {
        assert_eq!(ReadinessConfig::default().attempts(), 4);
    }

    #[test]
    fn test_attempts_round_up_and_never_zero() {
        let config = ReadinessConfig {
            timeout: Duration::from_secs(45),
            interval: Duration::from_secs(10),
            min_active: 2,
        };
        assert_eq!(config.attempts(), 5);

        let config = ReadinessConfig {
            timeout: Duration::ZERO,
            ..ReadinessConfig::default()
        };
        assert_eq!(config.attempts(), 1);
    }

    #[tokio::test]
    async fn test_ready_once_two_services_active() {
        let appliance = BootingAppliance::new(3);
        let prober = ReadinessProber::new(&appliance, fast_config(5));

        let Readiness::Ready(snapshot) = prober.wait().await else {
            panic!("expected the appliance to become ready");
        };

        assert_eq!(snapshot["version"], "17.1.0");
        assert_eq!(snapshot["marketingName"], "BIG-IP Virtual Edition");
        assert!(!snapshot.contains_key("unicastAddress"));
        assert_eq!(snapshot["activeServices"], "mcpd,tmm,httpd");
        assert_eq!(appliance.service_polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_ready_after_budget() {
        let appliance = BootingAppliance::new(u32::MAX);
        let prober = ReadinessProber::new(
            &appliance,
            ReadinessConfig {
                min_active: 3,
                ..fast_config(4)
            },
        );

        let readiness = prober.wait().await;

        assert_eq!(
            readiness,
            Readiness::NotReady {
                attempts: 4,
                last_error: Some("required services not active".to_string()),
            }
        );
        assert_eq!(appliance.service_polls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_is_active_variants() {
        assert!(is_active(&json!({"isActive": true})));
        assert!(!is_active(&json!({"isActive": false, "status": "running"})));
        assert!(is_active(&json!({"state": "UP"})));
        assert!(!is_active(&json!({"name": "tmm"})));
    }
}
