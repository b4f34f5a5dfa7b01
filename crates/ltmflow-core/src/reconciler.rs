//! Resource reconciler
//!
//! Converges one appliance object toward the desired state with a single
//! existence probe followed by at most one mutating call.

use crate::action::{ApplyResult, Operation};
use crate::error::ApplyError;
use crate::identity::{DEFAULT_PARTITION, ResourceIdentity};
use crate::state::DesiredState;
use crate::target::{ApplyIntent, ApplyTarget};
use crate::transport::{Request, Response, Transport};
use serde_json::{Map, Value};

/// Outcome of the existence probe
#[derive(Debug)]
enum Probe {
    Absent,
    Present(Map<String, Value>),
}

/// Idempotent apply over a [`Transport`]
///
/// Holds no state between invocations; every apply probes again.
pub struct Reconciler<T> {
    transport: T,
}

impl<T: Transport> Reconciler<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Validate a caller request and apply it.
    ///
    /// Identity or body problems are reported as a failed result without
    /// touching the transport.
    pub async fn apply_target(&self, target: &ApplyTarget) -> ApplyResult {
        match target.resolve() {
            Ok((identity, desired)) => self.apply(&identity, target.intent, Some(&desired)).await,
            Err(e) => {
                tracing::debug!("Rejected apply target before probing: {}", e);
                ApplyResult::failed(Operation::Skipped, e)
            }
        }
    }

    /// Converge `identity` toward `intent`.
    ///
    /// `desired` is ignored for [`ApplyIntent::Absent`] and treated as empty
    /// when missing for [`ApplyIntent::Present`].
    pub async fn apply(
        &self,
        identity: &ResourceIdentity,
        intent: ApplyIntent,
        desired: Option<&DesiredState>,
    ) -> ApplyResult {
        let probe = match self.probe(identity).await {
            Ok(probe) => probe,
            Err(e) => {
                tracing::debug!("Probe of {} failed: {}", identity, e);
                return ApplyResult::failed(Operation::Skipped, e);
            }
        };

        let empty = DesiredState::new();
        let desired = desired.unwrap_or(&empty);

        match (intent, probe) {
            (ApplyIntent::Absent, Probe::Present(_)) => self.delete(identity).await,
            (ApplyIntent::Absent, Probe::Absent) => {
                tracing::debug!("{} already absent", identity);
                ApplyResult::unchanged(Some(404), format!("{} not found, nothing to delete", identity))
            }
            (ApplyIntent::Present, Probe::Absent) => self.create(identity, desired).await,
            (ApplyIntent::Present, Probe::Present(current)) => {
                self.update(identity, desired, &current).await
            }
        }
    }

    /// POST the object without probing first.
    ///
    /// No fallback to an update: an existing object surfaces as the
    /// appliance's rejection.
    pub async fn create(&self, identity: &ResourceIdentity, desired: &DesiredState) -> ApplyResult {
        let mut body = desired.without_identity();
        body.insert("name".to_string(), Value::from(identity.name()));
        body.insert("partition".to_string(), Value::from(identity.partition()));

        tracing::info!("Creating {}", identity);
        let request = Request::post(identity.collection(), Value::Object(body));
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => return ApplyResult::failed(Operation::Create, e.into()),
        };

        match response.status {
            200 | 201 => ApplyResult::changed(
                Operation::Create,
                response.status,
                format!("{} created", identity),
            ),
            status => ApplyResult::failed(Operation::Create, rejected(status, response)),
        }
    }

    async fn probe(&self, identity: &ResourceIdentity) -> Result<Probe, ApplyError> {
        let response = self
            .transport
            .send(Request::get(identity.object_path()))
            .await
            .map_err(|e| ApplyError::ProbeFailed {
                status: None,
                detail: e.to_string(),
            })?;

        match response.status {
            404 => Ok(Probe::Absent),
            200 => match response.json() {
                Ok(Value::Object(current)) => Ok(Probe::Present(current)),
                Ok(other) => Err(ApplyError::ProbeFailed {
                    status: Some(200),
                    detail: format!("expected a JSON object, got {}", other),
                }),
                Err(e) => Err(ApplyError::ProbeFailed {
                    status: Some(200),
                    detail: e.to_string(),
                }),
            },
            status => Err(ApplyError::ProbeFailed {
                status: Some(status),
                detail: response.body,
            }),
        }
    }

    async fn delete(&self, identity: &ResourceIdentity) -> ApplyResult {
        tracing::info!("Deleting {}", identity);
        let response = match self.transport.send(Request::delete(identity.object_path())).await {
            Ok(response) => response,
            Err(e) => return ApplyResult::failed(Operation::Delete, e.into()),
        };

        match response.status {
            200 => ApplyResult::changed(Operation::Delete, 200, format!("{} deleted", identity)),
            // removed by someone else between probe and delete
            404 => ApplyResult::changed(
                Operation::Delete,
                404,
                format!("{} deleted (already gone at delete time)", identity),
            ),
            status => ApplyResult::failed(Operation::Delete, rejected(status, response)),
        }
    }

    async fn update(
        &self,
        identity: &ResourceIdentity,
        desired: &DesiredState,
        current: &Map<String, Value>,
    ) -> ApplyResult {
        let drift: Map<String, Value> = desired
            .without_identity()
            .into_iter()
            .filter(|(key, wanted)| {
                !current
                    .get(key)
                    .is_some_and(|have| values_match(wanted, have, identity.partition()))
            })
            .collect();

        if drift.is_empty() {
            tracing::debug!("{} already matches the desired state", identity);
            return ApplyResult::unchanged(Some(200), format!("{} is up to date", identity));
        }

        let fields = drift.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
        tracing::info!("Updating {} ({})", identity, fields);

        let request = Request::patch(identity.object_path(), Value::Object(drift));
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => return ApplyResult::failed(Operation::Update, e.into()),
        };

        match response.status {
            200 => ApplyResult::changed(
                Operation::Update,
                200,
                format!("{} updated: {}", identity, fields),
            ),
            400 => {
                tracing::warn!(
                    "Appliance refused to update {}: {} {}",
                    identity,
                    response.status,
                    response.body
                );
                ApplyResult::unchanged(
                    Some(response.status),
                    format!(
                        "{} not updated, appliance refused fields ({}): {} {}",
                        identity, fields, response.status, response.body
                    ),
                )
            }
            status => ApplyResult::failed(Operation::Update, rejected(status, response)),
        }
    }
}

fn rejected(status: u16, response: Response) -> ApplyError {
    ApplyError::ApplyRejected {
        status,
        body: response.body,
    }
}

/// Loose equality between a desired value and what the appliance reports.
///
/// A bare reference such as `http` matches the partition-qualified form the
/// appliance reports, but only in the object's own partition or `Common`.
fn values_match(wanted: &Value, have: &Value, partition: &str) -> bool {
    if wanted == have {
        return true;
    }
    match (scalar_text(wanted), scalar_text(have)) {
        (Some(w), Some(h)) if w == h => true,
        (Some(w), Some(h)) if !w.starts_with('/') => {
            h == format!("/{}/{}", partition, w) || h == format!("/{}/{}", DEFAULT_PARTITION, w)
        }
        _ => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
