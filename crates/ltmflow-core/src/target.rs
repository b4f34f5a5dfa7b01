//! Apply requests as supplied by the caller

use crate::error::{ApplyError, Result};
use crate::identity::{DEFAULT_PARTITION, ResourceIdentity};
use crate::state::DesiredState;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Whether the object should exist after the apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyIntent {
    #[default]
    Present,
    Absent,
}

impl FromStr for ApplyIntent {
    type Err = ApplyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" | "post" | "patch" | "put" => Ok(ApplyIntent::Present),
            "absent" | "delete" => Ok(ApplyIntent::Absent),
            other => Err(ApplyError::InvalidBody(format!(
                "unknown state '{}', expected present or absent",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ApplyIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyIntent::Present => write!(f, "present"),
            ApplyIntent::Absent => write!(f, "absent"),
        }
    }
}

/// Unvalidated apply request, straight from the caller's parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyTarget {
    pub kind: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub partition: Option<String>,

    #[serde(default)]
    pub intent: ApplyIntent,

    #[serde(default)]
    pub body: DesiredState,
}

impl ApplyTarget {
    pub fn new(kind: impl Into<String>, intent: ApplyIntent) -> Self {
        Self {
            kind: kind.into(),
            intent,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    pub fn with_body(mut self, body: DesiredState) -> Self {
        self.body = body;
        self
    }

    /// Validate the identity and move `name`/`partition` out of the body.
    ///
    /// The returned state never carries identity fields, so they can only
    /// travel in the object path.
    pub fn resolve(&self) -> Result<(ResourceIdentity, DesiredState)> {
        let mut body = self.body.clone();
        let body_name = body.take_text("name")?;
        let body_partition = body.take_text("partition")?;

        let name = pick("name", self.name.as_deref(), body_name)?.ok_or_else(|| {
            ApplyError::InvalidIdentity("name is required (flag or body field)".to_string())
        })?;
        let partition = pick("partition", self.partition.as_deref(), body_partition)?
            .unwrap_or_else(|| DEFAULT_PARTITION.to_string());

        let identity = ResourceIdentity::new(&self.kind, name, partition)?;
        Ok((identity, body))
    }
}

fn pick(field: &str, explicit: Option<&str>, from_body: Option<String>) -> Result<Option<String>> {
    match (explicit, from_body) {
        (Some(a), Some(b)) if a != b => Err(ApplyError::InvalidIdentity(format!(
            "{} '{}' conflicts with body {} '{}'",
            field, a, field, b
        ))),
        (Some(a), _) => Ok(Some(a.to_string())),
        (None, b) => Ok(b),
    }
}
