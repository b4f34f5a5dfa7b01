//! Outcome of a single apply

use crate::error::ApplyError;
use serde::{Serialize, Serializer};

/// Mutation performed (or skipped) by an apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// A new object was posted
    Create,
    /// An existing object was patched
    Update,
    /// An existing object was deleted
    Delete,
    /// The desired state already holds, or the appliance refused a field
    NoOp,
    /// Nothing was attempted (invalid input or failed probe)
    Skipped,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::NoOp => write!(f, "no-op"),
            Operation::Skipped => write!(f, "skipped"),
        }
    }
}

/// Result handed back to the caller, exactly one per apply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyResult {
    pub changed: bool,

    pub succeeded: bool,

    pub message: String,

    /// Status of the last HTTP response, `None` when no response arrived
    pub http_status: Option<u16>,

    pub operation: Operation,

    #[serde(serialize_with = "serialize_failure")]
    pub failure: Option<ApplyError>,
}

impl ApplyResult {
    pub fn changed(operation: Operation, status: u16, message: impl Into<String>) -> Self {
        Self {
            changed: true,
            succeeded: true,
            message: message.into(),
            http_status: Some(status),
            operation,
            failure: None,
        }
    }

    pub fn unchanged(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            changed: false,
            succeeded: true,
            message: message.into(),
            http_status: status,
            operation: Operation::NoOp,
            failure: None,
        }
    }

    pub fn failed(operation: Operation, error: ApplyError) -> Self {
        Self {
            changed: false,
            succeeded: false,
            message: error.to_string(),
            http_status: error.http_status(),
            operation,
            failure: Some(error),
        }
    }
}

fn serialize_failure<S: Serializer>(
    failure: &Option<ApplyError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match failure {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}
