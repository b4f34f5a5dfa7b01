//! The single JSON object printed on stdout for every invocation

use ltmflow_core::ApplyResult;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Outcome {
    pub changed: bool,
    pub failed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub facts: Option<Value>,
}

impl Outcome {
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            msg: Some(msg.into()),
            ..Default::default()
        }
    }

    pub fn with_facts(mut self, facts: Value) -> Self {
        self.facts = Some(facts);
        self
    }

    pub fn print(&self) {
        match serde_json::to_string(self) {
            Ok(line) => println!("{}", line),
            // フィールドは全て文字列化可能なので通常ここには来ない
            Err(e) => println!(r#"{{"changed":false,"failed":true,"msg":"{}"}}"#, e),
        }
    }
}

impl From<ApplyResult> for Outcome {
    fn from(result: ApplyResult) -> Self {
        Self {
            changed: result.changed,
            failed: !result.succeeded,
            msg: Some(result.message),
            status: result.http_status,
            operation: Some(result.operation.to_string()),
            facts: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltmflow_core::{ApplyError, Operation};

    #[test]
    fn test_from_apply_result() {
        let outcome = Outcome::from(ApplyResult::changed(Operation::Create, 200, "created"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["changed"], true);
        assert_eq!(json["failed"], false);
        assert_eq!(json["status"], 200);
        assert_eq!(json["operation"], "create");
        assert!(json.get("facts").is_none());
    }

    #[test]
    fn test_failure_without_status() {
        let result = ApplyResult::failed(
            Operation::Skipped,
            ApplyError::InvalidIdentity("name is empty".to_string()),
        );
        let json = serde_json::to_value(Outcome::from(result)).unwrap();
        assert_eq!(json["failed"], true);
        assert!(json.get("status").is_none());
    }
}
