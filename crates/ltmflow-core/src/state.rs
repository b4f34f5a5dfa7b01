//! Desired state documents and boundary parsing
//!
//! Callers hand over the desired attributes in whatever textual form their
//! tooling produces: a JSON object, `key=value` pairs, or an already-typed
//! mapping. Everything is normalized here, once, before the reconciler sees it.

use crate::error::{ApplyError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body fields that address the object rather than describe it
pub const IDENTITY_FIELDS: &[&str] = &["name", "partition"];

/// Attributes to set on an appliance object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesiredState {
    attributes: Map<String, Value>,
}

impl DesiredState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// Parse a JSON object or `key=value` text into a desired state
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::new());
        }

        if trimmed.starts_with('{') {
            return match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Object(attributes)) => Ok(Self { attributes }),
                Ok(_) => Err(ApplyError::InvalidBody(
                    "JSON body must be an object".to_string(),
                )),
                Err(e) => Err(ApplyError::InvalidBody(format!("invalid JSON body: {}", e))),
            };
        }

        if trimmed.starts_with('[') || trimmed.starts_with('"') {
            return Err(ApplyError::InvalidBody(
                "JSON body must be an object".to_string(),
            ));
        }

        parse_key_values(trimmed).map(|attributes| Self { attributes })
    }

    /// Convert an arbitrary JSON value (e.g. from a params file)
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(attributes) => Ok(Self { attributes }),
            Value::String(text) => Self::parse(&text),
            other => Err(ApplyError::InvalidBody(format!(
                "expected a mapping, got {}",
                other
            ))),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes.iter()
    }

    /// Copy of the attributes without `name` and `partition`
    pub fn without_identity(&self) -> Map<String, Value> {
        self.attributes
            .iter()
            .filter(|(k, _)| !IDENTITY_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Remove a field, returning its value rendered as text
    pub(crate) fn take_text(&mut self, key: &str) -> Result<Option<String>> {
        match self.attributes.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(ApplyError::InvalidIdentity(format!(
                "body field '{}' must be a string, got {}",
                key, other
            ))),
        }
    }
}

impl From<Map<String, Value>> for DesiredState {
    fn from(attributes: Map<String, Value>) -> Self {
        Self::from_map(attributes)
    }
}

fn parse_key_values(text: &str) -> Result<Map<String, Value>> {
    let mut attributes = Map::new();
    for token in split_pairs(text)? {
        let (key, raw) = token.split_once('=').ok_or_else(|| {
            ApplyError::InvalidBody(format!("expected key=value, got '{}'", token))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ApplyError::InvalidBody(format!(
                "missing key in '{}'",
                token
            )));
        }
        attributes.insert(key.to_string(), coerce_scalar(raw.trim()));
    }
    Ok(attributes)
}

/// Split on whitespace and commas, keeping quoted values intact
fn split_pairs(text: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in text.chars() {
        match quote {
            Some(q) if c == q => {
                quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.push(c);
            }
            None if c.is_whitespace() || c == ',' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }

    if quote.is_some() {
        return Err(ApplyError::InvalidBody(format!(
            "unterminated quote in '{}'",
            text
        )));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn coerce_scalar(raw: &str) -> Value {
    for q in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(q) && raw.ends_with(q) {
            return Value::String(raw[1..raw.len() - 1].to_string());
        }
    }
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    // numbers only when they render back verbatim: 007, 1.10 and +5 stay text
    if let Ok(n) = raw.parse::<i64>() {
        if n.to_string() == raw {
            return Value::from(n);
        }
    }
    if raw.matches('.').count() == 1 {
        if let Some(n) = raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            if n.to_string() == raw {
                return Value::Number(n);
            }
        }
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_object() {
        let state = DesiredState::parse(r#"{"name": "foo", "address": "192.0.2.63"}"#).unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.get("address"), Some(&json!("192.0.2.63")));
    }

    #[test]
    fn test_parse_nested_json_is_kept() {
        let state = DesiredState::parse(
            r#"{"name":"NEW_WIDEIP","pools":[{"name":"NEW_POOL","partition":"Common","order":0}]}"#,
        )
        .unwrap();
        assert_eq!(state.get("pools").unwrap()[0]["order"], json!(0));
    }

    #[test]
    fn test_parse_key_values_coerces_scalars() {
        let state =
            DesiredState::parse("address=192.0.2.35, tagged=true ratio=3 weight=0.5 description='a b'")
                .unwrap();
        assert_eq!(state.get("address"), Some(&json!("192.0.2.35")));
        assert_eq!(state.get("tagged"), Some(&json!(true)));
        assert_eq!(state.get("ratio"), Some(&json!(3)));
        assert_eq!(state.get("weight"), Some(&json!(0.5)));
        assert_eq!(state.get("description"), Some(&json!("a b")));
    }

    #[test]
    fn test_parse_keeps_numbers_that_do_not_round_trip() {
        let state = DesiredState::parse("description=1.10 ratio=007 offset=+5 weight=-2 factor=2.5")
            .unwrap();
        assert_eq!(state.get("description"), Some(&json!("1.10")));
        assert_eq!(state.get("ratio"), Some(&json!("007")));
        assert_eq!(state.get("offset"), Some(&json!("+5")));
        assert_eq!(state.get("weight"), Some(&json!(-2)));
        assert_eq!(state.get("factor"), Some(&json!(2.5)));
    }

    #[test]
    fn test_parse_quoted_number_stays_text() {
        let state = DesiredState::parse(r#"port="80""#).unwrap();
        assert_eq!(state.get("port"), Some(&json!("80")));
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(DesiredState::parse("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_object_json() {
        assert!(matches!(
            DesiredState::parse("[1, 2]"),
            Err(ApplyError::InvalidBody(_))
        ));
        assert!(matches!(
            DesiredState::parse("{not json"),
            Err(ApplyError::InvalidBody(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bare_words() {
        let err = DesiredState::parse("address").unwrap_err();
        assert!(err.to_string().contains("expected key=value"));
    }

    #[test]
    fn test_parse_rejects_unterminated_quote() {
        assert!(DesiredState::parse("description='oops").is_err());
    }

    #[test]
    fn test_without_identity_strips_name_and_partition() {
        let state = DesiredState::new()
            .with("name", "x")
            .with("partition", "Common")
            .with("address", "10.0.0.5");
        let body = state.without_identity();
        assert_eq!(body.len(), 1);
        assert!(body.contains_key("address"));
    }

    #[test]
    fn test_from_value_accepts_string_form() {
        let state = DesiredState::from_value(json!("monitor=/Common/http")).unwrap();
        assert_eq!(state.get("monitor"), Some(&json!("/Common/http")));
        assert!(DesiredState::from_value(json!(42)).is_err());
    }
}
