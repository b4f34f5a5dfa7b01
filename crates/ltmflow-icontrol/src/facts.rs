//! Fact gathering from arbitrary iControl collections

use crate::error::{IControlError, Result};
use ltmflow_core::{Request, Transport};
use serde_json::{Map, Value};

/// Key that replaces `items`, which clashes with the caller's own loop keyword
pub const ITEMS_KEY: &str = "bigip_items";

/// Turn a user supplied URI into a path relative to the API root.
///
/// Accepts `/mgmt/tm/ltm/virtual`, `mgmt/tm/ltm/virtual` and `ltm/virtual`.
pub fn api_path(uri: &str) -> String {
    let uri = uri.trim();
    let with_slash = if uri.starts_with('/') {
        uri.to_string()
    } else {
        format!("/{}", uri)
    };
    with_slash
        .strip_prefix("/mgmt/tm/")
        .unwrap_or(&with_slash)
        .trim_start_matches('/')
        .to_string()
}

/// GET `uri` and return the response object with `items` renamed
pub async fn gather_facts<T: Transport>(transport: &T, uri: &str) -> Result<Map<String, Value>> {
    let path = api_path(uri);
    tracing::debug!("Gathering facts from {}", path);

    let response = transport.send(Request::get(path)).await?;
    if response.status != 200 {
        return Err(IControlError::Status {
            status: response.status,
            body: response.body,
        });
    }

    let mut facts = match response.json()? {
        Value::Object(map) => map,
        other => {
            return Err(IControlError::UnexpectedResponse(format!(
                "expected a JSON object, got {}",
                other
            )));
        }
    };

    let items = facts
        .remove("items")
        .unwrap_or_else(|| Value::Object(Map::new()));
    facts.insert(ITEMS_KEY.to_string(), items);
    Ok(facts)
}
