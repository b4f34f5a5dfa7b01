pub mod apply;
pub mod check;
pub mod facts;
pub mod request;

use anyhow::Context;
use ltmflow_core::DesiredState;
use std::path::Path;

/// `--body` / `--body-file` から DesiredState を組み立てる
///
/// ファイルは YAML または JSON のマッピング、あるいは key=value 形式を受け付ける。
pub(crate) fn read_body(text: Option<&str>, file: Option<&Path>) -> anyhow::Result<DesiredState> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("ボディファイルを読み込めません: {}", path.display()))?;
        return match serde_yaml::from_str::<serde_json::Value>(&content) {
            Ok(value @ serde_json::Value::Object(_)) => Ok(DesiredState::from_value(value)?),
            _ => Ok(DesiredState::parse(&content)?),
        };
    }

    match text {
        Some(text) => Ok(DesiredState::parse(text)?),
        None => Ok(DesiredState::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_body_inline() {
        let body = read_body(Some("address=10.0.0.5 connectionLimit=0"), None).unwrap();
        assert_eq!(body.get("address").unwrap(), "10.0.0.5");
        assert_eq!(body.get("connectionLimit").unwrap(), 0);
    }

    #[test]
    fn test_read_body_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.yaml");
        fs::write(&path, "name: web01\naddress: 10.0.0.5\nratio: 2\n").unwrap();

        let body = read_body(None, Some(&path)).unwrap();
        assert_eq!(body.get("name").unwrap(), "web01");
        assert_eq!(body.get("ratio").unwrap(), 2);
    }

    #[test]
    fn test_read_body_missing_file() {
        let result = read_body(None, Some(Path::new("/nonexistent/body.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_body_empty() {
        assert!(read_body(None, None).unwrap().is_empty());
    }
}
