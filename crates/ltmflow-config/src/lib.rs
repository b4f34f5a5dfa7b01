pub mod error;
pub mod profile;

pub use error::*;
pub use profile::{Profile, ProfileFile};

use std::path::{Path, PathBuf};

const CANDIDATES: &[&str] = &[
    "ltmflow.local.yaml",
    ".ltmflow.local.yaml",
    "ltmflow.yaml",
    ".ltmflow.yaml",
];

/// ltmflowの設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("ltmflow");
    Ok(config_dir)
}

/// プロファイルファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 引数で明示されたパス
/// 2. 環境変数 LTMFLOW_CONFIG_PATH (直接パス指定)
/// 3. カレントディレクトリ: ltmflow.local.yaml, .ltmflow.local.yaml, ltmflow.yaml, .ltmflow.yaml
/// 4. ~/.config/ltmflow/profiles.yaml (グローバル設定)
pub fn find_profile_file(explicit: Option<&Path>) -> Result<PathBuf> {
    // 1. 明示指定は存在しなくてもそのまま返す（読み込み時に IO エラーになる）
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    // 2. 環境変数で直接指定
    if let Ok(config_path) = std::env::var("LTMFLOW_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. カレントディレクトリで検索
    let current_dir = std::env::current_dir()?;
    for filename in CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 4. グローバル設定ファイル
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("profiles.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ProfileFileNotFound)
}

/// プロファイルファイルを探して読み込む
pub fn load_profiles(explicit: Option<&Path>) -> Result<ProfileFile> {
    let path = find_profile_file(explicit)?;
    ProfileFile::load(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("ltmflow"));
    }

    #[test]
    #[serial]
    fn test_find_profile_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("ltmflow.yaml"), "profiles: {}").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_profile_file(None);

        std::env::set_current_dir(original_dir).unwrap();
        assert!(result.unwrap().ends_with("ltmflow.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_profile_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        // ltmflow.yaml と ltmflow.local.yaml の両方を作成
        fs::write(temp_dir.path().join("ltmflow.yaml"), "# shared").unwrap();
        fs::write(temp_dir.path().join("ltmflow.local.yaml"), "# local").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_profile_file(None);

        std::env::set_current_dir(original_dir).unwrap();
        // ltmflow.local.yaml が優先される
        assert!(result.unwrap().ends_with("ltmflow.local.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_profile_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "profiles: {}").unwrap();

        unsafe {
            std::env::set_var("LTMFLOW_CONFIG_PATH", config_path.to_str().unwrap());
        }

        let result = find_profile_file(None).unwrap();
        assert_eq!(result, config_path);

        // クリーンアップ
        unsafe {
            std::env::remove_var("LTMFLOW_CONFIG_PATH");
        }
    }

    #[test]
    #[serial]
    fn test_explicit_path_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let explicit = temp_dir.path().join("team.yaml");

        unsafe {
            std::env::set_var("LTMFLOW_CONFIG_PATH", "/nonexistent/ltmflow.yaml");
        }
        let result = find_profile_file(Some(&explicit)).unwrap();
        unsafe {
            std::env::remove_var("LTMFLOW_CONFIG_PATH");
        }

        assert_eq!(result, explicit);
    }

    #[test]
    #[serial]
    fn test_load_profiles_from_explicit_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profiles.yaml");
        fs::write(
            &path,
            "default: lab\nprofiles:\n  lab:\n    host: 192.0.2.1\n    password: pw\n",
        )
        .unwrap();

        let file = load_profiles(Some(&path)).unwrap();
        let (_, profile) = file.select(None).unwrap();
        assert_eq!(profile.host, "192.0.2.1");
    }
}
