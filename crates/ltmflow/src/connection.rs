use anyhow::Context;
use clap::Args;
use ltmflow_icontrol::{ConnectionConfig, IControlClient};
use std::path::PathBuf;
use std::time::Duration;

/// アプライアンスへの接続オプション（全サブコマンド共通）
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// アプライアンスのホスト名またはIPアドレス
    #[arg(long, env = "LTMFLOW_HOST", global = true)]
    pub host: Option<String>,

    /// ログインユーザー名（デフォルト: admin）
    #[arg(short = 'u', long, env = "LTMFLOW_USERNAME", global = true)]
    pub username: Option<String>,

    /// ログインパスワード
    #[arg(
        short = 'p',
        long,
        env = "LTMFLOW_PASSWORD",
        hide_env_values = true,
        global = true
    )]
    pub password: Option<String>,

    /// 使用するプロファイル名（省略時は default）
    #[arg(long, env = "LTMFLOW_PROFILE", global = true)]
    pub profile: Option<String>,

    /// プロファイルファイルのパス
    #[arg(long, global = true)]
    pub profile_file: Option<PathBuf>,

    /// 証明書の検証をスキップ（自己署名証明書のアプライアンス向け）
    #[arg(short = 'k', long, global = true)]
    pub insecure: bool,

    /// リクエストのタイムアウト（秒）
    #[arg(long, global = true)]
    pub request_timeout: Option<u64>,

    #[arg(long, env = "LTMFLOW_SCHEME", default_value = "https", hide = true, global = true)]
    pub scheme: String,
}

impl ConnectionArgs {
    /// フラグ > プロファイル の順で接続設定を確定する
    pub fn resolve(&self) -> anyhow::Result<ConnectionConfig> {
        // --host だけで完結する場合はプロファイルファイルを読まない
        let profile = if self.host.is_none() || self.profile.is_some() {
            let file = ltmflow_config::load_profiles(self.profile_file.as_deref())
                .context("接続先が指定されていません (--host またはプロファイル)")?;
            let (name, profile) = file.select(self.profile.as_deref())?;
            tracing::debug!("Using profile '{}'", name);
            Some((name.to_string(), profile.clone()))
        } else {
            None
        };

        let host = match (&self.host, &profile) {
            (Some(host), _) => host.clone(),
            (None, Some((_, p))) => p.host.clone(),
            (None, None) => anyhow::bail!("接続先ホストが指定されていません"),
        };

        let username = self
            .username
            .clone()
            .or_else(|| profile.as_ref().map(|(_, p)| p.username.clone()))
            .unwrap_or_else(|| "admin".to_string());

        let password = match (&self.password, &profile) {
            (Some(password), _) => password.clone(),
            (None, Some((name, p))) => p.resolve_password(name)?,
            (None, None) => anyhow::bail!("パスワードが指定されていません (--password または LTMFLOW_PASSWORD)"),
        };

        let mut config = ConnectionConfig::new(host, username, password).with_scheme(&self.scheme);
        let mut insecure = self.insecure;
        let mut timeout = self.request_timeout;

        if let Some((_, p)) = &profile {
            insecure |= p.insecure;
            timeout = timeout.or(p.timeout_secs);
            if let Some(root) = &p.api_root {
                config = config.with_api_root(root);
            }
        }

        config = config.with_insecure(insecure);
        if let Some(secs) = timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn client(&self) -> anyhow::Result<IControlClient> {
        let config = self.resolve()?;
        Ok(IControlClient::new(config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args() -> ConnectionArgs {
        ConnectionArgs {
            scheme: "https".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_flags_only() {
        let args = ConnectionArgs {
            host: Some("192.0.2.1".to_string()),
            password: Some("pw".to_string()),
            ..args()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.host, "192.0.2.1");
        assert_eq!(config.username, "admin");
        assert!(!config.insecure);
    }

    #[test]
    fn test_flags_without_password_fail() {
        let args = ConnectionArgs {
            host: Some("192.0.2.1".to_string()),
            ..args()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_profile_with_flag_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.yaml");
        fs::write(
            &path,
            "default: lab\nprofiles:\n  lab:\n    host: 192.0.2.1\n    password: pw\n    insecure: true\n    timeout_secs: 5\n",
        )
        .unwrap();

        let args = ConnectionArgs {
            profile_file: Some(path),
            username: Some("operator".to_string()),
            ..args()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.host, "192.0.2.1");
        assert_eq!(config.username, "operator");
        assert_eq!(config.password, "pw");
        assert!(config.insecure);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
