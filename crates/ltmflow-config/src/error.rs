use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "プロファイルファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: ltmflow.local.yaml, .ltmflow.local.yaml, ltmflow.yaml, .ltmflow.yaml\n\
        - ~/.config/ltmflow/profiles.yaml\n\
        または LTMFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ProfileFileNotFound,

    #[error("プロファイル '{0}' が定義されていません")]
    ProfileNotFound(String),

    #[error("プロファイル名が指定されておらず、default も設定されていません")]
    NoDefaultProfile,

    #[error("プロファイル '{profile}' のパスワードがありません (password または password_env を指定してください)")]
    MissingPassword { profile: String },

    #[error("環境変数 {var} が設定されていません (プロファイル '{profile}')")]
    MissingPasswordEnv { profile: String, var: String },

    #[error("YAML パースエラー: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
