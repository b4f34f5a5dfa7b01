//! Connection profiles
//!
//! ```yaml
//! default: lab
//! profiles:
//!   lab:
//!     host: 192.0.2.1
//!     username: admin
//!     password_env: LAB_BIGIP_PASSWORD
//!     insecure: true
//! ```

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Contents of a profiles file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFile {
    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

/// Connection settings for one appliance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub host: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub password: Option<String>,

    /// Name of an environment variable holding the password
    #[serde(default)]
    pub password_env: Option<String>,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default)]
    pub api_root: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_username() -> String {
    "admin".to_string()
}

impl ProfileFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Pick the named profile, or the file's default when `name` is `None`
    pub fn select(&self, name: Option<&str>) -> Result<(&str, &Profile)> {
        let name = match name {
            Some(name) => name,
            None => self.default.as_deref().ok_or(ConfigError::NoDefaultProfile)?,
        };
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }
}

impl Profile {
    /// Inline password first, then the variable named by `password_env`
    pub fn resolve_password(&self, profile_name: &str) -> Result<String> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }
        match &self.password_env {
            Some(var) => std::env::var(var).map_err(|_| ConfigError::MissingPasswordEnv {
                profile: profile_name.to_string(),
                var: var.clone(),
            }),
            None => Err(ConfigError::MissingPassword {
                profile: profile_name.to_string(),
            }),
        }
    }
}
