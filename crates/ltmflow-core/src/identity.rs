//! Resource identity and collection resolution

use crate::error::{ApplyError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PARTITION: &str = "Common";

/// Short names for the collections most playbooks touch
const KIND_ALIASES: &[(&str, &str)] = &[
    ("node", "ltm/node"),
    ("pool", "ltm/pool"),
    ("virtual", "ltm/virtual"),
    ("virtual-address", "ltm/virtual-address"),
    ("monitor-http", "ltm/monitor/http"),
    ("monitor-https", "ltm/monitor/https"),
    ("monitor-tcp", "ltm/monitor/tcp"),
    ("profile-http", "ltm/profile/http"),
    ("irule", "ltm/rule"),
    ("snat-pool", "ltm/snatpool"),
    ("wideip-a", "gtm/wideip/a"),
    ("gtm-pool-a", "gtm/pool/a"),
    ("vlan", "net/vlan"),
    ("self-ip", "net/self"),
];

/// Characters that would break `~partition~name` addressing
const FORBIDDEN_NAME_CHARS: &[char] = &['/', '~', '?', '#'];

/// Uniquely addresses a configuration object on the appliance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawIdentity", into = "RawIdentity")]
pub struct ResourceIdentity {
    kind: String,
    collection: String,
    name: String,
    partition: String,
}

impl ResourceIdentity {
    /// Validate and construct an identity.
    ///
    /// `kind` is either an alias from the table above (`node`, `pool`,
    /// `virtual`, ...) or a literal collection path such as `ltm/monitor/udp`.
    pub fn new(
        kind: impl AsRef<str>,
        name: impl AsRef<str>,
        partition: impl AsRef<str>,
    ) -> Result<Self> {
        let kind = kind.as_ref().trim();
        let name = name.as_ref();
        let partition = partition.as_ref();

        let collection = resolve_collection(kind).ok_or_else(|| {
            ApplyError::InvalidIdentity(format!(
                "kind '{}' does not resolve to an iControl collection",
                kind
            ))
        })?;
        validate_segment("name", name)?;
        validate_segment("partition", partition)?;
        if partition.contains('%') {
            return Err(ApplyError::InvalidIdentity(format!(
                "partition '{}' contains forbidden character '%'",
                partition
            )));
        }

        Ok(Self {
            kind: kind.to_string(),
            collection,
            name: name.to_string(),
            partition: partition.to_string(),
        })
    }

    /// Identity in the default `Common` partition
    pub fn in_common(kind: impl AsRef<str>, name: impl AsRef<str>) -> Result<Self> {
        Self::new(kind, name, DEFAULT_PARTITION)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Collection path relative to the API root, e.g. `ltm/node`
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Canonical object location, e.g. `ltm/node/~Common~host1.example.net`
    ///
    /// A route-domain suffix is percent-encoded: `10.0.0.5%2` becomes `10.0.0.5%252`.
    pub fn object_path(&self) -> String {
        format!(
            "{}/~{}~{}",
            self.collection,
            self.partition,
            self.name.replace('%', "%25")
        )
    }

    /// The appliance-side full path, e.g. `/Common/host1.example.net`
    pub fn full_path(&self) -> String {
        format!("/{}/{}", self.partition, self.name)
    }
}

impl std::fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.full_path())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawIdentity {
    kind: String,
    name: String,
    #[serde(default = "default_partition")]
    partition: String,
}

fn default_partition() -> String {
    DEFAULT_PARTITION.to_string()
}

impl TryFrom<RawIdentity> for ResourceIdentity {
    type Error = ApplyError;

    fn try_from(raw: RawIdentity) -> Result<Self> {
        ResourceIdentity::new(raw.kind, raw.name, raw.partition)
    }
}

impl From<ResourceIdentity> for RawIdentity {
    fn from(id: ResourceIdentity) -> Self {
        Self {
            kind: id.kind,
            name: id.name,
            partition: id.partition,
        }
    }
}

/// Map a kind to its collection path
pub fn resolve_collection(kind: &str) -> Option<String> {
    let lowered = kind.trim().to_ascii_lowercase();
    if let Some((_, path)) = KIND_ALIASES.iter().find(|(alias, _)| *alias == lowered) {
        return Some((*path).to_string());
    }

    let path = lowered.trim_matches('/');
    let path = path.strip_prefix("mgmt/tm/").unwrap_or(path);
    if path.is_empty() {
        return None;
    }

    let valid = path.split('/').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    });
    valid.then(|| path.to_string())
}

fn validate_segment(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApplyError::InvalidIdentity(format!("{} must not be empty", field)));
    }
    if let Some(c) = value
        .chars()
        .find(|c| c.is_whitespace() || FORBIDDEN_NAME_CHARS.contains(c))
    {
        return Err(ApplyError::InvalidIdentity(format!(
            "{} '{}' contains forbidden character {:?}",
            field, value, c
        )));
    }
    Ok(())
}
