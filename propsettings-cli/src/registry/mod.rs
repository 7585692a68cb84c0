//! Server-side property registry
//!
//! Holds the properties served on `/properties`:
//! - Defaults loaded from a TOML file at startup
//! - Operator overrides persisted to a separate custom TOML file
//! - Live values for properties that apply without a restart
//! - Restart bookkeeping for properties that do not

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use propsettings_shared::{PropertyModel, PropertySet};

/// Header written at the top of the custom properties file
const CUSTOM_FILE_HEADER: &str = "# modified\n";

/// Registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize custom properties: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Decides which properties apply without a restart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPolicy {
    /// Keys starting with one of these prefixes are mutable
    pub mutable_prefixes: Vec<String>,
    /// Keys that need a restart even though they match a mutable prefix
    pub restart_required_keys: Vec<String>,
}

impl Default for PropertyPolicy {
    fn default() -> Self {
        Self {
            mutable_prefixes: vec!["detection.".to_string()],
            restart_required_keys: vec!["detection.models.dir.path".to_string()],
        }
    }
}

impl PropertyPolicy {
    pub fn is_mutable(&self, key: &str) -> bool {
        self.mutable_prefixes.iter().any(|p| key.starts_with(p.as_str()))
            && !self.restart_required_keys.iter().any(|k| k == key)
    }

    pub fn matches(&self, set: PropertySet, key: &str) -> bool {
        match set {
            PropertySet::All => true,
            PropertySet::Mutable => self.is_mutable(key),
            PropertySet::Immutable => !self.is_mutable(key),
        }
    }
}

/// In-memory view of the server's properties
#[derive(Debug)]
pub struct PropertyRegistry {
    policy: PropertyPolicy,
    /// Effective values when the registry was loaded
    startup: BTreeMap<String, String>,
    /// Values in effect right now
    current: BTreeMap<String, String>,
    /// Operator overrides, mirrored to `custom_path`
    custom: BTreeMap<String, String>,
    custom_path: Option<PathBuf>,
    restart_required: bool,
}

impl PropertyRegistry {
    /// Build a registry from in-memory defaults, without a custom file
    pub fn new(defaults: BTreeMap<String, String>, policy: PropertyPolicy) -> Self {
        Self {
            policy,
            startup: defaults.clone(),
            current: defaults,
            custom: BTreeMap::new(),
            custom_path: None,
            restart_required: false,
        }
    }

    /// Load defaults and, if present, the custom overrides file
    pub fn load(
        defaults_path: &Path,
        custom_path: &Path,
        policy: PropertyPolicy,
    ) -> Result<Self, RegistryError> {
        let defaults = read_properties_file(defaults_path)?;
        let custom = if custom_path.exists() {
            read_properties_file(custom_path)?
        } else {
            BTreeMap::new()
        };

        info!(
            "Loaded {} properties from {} ({} overrides from {})",
            defaults.len(),
            defaults_path.display(),
            custom.len(),
            custom_path.display()
        );

        let mut startup = defaults;
        startup.extend(custom.clone());

        Ok(Self {
            policy,
            current: startup.clone(),
            startup,
            custom,
            custom_path: Some(custom_path.to_path_buf()),
            restart_required: false,
        })
    }

    pub fn policy(&self) -> &PropertyPolicy {
        &self.policy
    }

    pub fn restart_required(&self) -> bool {
        self.restart_required
    }

    /// Effective value of `key`: the override if any, else the live value
    pub fn value(&self, key: &str) -> Option<&str> {
        self.custom
            .get(key)
            .or_else(|| self.current.get(key))
            .map(String::as_str)
    }

    /// Value of `key` as applied by the running system
    pub fn live_value(&self, key: &str) -> Option<&str> {
        self.current.get(key).map(String::as_str)
    }

    fn model(&self, key: &str) -> Option<PropertyModel> {
        let value = self.value(key)?;
        let needs_restart_if_changed = !self.policy.is_mutable(key);
        let changed_since_startup = self.startup.get(key).map(String::as_str) != Some(value);

        Some(PropertyModel {
            key: key.to_string(),
            value: value.to_string(),
            needs_restart_if_changed,
            needs_restart: needs_restart_if_changed && changed_since_startup,
        })
    }

    /// Properties in `set`, sorted by key
    pub fn list(&self, set: PropertySet) -> Vec<PropertyModel> {
        let keys: BTreeSet<&String> = self.current.keys().chain(self.custom.keys()).collect();
        keys.into_iter()
            .filter(|k| self.policy.matches(set, k))
            .filter_map(|k| self.model(k))
            .collect()
    }

    /// Store changed properties and return them as now seen by the server.
    ///
    /// Mutable properties take effect immediately; the others are persisted
    /// and flag the server as needing a restart.
    pub fn save(&mut self, changed: &[PropertyModel]) -> Result<Vec<PropertyModel>, RegistryError> {
        if changed.is_empty() {
            return Ok(Vec::new());
        }

        // Stage overrides and persist them before touching in-memory state
        let mut custom = self.custom.clone();
        for prop in changed {
            info!("Saving property {} = {:?}", prop.key, prop.value);
            if !self.current.contains_key(&prop.key) && !self.custom.contains_key(&prop.key) {
                warn!("Saving unknown property {}", prop.key);
            }
            custom.insert(prop.key.clone(), prop.value.clone());
        }
        self.persist(&custom)?;

        self.custom = custom;
        for prop in changed {
            if self.policy.is_mutable(&prop.key) {
                self.current.insert(prop.key.clone(), prop.value.clone());
            }
        }

        let saved: Vec<PropertyModel> = changed.iter().filter_map(|p| self.model(&p.key)).collect();
        if saved.iter().any(|p| p.needs_restart) {
            warn!("Saved properties require a restart to take effect");
            self.restart_required = true;
        }
        Ok(saved)
    }

    fn persist(&self, custom: &BTreeMap<String, String>) -> Result<(), RegistryError> {
        let Some(path) = &self.custom_path else {
            return Ok(());
        };

        let body = toml::to_string(custom)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| RegistryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, format!("{}{}", CUSTOM_FILE_HEADER, body)).map_err(|source| {
            RegistryError::Io {
                path: path.clone(),
                source,
            }
        })?;
        info!("Custom properties written to {}", path.display());
        Ok(())
    }
}

/// Read a TOML properties file into flat `dotted.key -> value` pairs
pub fn read_properties_file(path: &Path) -> Result<BTreeMap<String, String>, RegistryError> {
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_properties(&content).map_err(|message| RegistryError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse TOML into flat properties; nested tables become dotted keys
pub fn parse_properties(content: &str) -> Result<BTreeMap<String, String>, String> {
    let table: toml::Table = content.parse().map_err(|e: toml::de::Error| e.to_string())?;
    let mut properties = BTreeMap::new();
    flatten_table("", &table, &mut properties);
    Ok(properties)
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::Table(nested) => flatten_table(&full_key, nested, out),
            toml::Value::String(s) => {
                out.insert(full_key, s.clone());
            }
            other => {
                out.insert(full_key, other.to_string());
            }
        }
    }
}
