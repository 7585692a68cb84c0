//! Property wire types shared by the UI, the CLI and the server
//!
//! These types mirror the JSON exchanged on the `/properties` resource:
//! - `PropertyModel`: one configuration entry
//! - `PropertySet`: the `whichPropertySet` query selector
//! - `RoleInfo`: the role/session flags read by the settings page

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single server-held configuration property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyModel {
    /// Property key, unique within a queried collection
    pub key: String,

    /// Current (operator-editable) value
    pub value: String,

    /// Whether changing this property only takes effect after a restart
    #[serde(default)]
    pub needs_restart_if_changed: bool,

    /// Whether a saved change to this property is waiting for a restart
    #[serde(default)]
    pub needs_restart: bool,
}

impl PropertyModel {
    /// Create a property that needs no restart when changed
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            needs_restart_if_changed: false,
            needs_restart: false,
        }
    }

    /// Mark the property as requiring a restart when its value changes
    pub fn with_restart_if_changed(mut self, needs_restart_if_changed: bool) -> Self {
        self.needs_restart_if_changed = needs_restart_if_changed;
        self
    }
}

/// Which subset of the server's properties to query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertySet {
    /// Every property
    #[default]
    All,
    /// Properties that can change without a restart
    Mutable,
    /// Properties whose change requires a restart
    Immutable,
}

impl PropertySet {
    /// The selector value used in `?whichPropertySet=`
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertySet::All => "all",
            PropertySet::Mutable => "mutable",
            PropertySet::Immutable => "immutable",
        }
    }

    /// Parse a selector the way the server does: case-insensitive, and
    /// anything unrecognised selects every property.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertySet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(PropertySet::All),
            "mutable" => Ok(PropertySet::Mutable),
            "immutable" => Ok(PropertySet::Immutable),
            other => Err(format!("Unknown property set: {}", other)),
        }
    }
}

/// Role information for the current session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    /// Whether the session belongs to an administrator
    pub admin: bool,
}

/// Response of `GET /properties/restart-required`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestartStatus {
    pub restart_required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_wire_format() {
        let prop = PropertyModel::new("detection.confidence", "0.5").with_restart_if_changed(true);

        let json = serde_json::to_value(&prop).unwrap();
        assert_eq!(json["key"], "detection.confidence");
        assert_eq!(json["value"], "0.5");
        assert_eq!(json["needsRestartIfChanged"], true);
        assert_eq!(json["needsRestart"], false);
    }

    #[test]
    fn test_property_missing_flags_default_to_false() {
        let prop: PropertyModel = serde_json::from_str(r#"{"key":"a","value":"1"}"#).unwrap();
        assert_eq!(prop, PropertyModel::new("a", "1"));
    }

    #[test]
    fn test_property_set_parsing() {
        assert_eq!("MUTABLE".parse::<PropertySet>().unwrap(), PropertySet::Mutable);
        assert_eq!("immutable".parse::<PropertySet>().unwrap(), PropertySet::Immutable);
        assert!("everything".parse::<PropertySet>().is_err());

        assert_eq!(PropertySet::parse_lenient("everything"), PropertySet::All);
        assert_eq!(PropertySet::parse_lenient("Mutable"), PropertySet::Mutable);
        assert_eq!(PropertySet::Immutable.to_string(), "immutable");
    }
}
