//! Change tracking against the last-known server values
//!
//! A `TrackedProperties` pairs the records shown in a form with the
//! `ServerSnapshot` they were loaded from. Each collection owns its own
//! snapshot, so two collections can be queried and saved independently.

use std::collections::HashMap;

use crate::property::PropertyModel;

/// Last-known persisted value per property key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerSnapshot {
    values: HashMap<String, String>,
}

impl ServerSnapshot {
    /// Build a snapshot from a query response
    pub fn from_properties(properties: &[PropertyModel]) -> Self {
        let mut snapshot = Self::default();
        snapshot.reconcile(properties);
        snapshot
    }

    /// Last-known server value for `key`, if the server ever reported one
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Record the values of a save response as persisted
    pub fn reconcile(&mut self, saved: &[PropertyModel]) {
        for prop in saved {
            self.values.insert(prop.key.clone(), prop.value.clone());
        }
    }

    /// Whether `property` differs from the server.
    ///
    /// Keys the server never reported always count as changed.
    pub fn value_changed(&self, property: &PropertyModel) -> bool {
        self.get(&property.key) != Some(property.value.as_str())
    }

    /// Put `property` back to its server value. Unknown keys are left alone.
    pub fn reset_property(&self, property: &mut PropertyModel) {
        if let Some(value) = self.get(&property.key) {
            property.value = value.to_string();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered collection of properties plus the snapshot it is diffed against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedProperties {
    properties: Vec<PropertyModel>,
    snapshot: ServerSnapshot,
}

impl TrackedProperties {
    /// Wrap a query response; the snapshot starts equal to the records
    pub fn from_query(properties: Vec<PropertyModel>) -> Self {
        let snapshot = ServerSnapshot::from_properties(&properties);
        Self { properties, snapshot }
    }

    /// Wrap records with an explicit snapshot
    pub fn with_snapshot(properties: Vec<PropertyModel>, snapshot: ServerSnapshot) -> Self {
        Self { properties, snapshot }
    }

    pub fn properties(&self) -> &[PropertyModel] {
        &self.properties
    }

    pub fn snapshot(&self) -> &ServerSnapshot {
        &self.snapshot
    }

    pub fn get(&self, key: &str) -> Option<&PropertyModel> {
        self.properties.iter().find(|p| p.key == key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Edit the value of `key`. Returns `false` if no such record exists.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.properties.iter_mut().find(|p| p.key == key) {
            Some(prop) => {
                prop.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Whether the record for `key` differs from the server
    pub fn value_changed(&self, key: &str) -> bool {
        self.get(key).is_some_and(|p| self.snapshot.value_changed(p))
    }

    /// Put the record for `key` back to its server value
    pub fn reset_property(&mut self, key: &str) {
        let snapshot = &self.snapshot;
        if let Some(prop) = self.properties.iter_mut().find(|p| p.key == key) {
            snapshot.reset_property(prop);
        }
    }

    /// Put every record back to its server value
    pub fn reset_all(&mut self) {
        let snapshot = &self.snapshot;
        for prop in &mut self.properties {
            snapshot.reset_property(prop);
        }
    }

    /// The records whose value differs from the server, in display order
    pub fn changed(&self) -> Vec<PropertyModel> {
        self.properties
            .iter()
            .filter(|p| self.snapshot.value_changed(p))
            .cloned()
            .collect()
    }

    pub fn unsaved_count(&self) -> usize {
        self.properties
            .iter()
            .filter(|p| self.snapshot.value_changed(p))
            .count()
    }

    pub fn has_unsaved(&self) -> bool {
        self.properties.iter().any(|p| self.snapshot.value_changed(p))
    }

    /// Apply the response to a save of `sent`.
    ///
    /// The response is authoritative: its values become the snapshot, and
    /// matching local records take the saved restart flag. A record edited
    /// again after `sent` was taken keeps the newer local value and stays
    /// unsaved.
    pub fn reconcile(&mut self, sent: &[PropertyModel], saved: &[PropertyModel]) {
        self.snapshot.reconcile(saved);
        for saved_prop in saved {
            let Some(prop) = self.properties.iter_mut().find(|p| p.key == saved_prop.key) else {
                continue;
            };
            prop.needs_restart = saved_prop.needs_restart;
            let edited_in_flight = sent
                .iter()
                .find(|s| s.key == saved_prop.key)
                .is_some_and(|s| s.value != prop.value);
            if !edited_in_flight {
                prop.value = saved_prop.value.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrackedProperties {
        TrackedProperties::from_query(vec![
            PropertyModel::new("a", "1"),
            PropertyModel::new("b", "2"),
        ])
    }

    #[test]
    fn test_fresh_query_is_clean() {
        let tracked = sample();
        assert_eq!(tracked.snapshot().get("a"), Some("1"));
        assert_eq!(tracked.snapshot().get("b"), Some("2"));
        assert!(!tracked.has_unsaved());
        assert_eq!(tracked.unsaved_count(), 0);
        assert!(tracked.changed().is_empty());
    }

    #[test]
    fn test_edit_marks_only_that_record() {
        let mut tracked = sample();
        assert!(tracked.set_value("a", "9"));

        assert!(tracked.value_changed("a"));
        assert!(!tracked.value_changed("b"));
        assert!(tracked.has_unsaved());
        assert_eq!(tracked.unsaved_count(), 1);
        assert_eq!(tracked.changed(), vec![PropertyModel::new("a", "9")]);
    }

    #[test]
    fn test_edit_back_to_server_value_is_clean() {
        let mut tracked = sample();
        tracked.set_value("a", "9");
        tracked.set_value("a", "1");
        assert!(!tracked.has_unsaved());
    }

    #[test]
    fn test_comparison_is_exact() {
        let mut tracked = sample();
        tracked.set_value("a", "1.0");
        assert!(tracked.value_changed("a"));
        tracked.set_value("a", " 1");
        assert!(tracked.value_changed("a"));
    }

    #[test]
    fn test_unknown_key_edit_is_rejected() {
        let mut tracked = sample();
        assert!(!tracked.set_value("missing", "x"));
        assert!(!tracked.value_changed("missing"));
    }

    #[test]
    fn test_key_absent_from_snapshot_is_always_changed() {
        let tracked = TrackedProperties::with_snapshot(
            vec![PropertyModel::new("a", "1")],
            ServerSnapshot::default(),
        );
        assert!(tracked.value_changed("a"));
        assert_eq!(tracked.unsaved_count(), 1);
    }

    #[test]
    fn test_reset_property_restores_server_value() {
        let mut tracked = sample();
        tracked.set_value("a", "9");
        tracked.set_value("b", "8");
        tracked.reset_property("a");

        assert_eq!(tracked.get("a").unwrap().value, "1");
        assert!(!tracked.value_changed("a"));
        assert!(tracked.value_changed("b"));
    }

    #[test]
    fn test_reset_all() {
        let mut tracked = sample();
        tracked.set_value("a", "9");
        tracked.set_value("b", "8");
        tracked.reset_all();

        assert!(!tracked.has_unsaved());
        assert_eq!(tracked.get("b").unwrap().value, "2");
    }

    #[test]
    fn test_reconcile_uses_response_values() {
        let mut tracked = sample();
        tracked.set_value("a", "9");

        let mut saved = PropertyModel::new("a", "9");
        saved.needs_restart = true;
        tracked.reconcile(&[PropertyModel::new("a", "9")], &[saved]);

        assert_eq!(tracked.snapshot().get("a"), Some("9"));
        assert_eq!(tracked.snapshot().get("b"), Some("2"));
        assert!(!tracked.value_changed("a"));
        assert!(tracked.get("a").unwrap().needs_restart);
    }

    #[test]
    fn test_reconcile_adopts_server_adjusted_value() {
        let mut tracked = sample();
        tracked.set_value("a", "09");
        tracked.reconcile(&[PropertyModel::new("a", "09")], &[PropertyModel::new("a", "9")]);

        assert_eq!(tracked.get("a").unwrap().value, "9");
        assert!(!tracked.has_unsaved());
    }

    #[test]
    fn test_reconcile_keeps_edit_made_during_save() {
        let mut tracked = sample();
        tracked.set_value("a", "9");
        let sent = tracked.changed();

        tracked.set_value("a", "7");
        tracked.reconcile(&sent, &[PropertyModel::new("a", "9")]);

        assert_eq!(tracked.snapshot().get("a"), Some("9"));
        assert_eq!(tracked.get("a").unwrap().value, "7");
        assert!(tracked.value_changed("a"));
        assert_eq!(tracked.unsaved_count(), 1);
    }

    #[test]
    fn test_empty_collection() {
        let tracked = TrackedProperties::default();
        assert_eq!(tracked.unsaved_count(), 0);
        assert!(!tracked.has_unsaved());
    }
}
