//! Property Store
//!
//! Remote CRUD over the `/properties` resource plus the change-tracking
//! operations the settings page needs. The transport is abstracted behind
//! `PropertiesResource` so the same store drives the browser (gloo-net), the
//! CLI (reqwest) and tests.

use async_trait::async_trait;
use tracing::debug;

use crate::property::{PropertyModel, PropertySet};
use crate::tracking::TrackedProperties;

/// Error types for property resource operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertiesError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Transport for the properties REST resource
///
/// `query` is `GET /properties?whichPropertySet=..`, `update` is
/// `PUT /properties` returning the saved records.
#[async_trait(?Send)]
pub trait PropertiesResource {
    async fn query(&self, set: PropertySet) -> Result<Vec<PropertyModel>, PropertiesError>;

    async fn update(
        &self,
        properties: &[PropertyModel],
    ) -> Result<Vec<PropertyModel>, PropertiesError>;
}

/// Query, diff, reset and save property collections
#[derive(Debug, Clone)]
pub struct PropertyStore<R> {
    resource: R,
}

impl<R: PropertiesResource> PropertyStore<R> {
    pub fn new(resource: R) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Fetch a property set; its snapshot is built from the response
    pub async fn query(&self, set: PropertySet) -> Result<TrackedProperties, PropertiesError> {
        let properties = self.resource.query(set).await?;
        debug!("Queried {} {} properties", properties.len(), set);
        Ok(TrackedProperties::from_query(properties))
    }

    pub async fn query_all(&self) -> Result<TrackedProperties, PropertiesError> {
        self.query(PropertySet::All).await
    }

    pub async fn query_mutable(&self) -> Result<TrackedProperties, PropertiesError> {
        self.query(PropertySet::Mutable).await
    }

    pub async fn query_immutable(&self) -> Result<TrackedProperties, PropertiesError> {
        self.query(PropertySet::Immutable).await
    }

    /// Save the changed records of `properties` and reconcile the response.
    ///
    /// Returns the records the server reports as saved.
    pub async fn update(
        &self,
        properties: &mut TrackedProperties,
    ) -> Result<Vec<PropertyModel>, PropertiesError> {
        let changed = properties.changed();
        let saved = self.save_changed(changed.clone()).await?;
        properties.reconcile(&changed, &saved);
        Ok(saved)
    }

    /// PUT an already filtered list of changed records.
    ///
    /// The caller reconciles the returned records into its collection.
    pub async fn save_changed(
        &self,
        changed: Vec<PropertyModel>,
    ) -> Result<Vec<PropertyModel>, PropertiesError> {
        debug!("Saving {} modified properties", changed.len());
        let saved = self.resource.update(&changed).await?;
        for prop in &saved {
            debug!(key = %prop.key, needs_restart = prop.needs_restart, "Property saved");
        }
        Ok(saved)
    }

    pub fn reset_all(&self, properties: &mut TrackedProperties) {
        properties.reset_all();
    }

    pub fn unsaved_properties_count(&self, properties: &TrackedProperties) -> usize {
        properties.unsaved_count()
    }

    pub fn has_unsaved_properties(&self, properties: &TrackedProperties) -> bool {
        properties.has_unsaved()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory resource used by the store and controller tests

    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    #[derive(Default)]
    pub struct MemoryResource {
        pub values: RefCell<BTreeMap<String, String>>,
        pub queries: RefCell<Vec<PropertySet>>,
        pub puts: RefCell<Vec<Vec<PropertyModel>>>,
        pub fail_updates: RefCell<bool>,
    }

    impl MemoryResource {
        pub fn with_values(values: &[(&str, &str)]) -> Self {
            let resource = Self::default();
            for (k, v) in values {
                resource.values.borrow_mut().insert(k.to_string(), v.to_string());
            }
            resource
        }

        fn is_mutable(key: &str) -> bool {
            key.starts_with("detection.")
        }
    }

    #[async_trait(?Send)]
    impl PropertiesResource for MemoryResource {
        async fn query(&self, set: PropertySet) -> Result<Vec<PropertyModel>, PropertiesError> {
            self.queries.borrow_mut().push(set);
            Ok(self
                .values
                .borrow()
                .iter()
                .filter(|(k, _)| match set {
                    PropertySet::All => true,
                    PropertySet::Mutable => Self::is_mutable(k),
                    PropertySet::Immutable => !Self::is_mutable(k),
                })
                .map(|(k, v)| PropertyModel::new(k.clone(), v.clone()))
                .collect())
        }

        async fn update(
            &self,
            properties: &[PropertyModel],
        ) -> Result<Vec<PropertyModel>, PropertiesError> {
            self.puts.borrow_mut().push(properties.to_vec());
            if *self.fail_updates.borrow() {
                return Err(PropertiesError::Status {
                    status: 500,
                    message: "Internal Server Error".to_string(),
                });
            }
            let mut values = self.values.borrow_mut();
            Ok(properties
                .iter()
                .map(|p| {
                    values.insert(p.key.clone(), p.value.clone());
                    p.clone()
                })
                .collect())
        }
    }
}
