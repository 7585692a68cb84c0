//! Settings Controller
//!
//! Page-level orchestration of the properties settings page:
//! - two tracked collections (mutable and immutable properties)
//! - reset / count / save across both collections
//! - the navigation guard that protects unsaved edits
//!
//! The controller is a cheap `Clone` handle over single-threaded shared
//! state, so view callbacks and spawned tasks can each hold one. State is
//! never borrowed across an `.await`.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::future;
use tracing::{debug, info, warn};

use crate::guard::{ConfirmPolicy, GuardState, NavigationDecision, NavigationGuard};
use crate::property::{PropertyModel, RoleInfo};
use crate::store::{PropertiesError, PropertyStore, PropertiesResource};
use crate::tracking::TrackedProperties;

/// Message shown once both collections have been saved
pub const SAVE_SUCCESS_MESSAGE: &str = "System Properties have been saved!";

/// Which of the page's two collections a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyGroup {
    Mutable,
    Immutable,
}

/// Text of a confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmOptions {
    pub title: String,
    pub text: String,
    pub ok: String,
    pub cancel: String,
}

impl ConfirmOptions {
    /// The prompt raised when leaving a page with unsaved properties
    pub fn unsaved_changes() -> Self {
        Self {
            title: "Unsaved changes".to_string(),
            text: "You have modified system properties, but have not saved them to the server.  \
                   If you continue to another page, you will lose the changes you have made.  \
                   Are you sure you want to leave this page?"
                .to_string(),
            ok: "Yes".to_string(),
            cancel: "No".to_string(),
        }
    }
}

/// User-visible, fire-and-forget notifications
pub trait Notifier {
    fn success(&self, message: &str);
}

/// Modal confirmation prompt
#[async_trait(?Send)]
pub trait ConfirmDialog {
    /// Resolves `true` only when the operator answers affirmatively
    async fn confirm(&self, options: &ConfirmOptions) -> bool;
}

/// Programmatic access to the page router
///
/// The router must consult `SettingsController::on_navigation_start` for
/// every transition it performs, including the ones started through `go`.
pub trait Navigator {
    fn go(&self, target: &str);
}

/// Environment services the controller talks to
#[derive(Clone)]
pub struct Collaborators {
    pub notifier: Rc<dyn Notifier>,
    pub dialog: Rc<dyn ConfirmDialog>,
    pub navigator: Rc<dyn Navigator>,
}

struct SettingsState {
    mutable: TrackedProperties,
    immutable: TrackedProperties,
    guard: NavigationGuard,
}

impl SettingsState {
    fn group(&self, group: PropertyGroup) -> &TrackedProperties {
        match group {
            PropertyGroup::Mutable => &self.mutable,
            PropertyGroup::Immutable => &self.immutable,
        }
    }

    fn group_mut(&mut self, group: PropertyGroup) -> &mut TrackedProperties {
        match group {
            PropertyGroup::Mutable => &mut self.mutable,
            PropertyGroup::Immutable => &mut self.immutable,
        }
    }

    fn has_unsaved(&self) -> bool {
        self.mutable.has_unsaved() || self.immutable.has_unsaved()
    }
}

/// Controller for the properties settings page
pub struct SettingsController<R> {
    store: Rc<PropertyStore<R>>,
    state: Rc<RefCell<SettingsState>>,
    collaborators: Collaborators,
    is_admin: bool,
}

impl<R> Clone for SettingsController<R> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
            state: Rc::clone(&self.state),
            collaborators: self.collaborators.clone(),
            is_admin: self.is_admin,
        }
    }
}

impl<R: PropertiesResource> SettingsController<R> {
    /// Create a controller with empty collections; call `refresh` to load them
    pub fn new(
        store: PropertyStore<R>,
        collaborators: Collaborators,
        role: RoleInfo,
        policy: ConfirmPolicy,
    ) -> Self {
        Self {
            store: Rc::new(store),
            state: Rc::new(RefCell::new(SettingsState {
                mutable: TrackedProperties::default(),
                immutable: TrackedProperties::default(),
                guard: NavigationGuard::new(policy),
            })),
            collaborators,
            is_admin: role.admin,
        }
    }

    /// Create a controller and fetch both collections
    pub async fn load(
        store: PropertyStore<R>,
        collaborators: Collaborators,
        role: RoleInfo,
        policy: ConfirmPolicy,
    ) -> Result<Self, PropertiesError> {
        let controller = Self::new(store, collaborators, role, policy);
        controller.refresh().await?;
        Ok(controller)
    }

    /// Re-query both collections, discarding local edits
    pub async fn refresh(&self) -> Result<(), PropertiesError> {
        let (mutable, immutable) =
            future::try_join(self.store.query_mutable(), self.store.query_immutable()).await?;

        info!(
            "Loaded {} mutable and {} immutable properties",
            mutable.len(),
            immutable.len()
        );

        let mut state = self.state.borrow_mut();
        state.mutable = mutable;
        state.immutable = immutable;
        Ok(())
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn mutable_properties(&self) -> Vec<PropertyModel> {
        self.properties(PropertyGroup::Mutable)
    }

    pub fn immutable_properties(&self) -> Vec<PropertyModel> {
        self.properties(PropertyGroup::Immutable)
    }

    pub fn properties(&self, group: PropertyGroup) -> Vec<PropertyModel> {
        self.state.borrow().group(group).properties().to_vec()
    }

    /// Edit one record (form binding). Returns `false` for unknown keys.
    pub fn set_value(&self, group: PropertyGroup, key: &str, value: impl Into<String>) -> bool {
        self.state.borrow_mut().group_mut(group).set_value(key, value)
    }

    pub fn value_changed(&self, group: PropertyGroup, key: &str) -> bool {
        self.state.borrow().group(group).value_changed(key)
    }

    pub fn reset_property(&self, group: PropertyGroup, key: &str) {
        self.state.borrow_mut().group_mut(group).reset_property(key);
    }

    pub fn reset_all_properties(&self) {
        let mut state = self.state.borrow_mut();
        self.store.reset_all(&mut state.mutable);
        self.store.reset_all(&mut state.immutable);
    }

    pub fn unsaved_properties_count(&self) -> usize {
        let state = self.state.borrow();
        self.store.unsaved_properties_count(&state.mutable)
            + self.store.unsaved_properties_count(&state.immutable)
    }

    pub fn has_unsaved_properties(&self) -> bool {
        let state = self.state.borrow();
        self.store.has_unsaved_properties(&state.mutable)
            || self.store.has_unsaved_properties(&state.immutable)
    }

    /// Save both collections concurrently.
    ///
    /// Each collection reconciles its own response as soon as it is known.
    /// The success notification is emitted once, after both saves succeed;
    /// any failure is returned and nothing is notified.
    pub async fn save_properties(&self) -> Result<(), PropertiesError> {
        let (mutable_changed, immutable_changed) = {
            let state = self.state.borrow();
            (state.mutable.changed(), state.immutable.changed())
        };

        let (mutable_result, immutable_result) = future::join(
            self.save_group(PropertyGroup::Mutable, mutable_changed),
            self.save_group(PropertyGroup::Immutable, immutable_changed),
        )
        .await;

        let saved = mutable_result? + immutable_result?;
        info!("Saved {} properties", saved);

        self.collaborators.notifier.success(SAVE_SUCCESS_MESSAGE);
        Ok(())
    }

    async fn save_group(
        &self,
        group: PropertyGroup,
        changed: Vec<PropertyModel>,
    ) -> Result<usize, PropertiesError> {
        match self.store.save_changed(changed.clone()).await {
            Ok(saved) => {
                self.state.borrow_mut().group_mut(group).reconcile(&changed, &saved);
                Ok(saved.len())
            }
            Err(e) => {
                warn!("Failed to save {:?} properties: {}", group, e);
                Err(e)
            }
        }
    }

    pub fn guard_state(&self) -> GuardState {
        let state = self.state.borrow();
        state.guard.state(state.has_unsaved())
    }

    /// Router hook, raised before every transition.
    ///
    /// On `Cancel` the router must stop the transition and hand `target` to
    /// `confirm_navigation`.
    pub fn on_navigation_start(&self, target: &str) -> NavigationDecision {
        let mut state = self.state.borrow_mut();
        let dirty = state.has_unsaved();
        let decision = state.guard.check(target, dirty);
        if decision == NavigationDecision::Cancel {
            debug!("Navigation to {} held back by unsaved properties", target);
        }
        decision
    }

    /// Ask the operator whether to leave; on "yes" resume the transition.
    ///
    /// Returns whether the transition was resumed.
    pub async fn confirm_navigation(&self, target: &str) -> bool {
        let options = ConfirmOptions::unsaved_changes();
        if !self.collaborators.dialog.confirm(&options).await {
            debug!("Navigation to {} cancelled by operator", target);
            return false;
        }

        self.state.borrow_mut().guard.accept(target);
        self.collaborators.navigator.go(target);
        true
    }
}
