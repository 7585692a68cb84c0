//! Global State Management
//!
//! This module manages the global application state including:
//! - The current user's role (loaded once on startup)
//! - Whether saved properties are waiting for a server restart

use leptos::*;
use propsettings_shared::RoleInfo;

use crate::client::{api_base_url, fetch_restart_status, fetch_role_info};

/// Global application state
#[derive(Clone, Copy)]
pub struct AppState {
    /// Role of the current user; `None` until the server has answered
    pub role: RwSignal<Option<RoleInfo>>,

    /// Saved changes that only apply after a restart
    pub restart_required: RwSignal<bool>,
}

impl AppState {
    /// Create a new app state with default values
    pub fn new() -> Self {
        Self {
            role: create_rw_signal(None),
            restart_required: create_rw_signal(false),
        }
    }

    /// Role once loaded, otherwise a non-admin role
    pub fn role_or_default(&self) -> RoleInfo {
        self.role.get_untracked().unwrap_or_default()
    }

    /// Fetch the role from the server. Failures fall back to a read-only role.
    pub async fn load_role(&self) {
        match fetch_role_info(&api_base_url()).await {
            Ok(role) => self.role.set(Some(role)),
            Err(e) => {
                tracing::warn!("Failed to load role info, assuming read-only: {}", e);
                self.role.set(Some(RoleInfo::default()));
            }
        }
    }

    /// Re-read the server's restart flag
    pub async fn refresh_restart_status(&self) {
        match fetch_restart_status(&api_base_url()).await {
            Ok(status) => self.restart_required.set(status.restart_required),
            Err(e) => tracing::debug!("Restart status unavailable: {}", e),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
