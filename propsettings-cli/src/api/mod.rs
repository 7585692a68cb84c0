//! API endpoints for PropSettings
//!
//! Provides the REST resource behind the settings page:
//! - System properties (query by set, save changes)
//! - Restart status after saving restart-requiring properties
//! - Role information for the current session

pub mod properties;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::AppState;

/// Create the API router
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/properties",
            get(properties::get_properties).put(properties::save_properties),
        )
        .route("/properties/restart-required", get(properties::restart_required))
        .route("/role-info", get(properties::role_info))
}
