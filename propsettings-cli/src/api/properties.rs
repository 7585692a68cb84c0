//! System property API endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use propsettings_shared::{PropertyModel, PropertySet, RestartStatus};

use crate::AppState;

/// Query parameters for `GET /properties`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertiesQuery {
    /// `all`, `mutable` or `immutable`; anything else means `all`
    pub which_property_set: Option<String>,
}

/// List system properties
pub async fn get_properties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PropertiesQuery>,
) -> impl IntoResponse {
    let set = query
        .which_property_set
        .as_deref()
        .map(PropertySet::parse_lenient)
        .unwrap_or_default();

    let properties = state.registry.read().await.list(set);
    (StatusCode::OK, Json(properties))
}

/// Save changed system properties and return them as saved
pub async fn save_properties(
    State(state): State<Arc<AppState>>,
    Json(properties): Json<Vec<PropertyModel>>,
) -> impl IntoResponse {
    if !state.role.admin {
        warn!("A non-admin tried to modify properties");
        return (StatusCode::FORBIDDEN, Json(serde_json::json!({
            "error": "Only administrators may modify properties"
        }))).into_response();
    }

    let mut registry = state.registry.write().await;
    match registry.save(&properties) {
        Ok(saved) => {
            info!("Saved {} properties", saved.len());
            (StatusCode::OK, Json(saved)).into_response()
        }
        Err(e) => {
            error!("Failed to save properties: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({
                "error": format!("Failed to save properties: {}", e)
            }))).into_response()
        }
    }
}

/// Whether saved properties are waiting for a restart
pub async fn restart_required(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let restart_required = state.registry.read().await.restart_required();
    (StatusCode::OK, Json(RestartStatus { restart_required }))
}

/// Role of the current session
pub async fn role_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.role))
}
