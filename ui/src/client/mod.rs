//! Properties API Client
//!
//! gloo-net implementation of the shared `PropertiesResource`, plus the small
//! read-only endpoints the shell needs (role info, restart status).

mod http;

pub use http::{fetch_restart_status, fetch_role_info, HttpPropertiesResource};

/// Origin of the server that served the UI
pub fn api_base_url() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:8080".to_string())
}
