//! UI Components
//!
//! - `common`: Icons, toasts and the confirmation modal
//! - `dashboard`: Landing page
//! - `layout`: Application shell and sidebar
//! - `settings`: System properties page

pub mod common;
pub mod dashboard;
pub mod layout;
pub mod settings;
