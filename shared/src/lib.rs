//! Shared types and logic for the PropSettings UI and server
//!
//! This crate contains everything that does not depend on a UI framework or
//! an HTTP stack:
//! - Property wire types (`PropertyModel`, `PropertySet`, `RoleInfo`)
//! - Change tracking against server snapshots
//! - `PropertyStore`, generic over the properties REST transport
//! - `SettingsController` and its navigation guard

pub mod controller;
pub mod guard;
pub mod property;
pub mod store;
pub mod tracking;

pub use controller::*;
pub use guard::*;
pub use property::*;
pub use store::*;
pub use tracking::*;
