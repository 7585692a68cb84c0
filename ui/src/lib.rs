//! PropSettings UI Library
//!
//! Browser front end for system property administration. The settings page
//! drives the shared `SettingsController` with browser implementations of its
//! collaborators: a gloo-net properties resource, toast notifications, a modal
//! confirmation dialog, and a router that consults the page's navigation guard.
//!
//! # Modules
//!
//! - [`app`]: Root application component and routing
//! - [`client`]: REST client for the properties API
//! - [`components`]: UI components (layout, dialogs, settings pages)
//! - [`navigation`]: Guarded in-app navigation
//! - [`state`]: Global state management

pub mod app;
pub mod client;
pub mod components;
pub mod navigation;
pub mod state;

pub use app::App;
