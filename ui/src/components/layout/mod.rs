//! Layout Components
//!
//! - `AppShell`: sidebar, restart banner and page content
//! - `Sidebar`: navigation links that go through the guarded router

mod app_shell;
mod sidebar;

pub use app_shell::AppShell;
pub use sidebar::{GuardedLink, Sidebar};
