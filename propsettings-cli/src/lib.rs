//! PropSettings Library
//!
//! Server and CLI modules for system property administration.

pub mod api;
pub mod cli;
pub mod registry;
pub mod server;

// Re-export AppState for convenience
pub use server::AppState;
