//! Settings Components
//!
//! - `properties`: System properties page (edit, save, reset, leave guard)

mod properties;

pub use properties::PropertySettingsPage;
