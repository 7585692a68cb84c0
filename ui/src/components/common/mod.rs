//! Common UI Components
//!
//! Shared components used across pages: icons, toast notifications and the
//! confirmation modal.

mod confirm_dialog;
mod icons;
mod toast;

pub use confirm_dialog::{ConfirmModal, ModalConfirm};
pub use icons::*;
pub use toast::{Toast, ToastHost, ToastKind, ToastNotifier};
