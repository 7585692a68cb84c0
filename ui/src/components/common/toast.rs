//! Toast Notifications
//!
//! Short-lived messages stacked in the corner of the screen. `ToastNotifier`
//! is the browser implementation of the settings controller's `Notifier`.

use gloo_timers::callback::Timeout;
use leptos::*;
use propsettings_shared::Notifier;

use super::{CheckIcon, ErrorIcon};

const TOAST_LIFETIME_MS: u32 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Queue of visible toasts
#[derive(Clone, Copy)]
pub struct ToastNotifier {
    toasts: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl ToastNotifier {
    pub fn new() -> Self {
        Self {
            toasts: create_rw_signal(Vec::new()),
            next_id: store_value(0),
        }
    }

    /// Show a message. Returns the toast id.
    pub fn push(&self, kind: ToastKind, message: impl Into<String>) -> u64 {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.toasts.update(|toasts| {
            toasts.push(Toast {
                id,
                kind,
                message: message.into(),
            })
        });
        id
    }

    /// Show a message and remove it after a few seconds
    fn push_expiring(&self, kind: ToastKind, message: &str) {
        let id = self.push(kind, message);
        let notifier = *self;
        Timeout::new(TOAST_LIFETIME_MS, move || notifier.dismiss(id)).forget();
    }

    pub fn error(&self, message: &str) {
        self.push_expiring(ToastKind::Error, message);
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|toasts| toasts.retain(|t| t.id != id));
    }

    pub fn visible(&self) -> Vec<Toast> {
        self.toasts.get()
    }
}

impl Default for ToastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ToastNotifier {
    fn success(&self, message: &str) {
        self.push_expiring(ToastKind::Success, message);
    }
}

/// Renders the toast stack; mount once near the root
#[component]
pub fn ToastHost() -> impl IntoView {
    let notifier = expect_context::<ToastNotifier>();

    view! {
        <div class="fixed bottom-4 right-4 z-50 flex flex-col gap-2 w-80">
            <For
                each=move || notifier.visible()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    let (container, icon) = match toast.kind {
                        ToastKind::Success => (
                            "bg-green-500/10 border-green-500/30 text-green-400",
                            view! { <CheckIcon class="w-5 h-5 shrink-0" /> }.into_view(),
                        ),
                        ToastKind::Error => (
                            "bg-red-500/10 border-red-500/30 text-red-400",
                            view! { <ErrorIcon class="w-5 h-5 shrink-0" /> }.into_view(),
                        ),
                    };
                    view! {
                        <div
                            class=format!("flex items-start gap-3 rounded-lg border p-4 shadow-lg bg-slate-800 {}", container)
                            on:click=move |_| notifier.dismiss(id)
                        >
                            {icon}
                            <p class="text-sm">{toast.message}</p>
                        </div>
                    }
                }
            />
        </div>
    }
}
