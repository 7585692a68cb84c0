//! Confirmation Modal
//!
//! `ModalConfirm` implements the controller's `ConfirmDialog`: `confirm` opens
//! the modal and resolves once the user picks a button. `ConfirmModal` is the
//! view, mounted once near the root.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use leptos::*;
use propsettings_shared::{ConfirmDialog, ConfirmOptions};

#[derive(Clone)]
struct PendingConfirm {
    options: ConfirmOptions,
    responder: Rc<RefCell<Option<oneshot::Sender<bool>>>>,
}

/// Handle to the single application modal
#[derive(Clone, Copy)]
pub struct ModalConfirm {
    pending: RwSignal<Option<PendingConfirm>>,
}

impl ModalConfirm {
    pub fn new() -> Self {
        Self {
            pending: create_rw_signal(None),
        }
    }

    /// Options of the open prompt, if any
    pub fn current(&self) -> Option<ConfirmOptions> {
        self.pending
            .with(|pending| pending.as_ref().map(|p| p.options.clone()))
    }

    pub fn is_open(&self) -> bool {
        self.pending.with_untracked(|pending| pending.is_some())
    }

    /// Resolve the open prompt and close the modal
    pub fn answer(&self, accepted: bool) {
        if let Some(pending) = self.pending.get_untracked() {
            if let Some(responder) = pending.responder.borrow_mut().take() {
                let _ = responder.send(accepted);
            }
        }
        self.pending.set(None);
    }
}

impl Default for ModalConfirm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl ConfirmDialog for ModalConfirm {
    async fn confirm(&self, options: &ConfirmOptions) -> bool {
        // A newer prompt replaces an unanswered one, which counts as declined
        if self.is_open() {
            self.answer(false);
        }

        let (tx, rx) = oneshot::channel();
        self.pending.set(Some(PendingConfirm {
            options: options.clone(),
            responder: Rc::new(RefCell::new(Some(tx))),
        }));
        rx.await.unwrap_or(false)
    }
}

#[component]
pub fn ConfirmModal() -> impl IntoView {
    let modal = expect_context::<ModalConfirm>();

    move || {
        modal.current().map(|options| {
            view! {
                <div class="fixed inset-0 z-40 flex items-center justify-center bg-black/60">
                    <div
                        class="w-full max-w-md rounded-xl border border-slate-700 bg-slate-800 p-6 shadow-xl"
                        role="dialog"
                        aria-modal="true"
                    >
                        <h2 class="text-lg font-semibold text-white mb-2">{options.title}</h2>
                        <p class="text-sm text-slate-300 mb-6">{options.text}</p>
                        <div class="flex justify-end gap-3">
                            <button
                                class="px-4 py-2 bg-slate-700 hover:bg-slate-600 text-white rounded-lg transition-colors"
                                on:click=move |_| modal.answer(false)
                            >
                                {options.cancel}
                            </button>
                            <button
                                class="px-4 py-2 bg-blue-500 hover:bg-blue-600 text-white font-medium rounded-lg transition-colors"
                                on:click=move |_| modal.answer(true)
                            >
                                {options.ok}
                            </button>
                        </div>
                    </div>
                </div>
            }
        })
    }
}
