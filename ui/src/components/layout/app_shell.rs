//! Application Shell
//!
//! Frames every page with the sidebar, and shows a banner while saved
//! properties are waiting for a server restart.

use leptos::*;

use super::Sidebar;
use crate::components::common::{ConfirmModal, ToastHost};
use crate::state::AppState;

#[component]
pub fn AppShell(children: Children) -> impl IntoView {
    let app_state = expect_context::<AppState>();

    view! {
        <div class="h-screen flex bg-slate-900 text-slate-100">
            <Sidebar />

            <main class="flex-1 flex flex-col overflow-hidden">
                <Show when=move || app_state.restart_required.get()>
                    <div class="px-6 py-2 bg-amber-500/10 border-b border-amber-500/30 text-amber-400 text-sm">
                        "Some saved properties take effect only after the server is restarted."
                    </div>
                </Show>
                {children()}
            </main>

            <ConfirmModal />
            <ToastHost />
        </div>
    }
}
