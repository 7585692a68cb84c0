//! Dashboard
//!
//! Landing page with the current role and the server's restart status.

use leptos::*;
use leptos_meta::Title;

use crate::components::common::{LockIcon, RefreshIcon, SettingsIcon};
use crate::components::layout::GuardedLink;
use crate::state::AppState;

/// Main dashboard view
#[component]
pub fn Dashboard() -> impl IntoView {
    let app_state = expect_context::<AppState>();

    // Restart status may have changed since the last visit
    spawn_local(async move { app_state.refresh_restart_status().await });

    let is_admin = move || app_state.role.get().map(|role| role.admin).unwrap_or(false);

    view! {
        <Title text="Overview" />
        <div class="flex-1 overflow-auto p-6 bg-slate-900">
            <div class="max-w-4xl mx-auto">
                <div class="mb-6">
                    <h1 class="text-2xl font-bold text-white">"Overview"</h1>
                    <p class="text-slate-400 mt-1">"System property administration"</p>
                </div>

                <div class="grid grid-cols-1 md:grid-cols-2 gap-6">
                    <div class="bg-slate-800 rounded-xl border border-slate-700 p-6">
                        <div class="flex items-center gap-3 mb-3">
                            <div class="w-10 h-10 rounded-lg bg-slate-700 flex items-center justify-center">
                                <LockIcon class="w-5 h-5 text-slate-400" />
                            </div>
                            <h2 class="text-lg font-semibold text-white">"Access"</h2>
                        </div>
                        <p class="text-sm text-slate-400">
                            {move || if is_admin() {
                                "You can change and save system properties."
                            } else {
                                "You can view system properties but not change them."
                            }}
                        </p>
                    </div>

                    <div class="bg-slate-800 rounded-xl border border-slate-700 p-6">
                        <div class="flex items-center gap-3 mb-3">
                            <div class="w-10 h-10 rounded-lg bg-slate-700 flex items-center justify-center">
                                <RefreshIcon class="w-5 h-5 text-slate-400" />
                            </div>
                            <h2 class="text-lg font-semibold text-white">"Restart status"</h2>
                        </div>
                        <p class="text-sm text-slate-400">
                            {move || if app_state.restart_required.get() {
                                "Saved changes are waiting for a server restart."
                            } else {
                                "All saved changes are in effect."
                            }}
                        </p>
                    </div>
                </div>

                <GuardedLink
                    href="/settings/properties"
                    class="mt-6 inline-flex items-center gap-2 px-4 py-2 bg-blue-500 hover:bg-blue-600 text-white font-medium rounded-lg transition-colors"
                >
                    <SettingsIcon class="w-4 h-4" />
                    "Open System Properties"
                </GuardedLink>
            </div>
        </div>
    }
}
