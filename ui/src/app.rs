//! Root Application Component
//!
//! This module contains the main App component that sets up:
//! - Global state, toast and modal providers
//! - Routing, with in-app links going through `GuardedRouter` and
//!   back/forward through `GuardedHistory`
//! - Layout structure with AppShell

use leptos::*;
use leptos_meta::*;
use leptos_router::*;

use crate::components::common::{ModalConfirm, ToastNotifier};
use crate::components::dashboard::Dashboard;
use crate::components::layout::{AppShell, GuardedLink};
use crate::components::settings::PropertySettingsPage;
use crate::navigation::{GuardSlot, GuardedHistory, GuardedRouter};
use crate::state::AppState;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    // Initialize global state
    let app_state = AppState::new();
    provide_context(app_state);
    provide_context(ToastNotifier::new());
    provide_context(ModalConfirm::new());

    // Back/forward consults the same guard as in-app links
    let guard = GuardSlot::default();
    provide_context(RouterIntegrationContext::new(GuardedHistory::new(guard.clone())));
    provide_context(guard);

    // Pages read the role once when they are created, so load it before routing
    spawn_local(async move {
        app_state.load_role().await;
        app_state.refresh_restart_status().await;
    });

    view! {
        <Title formatter=|text| format!("{} - PropSettings", text) />
        <Router>
            <NavigationProvider>
                <Show
                    when=move || app_state.role.get().is_some()
                    fallback=|| view! {
                        <div class="h-screen flex items-center justify-center bg-slate-900">
                            <div class="animate-spin w-8 h-8 border-4 border-blue-500 border-t-transparent rounded-full" />
                        </div>
                    }
                >
                    <AppShell>
                        <Routes>
                            <Route path="/" view=Dashboard />
                            <Route path="/settings/properties" view=PropertySettingsPage />
                            <Route path="/*any" view=NotFound />
                        </Routes>
                    </AppShell>
                </Show>
            </NavigationProvider>
        </Router>
    }
}

/// Makes `GuardedRouter` available below the router
#[component]
fn NavigationProvider(children: Children) -> impl IntoView {
    let navigate = use_navigate();
    let guard = expect_context::<GuardSlot>();
    provide_context(GuardedRouter::new(guard, move |target| {
        navigate(target, NavigateOptions::default())
    }));
    children()
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="flex-1 flex flex-col items-center justify-center gap-4 text-slate-400">
            <p class="text-lg">"Page not found"</p>
            <GuardedLink href="/" class="text-blue-400 hover:text-blue-300">
                "Back to overview"
            </GuardedLink>
        </div>
    }
}
