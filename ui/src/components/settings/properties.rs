//! System Properties Page
//!
//! Lists mutable and immutable properties side by side and lets an admin
//! edit, reset and save them. The page owns a `SettingsController`; leaving
//! with unsaved edits goes through the controller's navigation guard.
//!
//! The controller is not reactive. Every mutation is followed by
//! `revision.notify()`, and views that read the controller track `revision`.

use std::rc::Rc;

use leptos::*;
use leptos_meta::Title;
use propsettings_shared::{
    Collaborators, ConfirmPolicy, PropertyGroup, PropertyModel, PropertyStore, SettingsController,
};

use crate::client::{api_base_url, HttpPropertiesResource};
use crate::components::common::{
    ErrorIcon, LockIcon, ModalConfirm, RefreshIcon, ToastNotifier, UndoIcon,
};
use crate::navigation::{guard_unsaved_changes, GuardedRouter};
use crate::state::AppState;

type PageController = SettingsController<HttpPropertiesResource>;

// ============================================================================
// Main Component
// ============================================================================

/// System properties page component
#[component]
pub fn PropertySettingsPage() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let router = expect_context::<GuardedRouter>();
    let toasts = expect_context::<ToastNotifier>();
    let modal = expect_context::<ModalConfirm>();

    let collaborators = Collaborators {
        notifier: Rc::new(toasts),
        dialog: Rc::new(modal),
        navigator: Rc::new(router.clone()),
    };
    let controller = store_value(SettingsController::new(
        PropertyStore::new(HttpPropertiesResource::new(&api_base_url())),
        collaborators,
        app_state.role_or_default(),
        ConfirmPolicy::OncePerPage,
    ));

    let revision = create_trigger();
    let (loading, set_loading) = create_signal(true);
    let (saving, set_saving) = create_signal(false);
    let (error, set_error) = create_signal(Option::<String>::None);

    let is_admin = controller.with_value(|c| c.is_admin());

    let load = move || {
        let controller = controller.get_value();
        set_loading.set(true);
        set_error.set(None);
        spawn_local(async move {
            if let Err(e) = controller.refresh().await {
                set_error.set(Some(format!("Failed to load properties: {}", e)));
            }
            revision.notify();
            set_loading.set(false);
        });
    };
    load();

    // Hold in-app navigation while there are unsaved edits
    guard_unsaved_changes(&router, move || controller.get_value(), |task| spawn_local(task));
    on_cleanup({
        let router = router.clone();
        move || router.clear_guard()
    });

    let unsaved = move || {
        revision.track();
        controller.with_value(|c| c.unsaved_properties_count())
    };

    let on_save = move |_| {
        let controller = controller.get_value();
        set_saving.set(true);
        set_error.set(None);
        spawn_local(async move {
            if let Err(e) = controller.save_properties().await {
                tracing::error!("Saving properties failed: {}", e);
                set_error.set(Some(format!("Failed to save properties: {}", e)));
                toasts.error("System properties could not be saved");
            }
            app_state.refresh_restart_status().await;
            revision.notify();
            set_saving.set(false);
        });
    };

    let on_reset_all = move |_| {
        controller.with_value(|c| c.reset_all_properties());
        revision.notify();
    };

    view! {
        <Title text="System Properties" />
        <div class="flex-1 overflow-auto p-6 bg-slate-900">
            <div class="max-w-5xl mx-auto">
                // Header
                <div class="flex items-center justify-between mb-6">
                    <div>
                        <h1 class="text-2xl font-bold text-white">"System Properties"</h1>
                        <p class="text-slate-400 mt-1">
                            {move || match unsaved() {
                                0 => "No unsaved changes".to_string(),
                                1 => "1 unsaved change".to_string(),
                                n => format!("{} unsaved changes", n),
                            }}
                        </p>
                    </div>

                    <div class="flex items-center gap-3">
                        <button
                            class="flex items-center gap-2 px-4 py-2 bg-slate-700 hover:bg-slate-600 \
                                   text-white rounded-lg transition-colors disabled:opacity-50"
                            disabled=move || loading.get() || saving.get()
                            on:click=move |_| load()
                        >
                            <RefreshIcon class="w-4 h-4" />
                            "Refresh"
                        </button>
                        <Show when=move || is_admin>
                            <button
                                class="flex items-center gap-2 px-4 py-2 bg-slate-700 hover:bg-slate-600 \
                                       text-white rounded-lg transition-colors disabled:opacity-50"
                                disabled=move || saving.get() || unsaved() == 0
                                on:click=on_reset_all
                            >
                                <UndoIcon class="w-4 h-4" />
                                "Reset All"
                            </button>
                            <button
                                class="px-6 py-2 bg-blue-500 hover:bg-blue-600 text-white font-medium \
                                       rounded-lg transition-colors disabled:opacity-50"
                                disabled=move || saving.get() || unsaved() == 0
                                on:click=on_save
                            >
                                {move || if saving.get() { "Saving..." } else { "Save" }}
                            </button>
                        </Show>
                    </div>
                </div>

                // Error display
                {move || error.get().map(|err| view! {
                    <div class="bg-red-500/10 border border-red-500/30 rounded-lg p-4 mb-6 flex items-start gap-3">
                        <ErrorIcon class="w-5 h-5 text-red-400 shrink-0 mt-0.5" />
                        <div>
                            <p class="text-red-400 font-medium">"Error"</p>
                            <p class="text-red-400/80 text-sm">{err}</p>
                        </div>
                    </div>
                })}

                <Show when=move || !is_admin>
                    <div class="bg-slate-800 border border-slate-700 rounded-lg p-4 mb-6 flex items-center gap-3 text-slate-400 text-sm">
                        <LockIcon class="w-4 h-4 shrink-0" />
                        "You have read-only access. Only administrators can change system properties."
                    </div>
                </Show>

                // Loading state
                <Show
                    when=move || !loading.get()
                    fallback=move || view! {
                        <div class="flex items-center justify-center py-16">
                            <div class="animate-spin w-8 h-8 border-4 border-blue-500 border-t-transparent rounded-full" />
                        </div>
                    }
                >
                    <div class="space-y-6">
                        <PropertyTable
                            title="Mutable Properties"
                            description="Changes take effect as soon as they are saved"
                            group=PropertyGroup::Mutable
                            controller=controller
                            revision=revision
                            editable=is_admin
                        />
                        <PropertyTable
                            title="Immutable Properties"
                            description="Changes take effect after the server is restarted"
                            group=PropertyGroup::Immutable
                            controller=controller
                            revision=revision
                            editable=is_admin
                        />
                    </div>
                </Show>
            </div>
        </div>
    }
}

// ============================================================================
// Property Table
// ============================================================================

#[component]
fn PropertyTable(
    title: &'static str,
    description: &'static str,
    group: PropertyGroup,
    controller: StoredValue<PageController>,
    revision: Trigger,
    editable: bool,
) -> impl IntoView {
    let keys = move || {
        revision.track();
        controller.with_value(|c| {
            c.properties(group)
                .into_iter()
                .map(|p| p.key)
                .collect::<Vec<_>>()
        })
    };

    view! {
        <div class="bg-slate-800 rounded-xl border border-slate-700 overflow-hidden">
            <div class="px-6 py-4 border-b border-slate-700">
                <h2 class="text-lg font-semibold text-white">{title}</h2>
                <p class="text-sm text-slate-400">{description}</p>
            </div>

            <Show
                when=move || !keys().is_empty()
                fallback=|| view! {
                    <p class="px-6 py-8 text-center text-sm text-slate-500">"No properties"</p>
                }
            >
                <table class="w-full">
                    <thead class="text-xs uppercase tracking-wider text-slate-500 text-left">
                        <tr>
                            <th class="px-6 py-2 font-medium">"Property"</th>
                            <th class="px-6 py-2 font-medium">"Value"</th>
                            <th class="px-6 py-2"></th>
                        </tr>
                    </thead>
                    <tbody class="divide-y divide-slate-700">
                        <For
                            each=keys
                            key=|key| key.clone()
                            children=move |property_key| view! {
                                <PropertyRow
                                    property_key=property_key
                                    group=group
                                    controller=controller
                                    revision=revision
                                    editable=editable
                                />
                            }
                        />
                    </tbody>
                </table>
            </Show>
        </div>
    }
}

// ============================================================================
// Property Row
// ============================================================================

#[component]
fn PropertyRow(
    property_key: String,
    group: PropertyGroup,
    controller: StoredValue<PageController>,
    revision: Trigger,
    editable: bool,
) -> impl IntoView {
    let label = property_key.clone();
    let property_key = store_value(property_key);

    let current = move || -> Option<PropertyModel> {
        revision.track();
        property_key.with_value(|key| {
            controller.with_value(|c| c.properties(group).into_iter().find(|p| &p.key == key))
        })
    };
    let changed = move || {
        revision.track();
        property_key.with_value(|key| controller.with_value(|c| c.value_changed(group, key)))
    };
    let needs_restart_if_changed = current()
        .map(|p| p.needs_restart_if_changed)
        .unwrap_or(false);

    let on_input = move |ev: ev::Event| {
        let value = event_target_value(&ev);
        property_key.with_value(|key| {
            controller.with_value(|c| c.set_value(group, key, value));
        });
        revision.notify();
    };
    let on_reset = move |_| {
        property_key.with_value(|key| controller.with_value(|c| c.reset_property(group, key)));
        revision.notify();
    };

    view! {
        <tr class=move || if changed() { "bg-blue-500/5" } else { "" }>
            <td class="px-6 py-3 align-middle">
                <span class="font-mono text-sm text-slate-200">{label}</span>
                {needs_restart_if_changed.then(|| view! {
                    <span class="ml-2 text-xs text-slate-500">"(restart to apply)"</span>
                })}
            </td>
            <td class="px-6 py-3 align-middle">
                <input
                    type="text"
                    class="w-full px-3 py-2 rounded-lg bg-slate-900 border border-slate-700 text-white text-sm \
                           focus:outline-none focus:ring-2 focus:ring-blue-500 focus:border-transparent \
                           disabled:opacity-60"
                    prop:value=move || current().map(|p| p.value).unwrap_or_default()
                    disabled=!editable
                    on:input=on_input
                />
            </td>
            <td class="px-6 py-3 align-middle text-right whitespace-nowrap">
                <Show when=move || current().map(|p| p.needs_restart).unwrap_or(false)>
                    <span class="text-xs text-amber-400 mr-2">"Restart pending"</span>
                </Show>
                <Show when=move || editable && changed()>
                    <button
                        class="p-1.5 text-slate-400 hover:text-white hover:bg-slate-700 rounded transition-colors"
                        title="Reset to saved value"
                        on:click=on_reset
                    >
                        <UndoIcon class="w-4 h-4" />
                    </button>
                </Show>
            </td>
        </tr>
    }
}
