//! Sidebar Navigation
//!
//! Links here never change the route directly. They call
//! `GuardedRouter::go`, so a page with unsaved changes can hold the
//! transition until the user confirms. `rel="external"` keeps the
//! router's own anchor-click handler away from them.

use leptos::*;
use leptos_router::*;
use propsettings_shared::Navigator;

use crate::components::common::{HomeIcon, SettingsIcon};
use crate::navigation::GuardedRouter;

#[derive(Clone, Copy, PartialEq)]
enum NavIcon {
    Overview,
    Properties,
}

impl NavIcon {
    fn render(self) -> View {
        match self {
            NavIcon::Overview => view! { <HomeIcon class="w-5 h-5" /> }.into_view(),
            NavIcon::Properties => view! { <SettingsIcon class="w-5 h-5" /> }.into_view(),
        }
    }
}

/// Main sidebar navigation component
#[component]
pub fn Sidebar() -> impl IntoView {
    view! {
        <aside class="w-60 h-full bg-slate-800 border-r border-slate-700 flex flex-col flex-shrink-0">
            // Logo header
            <div class="h-14 flex items-center px-3 border-b border-slate-700">
                <GuardedLink href="/" class="flex items-center gap-3 text-white">
                    <div class="w-8 h-8 bg-gradient-to-br from-blue-500 to-purple-600 rounded-lg flex items-center justify-center">
                        <span class="text-white text-sm font-bold">"P"</span>
                    </div>
                    <span class="text-lg font-bold whitespace-nowrap">"PropSettings"</span>
                </GuardedLink>
            </div>

            <nav class="flex-1 py-2 px-2 space-y-0.5">
                <NavItem href="/" icon=NavIcon::Overview label="Overview" exact=true />
                <NavItem
                    href="/settings/properties"
                    icon=NavIcon::Properties
                    label="System Properties"
                />
            </nav>
        </aside>
    }
}

/// Navigation item with icon and label
#[component]
fn NavItem(
    href: &'static str,
    icon: NavIcon,
    label: &'static str,
    #[prop(default = false)] exact: bool,
) -> impl IntoView {
    let location = use_location();
    let router = expect_context::<GuardedRouter>();

    view! {
        <a
            href=href
            rel="external"
            class=move || {
                let pathname = location.pathname.get();
                let is_active = if exact {
                    pathname == href
                } else {
                    pathname == href || pathname.starts_with(&format!("{}/", href))
                };

                let base = "flex items-center gap-3 px-2 py-2 rounded-lg transition-colors";
                if is_active {
                    format!("{} bg-blue-500 text-white", base)
                } else {
                    format!("{} text-slate-400 hover:text-white hover:bg-slate-700", base)
                }
            }
            on:click=move |ev: ev::MouseEvent| {
                ev.prevent_default();
                router.go(href);
            }
        >
            <div class="w-5 h-5 flex items-center justify-center flex-shrink-0">
                {icon.render()}
            </div>
            <span class="text-sm font-medium whitespace-nowrap">{label}</span>
        </a>
    }
}

/// Anchor that routes through the navigation guard
#[component]
pub fn GuardedLink(
    href: &'static str,
    #[prop(default = "")] class: &'static str,
    children: Children,
) -> impl IntoView {
    let router = expect_context::<GuardedRouter>();

    view! {
        <a
            href=href
            rel="external"
            class=class
            on:click=move |ev: ev::MouseEvent| {
                ev.prevent_default();
                router.go(href);
            }
        >
            {children()}
        </a>
    }
}
