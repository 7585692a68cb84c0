//! Guarded Navigation
//!
//! In-app navigation goes through [`GuardedRouter`]. A page with unsaved work
//! registers a guard; every `go` asks the guard first and only navigates when
//! it allows the transition. A page that cancels a transition resumes it later
//! by calling `go` again, which consults the guard a second time.
//!
//! Back/forward buttons are covered by [`GuardedHistory`], the router
//! integration installed above `<Router>`. It asks the same guard before
//! leptos_router sees the `popstate`; a held transition restores the previous
//! URL and leaves the page mounted. Reloads and typed URLs leave the app and
//! are not guarded.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use leptos::*;
use leptos_router::{BrowserIntegration, History, LocationChange};
use propsettings_shared::{NavigationDecision, Navigator, PropertiesResource, SettingsController};

type Guard = Rc<dyn Fn(&str) -> bool>;

/// The guard shared by the router handle and the history integration
#[derive(Clone, Default)]
pub struct GuardSlot(Rc<RefCell<Option<Guard>>>);

impl GuardSlot {
    /// Install the guard consulted on every transition, replacing any previous one.
    /// The guard returns `true` to let the transition proceed.
    pub fn set(&self, guard: impl Fn(&str) -> bool + 'static) {
        *self.0.borrow_mut() = Some(Rc::new(guard));
    }

    pub fn clear(&self) {
        self.0.borrow_mut().take();
    }

    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }

    /// Ask the guard, if any, whether `target` may be entered
    pub fn allows(&self, target: &str) -> bool {
        // The guard may clear itself or navigate, so release the borrow first
        let guard = self.0.borrow().clone();
        guard.map_or(true, |guard| guard(target))
    }
}

/// Router handle shared through context
#[derive(Clone)]
pub struct GuardedRouter {
    navigate: Rc<dyn Fn(&str)>,
    guard: GuardSlot,
}

impl GuardedRouter {
    /// Wrap the function that performs the actual route change
    pub fn new(guard: GuardSlot, navigate: impl Fn(&str) + 'static) -> Self {
        Self {
            navigate: Rc::new(navigate),
            guard,
        }
    }

    pub fn set_guard(&self, guard: impl Fn(&str) -> bool + 'static) {
        self.guard.set(guard);
    }

    pub fn clear_guard(&self) {
        self.guard.clear();
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_set()
    }
}

impl Navigator for GuardedRouter {
    fn go(&self, target: &str) {
        if self.guard.allows(target) {
            tracing::debug!("Navigating to {}", target);
            (self.navigate)(target);
        } else {
            tracing::debug!("Navigation to {} held by guard", target);
        }
    }
}

/// Hold transitions away from a page whose controller has unsaved edits.
///
/// A held transition spawns the confirmation prompt; on "yes" the controller
/// resumes it through its navigator.
pub fn guard_unsaved_changes<R: PropertiesResource + 'static>(
    router: &GuardedRouter,
    controller: impl Fn() -> SettingsController<R> + 'static,
    spawn: impl Fn(LocalBoxFuture<'static, ()>) + 'static,
) {
    router.set_guard(move |target| {
        let controller = controller();
        match controller.on_navigation_start(target) {
            NavigationDecision::Proceed => true,
            NavigationDecision::Cancel => {
                let target = target.to_string();
                spawn(Box::pin(async move {
                    controller.confirm_navigation(&target).await;
                }));
                false
            }
        }
    });
}

/// Browser history integration that holds guarded back/forward transitions
#[derive(Clone)]
pub struct GuardedHistory {
    inner: BrowserIntegration,
    guard: GuardSlot,
    current: Rc<RefCell<String>>,
}

impl GuardedHistory {
    pub fn new(guard: GuardSlot) -> Self {
        Self {
            inner: BrowserIntegration {},
            guard,
            current: Rc::new(RefCell::new(browser_path())),
        }
    }

    fn on_popstate(&self, ev: web_sys::Event) {
        let target = browser_path();
        if self.guard.allows(&target) {
            *self.current.borrow_mut() = target;
            return;
        }

        tracing::debug!("Back/forward to {} held by guard", target);
        ev.stop_immediate_propagation();
        let previous = self.current.borrow().clone();
        if let Ok(history) = window().history() {
            let restored = history.push_state_with_url(
                &wasm_bindgen::JsValue::NULL,
                "",
                Some(previous.as_str()),
            );
            if let Err(e) = restored {
                tracing::warn!("Failed to restore {}: {:?}", previous, e);
            }
        }
    }
}

impl History for GuardedHistory {
    fn location(&self) -> ReadSignal<LocationChange> {
        // Registered before the router's own popstate listener, so it runs first
        let this = self.clone();
        window_event_listener_untyped("popstate", move |ev| this.on_popstate(ev));
        self.inner.location()
    }

    fn navigate(&self, loc: &LocationChange) {
        *self.current.borrow_mut() = loc.value.clone();
        self.inner.navigate(loc);
    }
}

/// Path, query and hash of the browser's current URL
fn browser_path() -> String {
    let location = window().location();
    format!(
        "{}{}{}",
        location.pathname().unwrap_or_default(),
        location.search().unwrap_or_default(),
        location.hash().unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use propsettings_shared::{
        Collaborators, ConfirmDialog, ConfirmOptions, ConfirmPolicy, GuardState, Notifier,
        PropertiesError, PropertyGroup, PropertyModel, PropertySet, PropertyStore, RoleInfo,
    };
    use std::cell::Cell;

    fn recording_router() -> (GuardedRouter, Rc<RefCell<Vec<String>>>) {
        let visited = Rc::new(RefCell::new(Vec::new()));
        let log = visited.clone();
        let router = GuardedRouter::new(GuardSlot::default(), move |target| {
            log.borrow_mut().push(target.to_string())
        });
        (router, visited)
    }

    #[test]
    fn test_navigates_without_guard() {
        let (router, visited) = recording_router();
        router.go("/");
        assert_eq!(*visited.borrow(), vec!["/".to_string()]);
    }

    #[test]
    fn test_guard_blocks_and_resumes() {
        let (router, visited) = recording_router();
        let allow = Rc::new(Cell::new(false));
        let flag = allow.clone();
        router.set_guard(move |_| flag.get());

        router.go("/elsewhere");
        assert!(visited.borrow().is_empty());

        allow.set(true);
        router.go("/elsewhere");
        assert_eq!(*visited.borrow(), vec!["/elsewhere".to_string()]);
    }

    #[test]
    fn test_guard_may_clear_itself() {
        let (router, visited) = recording_router();
        let handle = router.clone();
        router.set_guard(move |_| {
            handle.clear_guard();
            true
        });

        router.go("/a");
        assert!(!router.has_guard());
        router.go("/b");
        assert_eq!(visited.borrow().len(), 2);
    }

    #[test]
    fn test_clear_guard() {
        let (router, visited) = recording_router();
        router.set_guard(|_| false);
        router.clear_guard();
        router.go("/");
        assert_eq!(visited.borrow().len(), 1);
    }

    #[test]
    fn test_slot_is_shared_with_router() {
        let slot = GuardSlot::default();
        let router = GuardedRouter::new(slot.clone(), |_| {});

        router.set_guard(|target| target != "/");
        assert!(slot.is_set());
        assert!(!slot.allows("/"));
        assert!(slot.allows("/settings/properties"));

        router.clear_guard();
        assert!(slot.allows("/"));
    }

    struct FixedResource;

    #[async_trait(?Send)]
    impl PropertiesResource for FixedResource {
        async fn query(&self, set: PropertySet) -> Result<Vec<PropertyModel>, PropertiesError> {
            Ok(match set {
                PropertySet::Immutable => vec![PropertyModel::new("http.port", "8080")],
                _ => vec![PropertyModel::new("detection.frames", "10")],
            })
        }

        async fn update(
            &self,
            properties: &[PropertyModel],
        ) -> Result<Vec<PropertyModel>, PropertiesError> {
            Ok(properties.to_vec())
        }
    }

    struct SilentNotifier;

    impl Notifier for SilentNotifier {
        fn success(&self, _message: &str) {}
    }

    struct AnsweringDialog {
        answer: bool,
        shown: Cell<usize>,
    }

    #[async_trait(?Send)]
    impl ConfirmDialog for AnsweringDialog {
        async fn confirm(&self, _options: &ConfirmOptions) -> bool {
            self.shown.set(self.shown.get() + 1);
            self.answer
        }
    }

    struct GuardedPage {
        router: GuardedRouter,
        visited: Rc<RefCell<Vec<String>>>,
        controller: SettingsController<FixedResource>,
        dialog: Rc<AnsweringDialog>,
        spawned: Rc<RefCell<Vec<LocalBoxFuture<'static, ()>>>>,
    }

    impl GuardedPage {
        fn run_spawned(&self) {
            let tasks: Vec<_> = self.spawned.borrow_mut().drain(..).collect();
            for task in tasks {
                block_on(task);
            }
        }
    }

    fn guarded_page(answer: bool) -> GuardedPage {
        let (router, visited) = recording_router();
        let dialog = Rc::new(AnsweringDialog {
            answer,
            shown: Cell::new(0),
        });
        let controller = SettingsController::new(
            PropertyStore::new(FixedResource),
            Collaborators {
                notifier: Rc::new(SilentNotifier),
                dialog: dialog.clone(),
                navigator: Rc::new(router.clone()),
            },
            RoleInfo { admin: true },
            ConfirmPolicy::OncePerPage,
        );
        block_on(controller.refresh()).unwrap();

        let spawned: Rc<RefCell<Vec<LocalBoxFuture<'static, ()>>>> = Rc::default();
        let queue = spawned.clone();
        let handle = controller.clone();
        guard_unsaved_changes(
            &router,
            move || handle.clone(),
            move |task| queue.borrow_mut().push(task),
        );

        GuardedPage {
            router,
            visited,
            controller,
            dialog,
            spawned,
        }
    }

    #[test]
    fn test_clean_page_navigates_immediately() {
        let page = guarded_page(true);
        page.router.go("/");

        assert_eq!(*page.visited.borrow(), vec!["/".to_string()]);
        assert!(page.spawned.borrow().is_empty());
        assert_eq!(page.dialog.shown.get(), 0);
    }

    #[test]
    fn test_dirty_page_confirms_then_resumes() {
        let page = guarded_page(true);
        page.controller.set_value(PropertyGroup::Mutable, "detection.frames", "20");

        page.router.go("/");
        assert!(page.visited.borrow().is_empty());
        assert_eq!(page.spawned.borrow().len(), 1);

        page.run_spawned();
        assert_eq!(page.dialog.shown.get(), 1);
        assert_eq!(*page.visited.borrow(), vec!["/".to_string()]);
        assert_eq!(page.controller.guard_state(), GuardState::ConfirmedOnce);
    }

    #[test]
    fn test_dirty_page_stays_when_declined() {
        let page = guarded_page(false);
        page.controller.set_value(PropertyGroup::Immutable, "http.port", "9090");

        page.router.go("/");
        page.run_spawned();

        assert_eq!(page.dialog.shown.get(), 1);
        assert!(page.visited.borrow().is_empty());
        assert_eq!(page.controller.guard_state(), GuardState::Dirty);

        // The next attempt asks again
        page.router.go("/");
        assert_eq!(page.spawned.borrow().len(), 1);
    }
}
