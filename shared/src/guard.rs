//! Navigation guard for pages with unsaved edits
//!
//! The router asks the guard about every transition it is about to perform.
//! A dirty page cancels the transition until the operator confirms; the
//! confirmed transition is then resumed through the router, which asks the
//! guard again.

/// How long an operator's "leave anyway" answer stays in effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfirmPolicy {
    /// After the first confirmation every later transition of the page
    /// proceeds unguarded, dirty or not.
    #[default]
    OncePerPage,
    /// A confirmation lets only the transition it was raised for through.
    EveryDirtyNavigation,
}

/// Observable state of the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Clean,
    Dirty,
    ConfirmedOnce,
}

/// Outcome of asking the guard about a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Proceed,
    /// The transition must be cancelled and confirmation requested
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub struct NavigationGuard {
    policy: ConfirmPolicy,
    confirmed: bool,
    resuming: Option<String>,
}

impl NavigationGuard {
    pub fn new(policy: ConfirmPolicy) -> Self {
        Self {
            policy,
            confirmed: false,
            resuming: None,
        }
    }

    pub fn policy(&self) -> ConfirmPolicy {
        self.policy
    }

    pub fn state(&self, dirty: bool) -> GuardState {
        if self.confirmed {
            GuardState::ConfirmedOnce
        } else if dirty {
            GuardState::Dirty
        } else {
            GuardState::Clean
        }
    }

    /// Decide whether the transition to `target` may proceed
    pub fn check(&mut self, target: &str, dirty: bool) -> NavigationDecision {
        if self.resuming.as_deref() == Some(target) {
            self.resuming = None;
            return NavigationDecision::Proceed;
        }
        if self.confirmed || !dirty {
            return NavigationDecision::Proceed;
        }
        NavigationDecision::Cancel
    }

    /// Record that the operator agreed to leave towards `target`
    pub fn accept(&mut self, target: &str) {
        match self.policy {
            ConfirmPolicy::OncePerPage => self.confirmed = true,
            ConfirmPolicy::EveryDirtyNavigation => self.resuming = Some(target.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_page_always_proceeds() {
        let mut guard = NavigationGuard::default();
        assert_eq!(guard.state(false), GuardState::Clean);
        assert_eq!(guard.check("/dashboard", false), NavigationDecision::Proceed);
        assert_eq!(guard.check("/dashboard", false), NavigationDecision::Proceed);
    }

    #[test]
    fn test_dirty_page_cancels_until_accepted() {
        let mut guard = NavigationGuard::default();
        assert_eq!(guard.state(true), GuardState::Dirty);
        assert_eq!(guard.check("/dashboard", true), NavigationDecision::Cancel);
        // Declining leaves the guard armed
        assert_eq!(guard.check("/dashboard", true), NavigationDecision::Cancel);
    }

    #[test]
    fn test_once_per_page_never_rearms() {
        let mut guard = NavigationGuard::new(ConfirmPolicy::OncePerPage);
        assert_eq!(guard.check("/a", true), NavigationDecision::Cancel);
        guard.accept("/a");

        assert_eq!(guard.state(true), GuardState::ConfirmedOnce);
        assert_eq!(guard.check("/a", true), NavigationDecision::Proceed);
        assert_eq!(guard.check("/b", true), NavigationDecision::Proceed);
    }

    #[test]
    fn test_every_dirty_navigation_lets_one_transition_through() {
        let mut guard = NavigationGuard::new(ConfirmPolicy::EveryDirtyNavigation);
        assert_eq!(guard.check("/a", true), NavigationDecision::Cancel);
        guard.accept("/a");

        assert_eq!(guard.state(true), GuardState::Dirty);
        assert_eq!(guard.check("/b", true), NavigationDecision::Cancel);
        assert_eq!(guard.check("/a", true), NavigationDecision::Proceed);
        assert_eq!(guard.check("/a", true), NavigationDecision::Cancel);
    }
}
