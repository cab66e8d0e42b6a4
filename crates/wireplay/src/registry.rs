//! Process-wide activation registry. One instance lives for the test-run
//! process and is handed to every controller; suite- and case-scoped
//! controllers share it so each logical scope starts exactly once and stops
//! exactly once, however many hook invocations fire in between.

use crate::mode::ScenarioMode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Cloneable handle to the shared registry. Mutation is serialized behind
/// one mutex; `claim` is the single check-and-set that prevents two
/// overlapping activations from racing to start duplicate servers.
#[derive(Default, Clone)]
pub struct ScopeRegistry {
    inner: Arc<Mutex<HashMap<String, Option<ScenarioMode>>>>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `identity` for activation. Returns false if it is already
    /// claimed, in which case the caller must not start anything.
    pub fn claim(&self, identity: &str) -> bool {
        let mut inner = self.inner.lock().expect("registry lock");
        if inner.contains_key(identity) {
            return false;
        }
        inner.insert(identity.to_string(), None);
        true
    }

    /// Record the resolved mode for a claimed scope.
    pub fn complete(&self, identity: &str, mode: ScenarioMode) {
        let mut inner = self.inner.lock().expect("registry lock");
        if let Some(slot) = inner.get_mut(identity) {
            *slot = Some(mode);
        }
    }

    /// Release `identity`. Returns true if it was claimed, i.e. the caller
    /// owns the teardown; a second release for the same activation is false.
    pub fn release(&self, identity: &str) -> bool {
        self.inner
            .lock()
            .expect("registry lock")
            .remove(identity)
            .is_some()
    }

    /// Resolved mode of an active scope, if setup completed.
    pub fn active_mode(&self, identity: &str) -> Option<ScenarioMode> {
        self.inner
            .lock()
            .expect("registry lock")
            .get(identity)
            .copied()
            .flatten()
    }

    pub fn is_active(&self, identity: &str) -> bool {
        self.inner
            .lock()
            .expect("registry lock")
            .contains_key(identity)
    }
}
