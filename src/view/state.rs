//! Partial-state markers shared between the initial build and postbacks

use std::collections::{BTreeSet, HashMap};

/// Persists per-tag markers between builds of the same view
pub trait StateCoordinator: Send {
    /// Whether the current build restores a previously built view
    fn is_postback(&self) -> bool;

    /// Marker saved for `key` by an earlier build
    fn restore_marker(&self, key: &str) -> Option<String>;

    /// Record `value` for `key` so a later build can compare against it
    fn save_marker(&mut self, key: &str, value: &str);

    /// Saved partial state under `key` is stale; recompute it in full
    fn mark_full_state(&mut self, key: &str);
}

/// Marker store kept in memory across builds
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateCoordinator {
    postback: bool,
    markers: HashMap<String, String>,
    full_state: BTreeSet<String>,
}

impl InMemoryStateCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to postback mode for the next build, keeping saved markers
    pub fn begin_postback(&mut self) {
        self.postback = true;
        self.full_state.clear();
    }

    pub fn marker(&self, key: &str) -> Option<&str> {
        self.markers.get(key).map(|s| s.as_str())
    }

    /// Keys marked for full-state recompute during the last build
    pub fn full_state_keys(&self) -> impl Iterator<Item = &str> {
        self.full_state.iter().map(|s| s.as_str())
    }

    pub fn needs_full_state(&self, key: &str) -> bool {
        self.full_state.contains(key)
    }
}

impl StateCoordinator for InMemoryStateCoordinator {
    fn is_postback(&self) -> bool {
        self.postback
    }

    fn restore_marker(&self, key: &str) -> Option<String> {
        self.markers.get(key).cloned()
    }

    fn save_marker(&mut self, key: &str, value: &str) {
        self.markers.insert(key.to_string(), value.to_string());
    }

    fn mark_full_state(&mut self, key: &str) {
        self.full_state.insert(key.to_string());
    }
}
