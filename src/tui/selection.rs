use std::collections::HashSet;

/// Tracks which record ids are selected in one queue view and whether
/// selection mode is active. Each view owns its own instance; nothing here
/// is shared across views.
///
/// Selection is scoped to the currently loaded page: `prune` runs on every
/// data refresh and drops ids that are no longer visible, so a page or
/// queue change can never leak stale ids into a later batch action.
#[derive(Debug, Default)]
pub struct Selection {
    selected: HashSet<u64>,
    active: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn enter(&mut self) {
        self.active = true;
    }

    /// Leaving selection mode always clears the selection.
    pub fn exit(&mut self) {
        self.active = false;
        self.clear();
    }

    /// Flip membership of `id`. Safe to call with an id that is not on the
    /// current page; it simply toggles in and gets pruned on refresh.
    pub fn toggle(&mut self, id: u64) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// If every visible id is already selected, deselect exactly those;
    /// otherwise select all of them.
    pub fn toggle_all(&mut self, visible: &[u64]) {
        if !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id)) {
            for id in visible {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(visible.iter().copied());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.selected.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_all_selected(&self, total: usize) -> bool {
        total > 0 && self.selected.len() == total
    }

    /// Drop ids that are no longer part of the visible row set.
    pub fn prune(&mut self, visible: &[u64]) {
        let visible: HashSet<u64> = visible.iter().copied().collect();
        self.selected.retain(|id| visible.contains(id));
    }
}
