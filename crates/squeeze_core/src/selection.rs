use std::collections::BTreeSet;

use crate::record::{ImageId, ListSnapshot};

/// Selected ids, always a subset of the ids on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    ids: BTreeSet<ImageId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips `id`. Ids that are not on the page are ignored.
    pub fn toggle(&mut self, id: &str, snapshot: &ListSnapshot) -> bool {
        if !snapshot.contains(id) {
            return false;
        }
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
        true
    }

    pub fn select_all(&mut self, snapshot: &ListSnapshot) {
        self.ids = snapshot.items.iter().map(|item| item.id.clone()).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drops every id that is no longer on the page. Returns how many went.
    pub fn prune(&mut self, snapshot: &ListSnapshot) -> usize {
        let before = self.ids.len();
        if snapshot.is_empty() {
            self.ids.clear();
        } else {
            self.ids.retain(|id| snapshot.contains(id));
        }
        before - self.ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<ImageId> {
        self.ids.iter().cloned().collect()
    }
}
