use std::collections::BTreeSet;

use crate::record::{ImageId, ImageRecord, ImageStatus, ListSnapshot};

/// Tracks the item under inspection and previews awaiting a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewCoordinator {
    auto_preview: bool,
    inspected: Option<ImageRecord>,
    pending: BTreeSet<ImageId>,
}

impl Default for PreviewCoordinator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PreviewCoordinator {
    pub fn new(auto_preview: bool) -> Self {
        Self {
            auto_preview,
            inspected: None,
            pending: BTreeSet::new(),
        }
    }

    pub fn auto_preview(&self) -> bool {
        self.auto_preview
    }

    pub fn set_auto_preview(&mut self, enabled: bool) {
        self.auto_preview = enabled;
    }

    pub fn inspected(&self) -> Option<&ImageRecord> {
        self.inspected.as_ref()
    }

    pub fn inspected_id(&self) -> Option<&str> {
        self.inspected.as_ref().map(|record| record.id.as_str())
    }

    pub fn inspect(&mut self, record: Option<ImageRecord>) {
        self.inspected = record;
    }

    /// True while the inspected item has a preview outstanding.
    pub fn is_loading(&self) -> bool {
        self.inspected_id()
            .is_some_and(|id| self.pending.contains(id))
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }

    /// Filters `ids` down to those that can be previewed now and marks them
    /// pending. Unknown and already compressing ids are skipped.
    pub fn plan(&mut self, ids: &[ImageId], snapshot: &ListSnapshot) -> Vec<ImageId> {
        let mut planned = Vec::new();
        for id in ids {
            let eligible = snapshot
                .get(id)
                .is_some_and(|record| record.status != ImageStatus::Compressing);
            if eligible && !planned.contains(id) {
                self.pending.insert(id.clone());
                planned.push(id.clone());
            }
        }
        planned
    }

    /// A result (or a failure) arrived for `id`.
    pub fn resolve(&mut self, id: &str) {
        self.pending.remove(id);
    }

    /// Keeps the inspected copy in sync with an authoritative record.
    pub fn refresh_record(&mut self, record: &ImageRecord) {
        if let Some(inspected) = self.inspected.as_mut() {
            if inspected.id == record.id {
                *inspected = record.clone();
            }
        }
    }

    /// Re-reads the inspected item from a new page and drops pending ids
    /// that left it.
    pub fn refresh_from(&mut self, snapshot: &ListSnapshot) {
        if snapshot.total_count == 0 {
            self.inspected = None;
            self.pending.clear();
            return;
        }
        self.pending.retain(|id| snapshot.contains(id));
        let current = self
            .inspected_id()
            .and_then(|id| snapshot.get(id))
            .cloned();
        if let Some(record) = current {
            self.inspected = Some(record);
        }
    }

    /// Drops the inspected item when the engine removed it.
    pub fn forget(&mut self, ids: &[ImageId]) {
        if self
            .inspected_id()
            .is_some_and(|inspected| ids.iter().any(|id| id == inspected))
        {
            self.inspected = None;
        }
        for id in ids {
            self.pending.remove(id);
        }
    }

    pub(crate) fn update_status(&mut self, id: &str, status: ImageStatus, message: Option<&str>) {
        if let Some(inspected) = self.inspected.as_mut() {
            if inspected.id == id {
                inspected.status = status;
                if let Some(message) = message {
                    inspected.info = message.to_string();
                }
            }
        }
    }
}
