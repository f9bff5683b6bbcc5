//! Client-side cache of one engine page.
//!
//! The cache never filters, sorts or paginates on its own. Structural changes
//! go out as a [`StructuralRequest`] and come back as a full [`ListSnapshot`]
//! that replaces whatever was held before. The only in-place edits are record
//! patches, which may touch a single record but never the page shape.

use shell_logging::{shell_debug, shell_warn};

use crate::record::{FilterQuery, ImageId, ImageRecord, ImageStatus, ListSnapshot, SortSpec};

/// Fixed number of records per engine page.
pub const PAGE_SIZE: u64 = 50;

/// Identifier stamped on every structural request, increasing per cache.
pub type RequestId = u64;

/// Number of pages needed for `total` records.
pub fn total_pages(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralRequest {
    ChangePage { page: u64 },
    Filter(FilterQuery),
    Sort(SortSpec),
    Remove { ids: Vec<ImageId> },
    Clear,
}

impl StructuralRequest {
    pub fn name(&self) -> &'static str {
        match self {
            StructuralRequest::ChangePage { .. } => "change page",
            StructuralRequest::Filter(_) => "filter",
            StructuralRequest::Sort(_) => "sort",
            StructuralRequest::Remove { .. } => "remove",
            StructuralRequest::Clear => "clear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRejection {
    /// Another structural command is still outstanding.
    Busy,
    PageOutOfRange { page: u64, max_page: u64 },
    NothingToRemove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Answer to the structural request with this id.
    Response(RequestId),
    /// Unsolicited `list:changed` event.
    Push,
}

/// Local, non-authoritative edit of one record's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPatch {
    pub id: ImageId,
    pub status: ImageStatus,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordPatch {
    /// Full record as delivered by the engine.
    Authoritative(ImageRecord),
    Local(StatusPatch),
}

impl RecordPatch {
    pub fn id(&self) -> &str {
        match self {
            RecordPatch::Authoritative(record) => &record.id,
            RecordPatch::Local(patch) => &patch.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMutation {
    Replace {
        snapshot: ListSnapshot,
        origin: SnapshotOrigin,
    },
    Patch(RecordPatch),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Replaced { page_clamped: bool },
    Patched,
    /// Response to a request that has since been superseded.
    Stale,
    /// Patch for a record that is not on the current page.
    NotOnPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    id: RequestId,
    request: StructuralRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCache {
    snapshot: ListSnapshot,
    current_page: u64,
    last_issued: RequestId,
    in_flight: Option<InFlight>,
    filter: FilterQuery,
    sort: Option<SortSpec>,
}

impl Default for ListCache {
    fn default() -> Self {
        Self {
            snapshot: ListSnapshot::default(),
            current_page: 1,
            last_issued: 0,
            in_flight: None,
            filter: FilterQuery::default(),
            sort: None,
        }
    }
}

impl ListCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &ListSnapshot {
        &self.snapshot
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.snapshot.total_count)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn filter(&self) -> &FilterQuery {
        &self.filter
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    /// Request currently awaiting its snapshot, if any.
    pub fn pending_request(&self) -> Option<&StructuralRequest> {
        self.in_flight.as_ref().map(|in_flight| &in_flight.request)
    }

    /// Stamps `request` and marks the cache busy.
    ///
    /// Requests issued while busy are dropped, not queued.
    pub fn begin(&mut self, request: StructuralRequest) -> Result<RequestId, ListRejection> {
        if self.is_busy() {
            return Err(ListRejection::Busy);
        }
        match &request {
            StructuralRequest::ChangePage { page } => {
                let max_page = self.total_pages().max(1);
                if *page == 0 || *page > max_page {
                    return Err(ListRejection::PageOutOfRange {
                        page: *page,
                        max_page,
                    });
                }
            }
            StructuralRequest::Remove { ids } if ids.is_empty() => {
                return Err(ListRejection::NothingToRemove);
            }
            _ => {}
        }

        self.last_issued += 1;
        let id = self.last_issued;
        self.in_flight = Some(InFlight { id, request });
        Ok(id)
    }

    /// Applies the engine's answer to request `id`.
    pub fn settle(&mut self, id: RequestId, snapshot: ListSnapshot) -> MutationOutcome {
        let Some(in_flight) = self.take_in_flight(id) else {
            shell_debug!(
                "Dropping stale list response request={} latest={}",
                id,
                self.last_issued
            );
            return MutationOutcome::Stale;
        };

        match in_flight.request {
            StructuralRequest::ChangePage { page } => self.current_page = page,
            StructuralRequest::Filter(query) => self.filter = query,
            StructuralRequest::Sort(spec) => self.sort = Some(spec),
            StructuralRequest::Remove { .. } | StructuralRequest::Clear => {}
        }

        self.apply(ListMutation::Replace {
            snapshot,
            origin: SnapshotOrigin::Response(id),
        })
    }

    /// Releases the busy flag after request `id` failed. The cache keeps its
    /// last known-good snapshot. Returns false for superseded requests.
    pub fn fail(&mut self, id: RequestId) -> bool {
        self.take_in_flight(id).is_some()
    }

    pub fn apply(&mut self, mutation: ListMutation) -> MutationOutcome {
        match mutation {
            ListMutation::Replace { snapshot, origin } => {
                if let SnapshotOrigin::Response(id) = origin {
                    if id != self.last_issued {
                        return MutationOutcome::Stale;
                    }
                }
                self.snapshot = snapshot;
                let page_clamped = self.clamp_page();
                MutationOutcome::Replaced { page_clamped }
            }
            ListMutation::Patch(patch) => self.patch(patch),
        }
    }

    /// Page to refetch when clamping moved the page and the engine answered
    /// with an empty page although records remain.
    pub fn refetch_after_clamp(&self, outcome: MutationOutcome) -> Option<u64> {
        match outcome {
            MutationOutcome::Replaced { page_clamped: true }
                if self.snapshot.is_empty() && self.snapshot.total_count > 0 =>
            {
                Some(self.current_page)
            }
            _ => None,
        }
    }

    fn patch(&mut self, patch: RecordPatch) -> MutationOutcome {
        let Some(slot) = self.snapshot.get_mut(patch.id()) else {
            return MutationOutcome::NotOnPage;
        };
        match patch {
            RecordPatch::Authoritative(record) => *slot = record,
            RecordPatch::Local(StatusPatch {
                status, message, ..
            }) => {
                slot.status = status;
                if let Some(message) = message {
                    slot.info = message;
                }
            }
        }
        MutationOutcome::Patched
    }

    fn clamp_page(&mut self) -> bool {
        let max_page = self.total_pages().max(1);
        let clamped = self.current_page.clamp(1, max_page);
        if clamped == self.current_page {
            return false;
        }
        shell_debug!(
            "Clamping page {} -> {} (total={})",
            self.current_page,
            clamped,
            self.snapshot.total_count
        );
        self.current_page = clamped;
        true
    }

    fn take_in_flight(&mut self, id: RequestId) -> Option<InFlight> {
        match &self.in_flight {
            Some(in_flight) if in_flight.id == id => self.in_flight.take(),
            Some(in_flight) => {
                shell_warn!(
                    "List response for request {} while {} is in flight",
                    id,
                    in_flight.id
                );
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ids: &[&str], total: u64) -> ListSnapshot {
        ListSnapshot {
            items: ids
                .iter()
                .map(|id| ImageRecord {
                    id: (*id).to_string(),
                    ..ImageRecord::default()
                })
                .collect(),
            base_folder: "/img".into(),
            total_count: total,
        }
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(50), 1);
        assert_eq!(total_pages(51), 2);
        assert_eq!(total_pages(120), 3);
    }

    #[test]
    fn busy_cache_drops_new_requests() {
        let mut cache = ListCache::new();
        let id = cache.begin(StructuralRequest::Clear).unwrap();
        assert!(cache.is_busy());
        assert_eq!(
            cache.begin(StructuralRequest::Filter(FilterQuery::new("x"))),
            Err(ListRejection::Busy)
        );
        cache.settle(id, ListSnapshot::default());
        assert!(!cache.is_busy());
    }

    #[test]
    fn failed_request_keeps_last_snapshot() {
        let mut cache = ListCache::new();
        let id = cache.begin(StructuralRequest::Clear).unwrap();
        cache.settle(id, snapshot(&["a", "b"], 2));

        let id = cache
            .begin(StructuralRequest::Sort(SortSpec::default()))
            .unwrap();
        assert!(cache.fail(id));
        assert!(!cache.is_busy());
        assert_eq!(cache.snapshot(), &snapshot(&["a", "b"], 2));
        assert_eq!(cache.sort(), None);
    }

    #[test]
    fn superseded_response_is_stale() {
        let mut cache = ListCache::new();
        let first = cache.begin(StructuralRequest::Clear).unwrap();
        assert_eq!(
            cache.settle(first, snapshot(&["a"], 1)),
            MutationOutcome::Replaced {
                page_clamped: false
            }
        );
        assert_eq!(
            cache.settle(first, snapshot(&["zzz"], 1)),
            MutationOutcome::Stale
        );
        assert!(cache.snapshot().contains("a"));
    }

    #[test]
    fn local_patch_touches_status_only() {
        let mut cache = ListCache::new();
        cache.apply(ListMutation::Replace {
            snapshot: snapshot(&["a", "b"], 2),
            origin: SnapshotOrigin::Push,
        });
        let outcome = cache.apply(ListMutation::Patch(RecordPatch::Local(StatusPatch {
            id: "a".into(),
            status: ImageStatus::Error,
            message: Some("decode failed".into()),
        })));
        assert_eq!(outcome, MutationOutcome::Patched);
        let a = cache.snapshot().get("a").unwrap();
        assert_eq!(a.status, ImageStatus::Error);
        assert_eq!(a.info, "decode failed");
        assert_eq!(cache.snapshot().items.len(), 2);
        assert_eq!(cache.snapshot().total_count, 2);

        let outcome = cache.apply(ListMutation::Patch(RecordPatch::Local(StatusPatch {
            id: "missing".into(),
            status: ImageStatus::Compressing,
            message: None,
        })));
        assert_eq!(outcome, MutationOutcome::NotOnPage);
    }
}
