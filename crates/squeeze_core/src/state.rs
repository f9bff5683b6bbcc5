use shell_logging::shell_debug;

use crate::effect::Effect;
use crate::job::Job;
use crate::list::{
    ListCache, ListMutation, ListRejection, MutationOutcome, RecordPatch, RequestId, StatusPatch,
    StructuralRequest,
};
use crate::preferences::Preferences;
use crate::preview::PreviewCoordinator;
use crate::record::{ImageStatus, ListSnapshot};
use crate::selection::Selection;
use crate::view_model::AppViewModel;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportProgress {
    pub active: bool,
    pub progress: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient user-visible message, drained by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) list: ListCache,
    pub(crate) selection: Selection,
    pub(crate) job: Job,
    pub(crate) preview: PreviewCoordinator,
    pub(crate) preferences: Preferences,
    pub(crate) import: ImportProgress,
    pub(crate) notifications: Vec<Notification>,
    pub(crate) exit_prompt_open: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: Preferences) -> Self {
        Self {
            preview: PreviewCoordinator::new(preferences.auto_preview),
            preferences,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(self)
    }

    pub fn list(&self) -> &ListCache {
        &self.list
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn preview(&self) -> &PreviewCoordinator {
        &self.preview
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn import_progress(&self) -> &ImportProgress {
        &self.import
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn notify(
        &mut self,
        level: NotificationLevel,
        title: impl Into<String>,
        body: impl Into<String>,
    ) {
        self.notifications.push(Notification {
            level,
            title: title.into(),
            body: body.into(),
        });
        self.mark_dirty();
    }

    /// Issues a structural command unless the cache refuses it.
    pub(crate) fn begin_list_request(&mut self, command: StructuralRequest) -> Vec<Effect> {
        if self.job.phase().is_active()
            && matches!(
                command,
                StructuralRequest::Remove { .. } | StructuralRequest::Clear
            )
        {
            shell_debug!("Ignoring {} while a job is active", command.name());
            return Vec::new();
        }
        match self.list.begin(command.clone()) {
            Ok(request) => {
                self.mark_dirty();
                vec![Effect::List { request, command }]
            }
            Err(rejection) => {
                log_rejection(&command, rejection);
                Vec::new()
            }
        }
    }

    /// Applies a list mutation and runs the snapshot-replacement reaction.
    pub(crate) fn apply_list_mutation(&mut self, mutation: ListMutation) -> MutationOutcome {
        let outcome = self.list.apply(mutation);
        self.after_list_mutation(outcome);
        outcome
    }

    pub(crate) fn settle_list_request(
        &mut self,
        request: RequestId,
        snapshot: ListSnapshot,
    ) -> MutationOutcome {
        let removed = match self.list.pending_request() {
            Some(StructuralRequest::Remove { ids }) => ids.clone(),
            _ => Vec::new(),
        };
        let outcome = self.list.settle(request, snapshot);
        if matches!(outcome, MutationOutcome::Replaced { .. }) {
            self.preview.forget(&removed);
        }
        self.after_list_mutation(outcome);
        outcome
    }

    /// Status-only local patch on the page and on the inspected copy.
    pub(crate) fn patch_status(&mut self, id: &str, status: ImageStatus, message: Option<String>) {
        self.preview.update_status(id, status, message.as_deref());
        self.apply_list_mutation(ListMutation::Patch(RecordPatch::Local(StatusPatch {
            id: id.to_string(),
            status,
            message,
        })));
    }

    fn after_list_mutation(&mut self, outcome: MutationOutcome) {
        match outcome {
            MutationOutcome::Replaced { .. } => {
                let snapshot = self.list.snapshot();
                let pruned = self.selection.prune(snapshot);
                if pruned > 0 {
                    shell_debug!("Pruned {} selected ids off the page", pruned);
                }
                self.preview.refresh_from(snapshot);
                self.mark_dirty();
            }
            MutationOutcome::Patched => self.mark_dirty(),
            MutationOutcome::Stale | MutationOutcome::NotOnPage => {}
        }
    }
}

fn log_rejection(command: &StructuralRequest, rejection: ListRejection) {
    match rejection {
        ListRejection::Busy => {
            shell_debug!("Dropping {} request: list busy", command.name());
        }
        ListRejection::PageOutOfRange { page, max_page } => {
            shell_debug!("Rejecting page {} (max page {})", page, max_page);
        }
        ListRejection::NothingToRemove => {
            shell_debug!("Nothing selected to remove");
        }
    }
}
