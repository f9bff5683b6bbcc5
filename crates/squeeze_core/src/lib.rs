//! Squeeze core: pure state machine for list sync and job orchestration.
mod effect;
mod job;
mod list;
mod msg;
mod preferences;
mod preview;
mod record;
mod selection;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use job::{Job, JobCommand, JobPhase, JobStartRejection, JobSummary, ProgressUpdate};
pub use list::{
    total_pages, ListCache, ListMutation, ListRejection, MutationOutcome, RecordPatch, RequestId,
    SnapshotOrigin, StatusPatch, StructuralRequest, PAGE_SIZE,
};
pub use msg::Msg;
pub use preferences::{PostJobAction, Preferences};
pub use preview::PreviewCoordinator;
pub use record::{
    CompressedVariant, FilterQuery, ImageId, ImageRecord, ImageStatus, ListSnapshot, SortColumn,
    SortDirection, SortSpec,
};
pub use selection::Selection;
pub use state::{AppState, ImportProgress, Notification, NotificationLevel};
pub use update::update;
pub use view_model::{AppViewModel, ImageRowView, ImportView, JobView};
