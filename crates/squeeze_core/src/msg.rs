use crate::job::{JobCommand, JobSummary};
use crate::list::RequestId;
use crate::preferences::PostJobAction;
use crate::record::{ImageId, ImageRecord, ListSnapshot, SortSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked for another page (1-based).
    PageRequested(u64),
    /// User edited the filter box (debounced text).
    FilterChanged(String),
    /// User clicked a sortable column header.
    SortChanged(SortSpec),
    RemoveRequested(Vec<ImageId>),
    RemoveSelectedClicked,
    ClearClicked,
    ImportRequested {
        paths: Vec<String>,
        recursive: bool,
    },
    SelectionToggled(ImageId),
    SelectAllClicked,
    SelectNoneClicked,
    /// Row activated; `None` clears the inspection.
    ItemInspected(Option<ImageId>),
    /// Empty list previews the current selection.
    PreviewRequested(Vec<ImageId>),
    AutoPreviewToggled(bool),
    PostJobActionChanged(PostJobAction),
    CompressClicked,
    PauseClicked,
    ResumeClicked,
    CancelClicked,
    /// Window close intent (Ctrl-C, quit).
    CloseRequested,
    ExitConfirmed,
    ExitDismissed,

    /// Engine answer to a structural command.
    ListResponse {
        request: RequestId,
        result: Result<ListSnapshot, String>,
    },
    JobCommandFailed {
        command: JobCommand,
        message: String,
    },
    PreviewFailed {
        ids: Vec<ImageId>,
        message: String,
    },
    /// Any other command the engine refused (import, post-job action).
    CommandFailed {
        command: String,
        message: String,
    },

    ImportStarted,
    ImportProgress {
        progress: u64,
        total: u64,
    },
    ImportFinished {
        added: u64,
    },
    /// Push-driven full snapshot replace.
    ListChanged(ListSnapshot),
    /// Single-record update delivered by the engine.
    ItemUpdated(ImageRecord),
    CompressionProgress(u64),
    CompressionFinished(JobSummary),
    CompressionPaused,

    /// UI/render tick to coalesce rendering.
    Tick,
}
