use crate::list::{RequestId, StructuralRequest};
use crate::preferences::{PostJobAction, Preferences};
use crate::record::ImageId;

/// Work the shell performs on behalf of the core. Command outcomes come back
/// as messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Structural list command; answered by `Msg::ListResponse`.
    List {
        request: RequestId,
        command: StructuralRequest,
    },
    ImportPaths {
        paths: Vec<String>,
        recursive: bool,
    },
    Compress {
        threads: usize,
        base_folder: String,
    },
    PauseCompression,
    ResumeCompression,
    CancelCompression,
    Preview {
        ids: Vec<ImageId>,
        threads: usize,
    },
    RunPostJobAction(PostJobAction),
    SavePreferences(Preferences),
    Exit,
}
