use std::fmt;

/// What happens once a compression job finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostJobAction {
    #[default]
    None,
    /// Terminate the client process.
    CloseApp,
    Sleep,
    Shutdown,
    OpenOutputFolder,
}

impl PostJobAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Some(PostJobAction::None),
            "close_app" | "close" => Some(PostJobAction::CloseApp),
            "sleep" => Some(PostJobAction::Sleep),
            "shutdown" => Some(PostJobAction::Shutdown),
            "open_output_folder" | "open_folder" => Some(PostJobAction::OpenOutputFolder),
            _ => None,
        }
    }
}

impl fmt::Display for PostJobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostJobAction::None => write!(f, "none"),
            PostJobAction::CloseApp => write!(f, "close_app"),
            PostJobAction::Sleep => write!(f, "sleep"),
            PostJobAction::Shutdown => write!(f, "shutdown"),
            PostJobAction::OpenOutputFolder => write!(f, "open_output_folder"),
        }
    }
}

/// Settings the orchestration layer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub auto_preview: bool,
    pub threads: usize,
    pub post_job_action: PostJobAction,
    pub prompt_before_exit: bool,
    /// Skip every confirmation prompt, including the exit prompt.
    pub skip_confirmations: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_preview: true,
            threads: 1,
            post_job_action: PostJobAction::None,
            prompt_before_exit: false,
            skip_confirmations: false,
        }
    }
}
