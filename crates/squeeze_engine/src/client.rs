use serde_json::Value;

use crate::{FileList, ListColumn, PostCompressionAction, SortOrder};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The engine answered with an error message.
    #[error("{command} rejected: {message}")]
    Rejected {
        command: &'static str,
        message: String,
    },
    #[error("engine disconnected")]
    Disconnected,
    #[error("malformed reply to {command}: {message}")]
    Malformed {
        command: &'static str,
        message: String,
    },
}

/// Command surface of the engine.
///
/// List commands answer with the engine's page after the change; every other
/// command reports its results through events.
#[async_trait::async_trait]
pub trait EngineClient: Send + Sync {
    async fn change_page(&self, page: u64) -> Result<FileList, CommandError>;

    async fn filter_list(&self, query: &str) -> Result<FileList, CommandError>;

    async fn sort_list(
        &self,
        column: ListColumn,
        order: SortOrder,
    ) -> Result<FileList, CommandError>;

    async fn remove_items_from_list(&self, keys: &[String]) -> Result<FileList, CommandError>;

    async fn clear_list(&self) -> Result<FileList, CommandError>;

    async fn import_paths(&self, paths: &[String], recursive: bool) -> Result<(), CommandError>;

    async fn compress(
        &self,
        options: &Value,
        threads: usize,
        base_folder: &str,
    ) -> Result<(), CommandError>;

    async fn pause_compression(&self) -> Result<(), CommandError>;

    async fn resume_compression(&self) -> Result<(), CommandError>;

    async fn cancel_compression(&self) -> Result<(), CommandError>;

    async fn preview(
        &self,
        ids: &[String],
        options: &Value,
        threads: usize,
    ) -> Result<(), CommandError>;

    async fn exec_post_compression_action(
        &self,
        action: PostCompressionAction,
        payload: Option<&str>,
    ) -> Result<(), CommandError>;
}

/// A command queued for execution on the engine runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    ChangePage {
        page: u64,
    },
    FilterList {
        query: String,
    },
    SortList {
        column: ListColumn,
        order: SortOrder,
    },
    RemoveItems {
        keys: Vec<String>,
    },
    ClearList,
    ImportPaths {
        paths: Vec<String>,
        recursive: bool,
    },
    Compress {
        options: Value,
        threads: usize,
        base_folder: String,
    },
    PauseCompression,
    ResumeCompression,
    CancelCompression,
    Preview {
        ids: Vec<String>,
        options: Value,
        threads: usize,
    },
    PostCompressionAction {
        action: PostCompressionAction,
        payload: Option<String>,
    },
}

impl EngineCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::ChangePage { .. } => "change_page",
            EngineCommand::FilterList { .. } => "filter_list",
            EngineCommand::SortList { .. } => "sort_list",
            EngineCommand::RemoveItems { .. } => "remove_items_from_list",
            EngineCommand::ClearList => "clear_list",
            EngineCommand::ImportPaths { .. } => "import_paths",
            EngineCommand::Compress { .. } => "compress",
            EngineCommand::PauseCompression => "pause_compression",
            EngineCommand::ResumeCompression => "resume_compression",
            EngineCommand::CancelCompression => "cancel_compression",
            EngineCommand::Preview { .. } => "preview",
            EngineCommand::PostCompressionAction { .. } => "exec_post_compression_action",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    List(FileList),
    Done,
}

pub type CommandResult = Result<CommandReply, CommandError>;

pub async fn run_command(client: &dyn EngineClient, command: EngineCommand) -> CommandResult {
    let list = |result: Result<FileList, CommandError>| result.map(CommandReply::List);
    let done = |result: Result<(), CommandError>| result.map(|()| CommandReply::Done);
    match command {
        EngineCommand::ChangePage { page } => list(client.change_page(page).await),
        EngineCommand::FilterList { query } => list(client.filter_list(&query).await),
        EngineCommand::SortList { column, order } => list(client.sort_list(column, order).await),
        EngineCommand::RemoveItems { keys } => list(client.remove_items_from_list(&keys).await),
        EngineCommand::ClearList => list(client.clear_list().await),
        EngineCommand::ImportPaths { paths, recursive } => {
            done(client.import_paths(&paths, recursive).await)
        }
        EngineCommand::Compress {
            options,
            threads,
            base_folder,
        } => done(client.compress(&options, threads, &base_folder).await),
        EngineCommand::PauseCompression => done(client.pause_compression().await),
        EngineCommand::ResumeCompression => done(client.resume_compression().await),
        EngineCommand::CancelCompression => done(client.cancel_compression().await),
        EngineCommand::Preview {
            ids,
            options,
            threads,
        } => done(client.preview(&ids, &options, threads).await),
        EngineCommand::PostCompressionAction { action, payload } => done(
            client
                .exec_post_compression_action(action, payload.as_deref())
                .await,
        ),
    }
}
