//! Squeeze engine: wire types, command client and event fan-out.
mod client;
mod engine;
mod events;
mod process;
mod types;

pub use client::{
    run_command, CommandError, CommandReply, CommandResult, EngineClient, EngineCommand,
};
pub use engine::EngineHandle;
pub use events::{EventHub, Subscription};
pub use process::{EngineSettings, ProcessEngine, TransportError};
pub use types::{
    CImage, CompressionProgress, CompressionStatus, CompressionSummary, EngineEvent, EventKind,
    FileList, ImportFinished, ImportProgress, ItemUpdate, ListColumn, PostCompressionAction,
    SortOrder, WireStatus,
};
