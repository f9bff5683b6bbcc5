//! JSON-lines transport to an engine running as a child process.
//!
//! Requests carry an id and are answered by a response frame with the same
//! id, in any order. Event frames interleave freely and go to the [`EventHub`].

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shell_logging::{shell_debug, shell_info, shell_warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use crate::client::{CommandError, EngineClient};
use crate::events::EventHub;
use crate::{EngineEvent, FileList, ListColumn, PostCompressionAction, SortOrder};

/// Longest line accepted from the engine; a full page of records fits easily.
const MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            program: "squeeze-engine".to_string(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to start engine `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("engine process has no {0} pipe")]
    MissingPipe(&'static str),
    #[error("failed to build engine runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

#[derive(Serialize)]
struct RequestFrame<'a> {
    id: u64,
    command: &'a str,
    args: Value,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InboundFrame {
    Response {
        id: u64,
        #[serde(default)]
        ok: Option<Value>,
        #[serde(default)]
        error: Option<String>,
    },
    Event {
        event: String,
        #[serde(default)]
        payload: Value,
    },
}

type Reply = Result<Value, String>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Reply>>>>;

pub struct ProcessEngine {
    outbound: mpsc::UnboundedSender<String>,
    pending: PendingMap,
    closed: Arc<AtomicBool>,
    next_id: AtomicU64,
    // Killed when the engine is dropped.
    _child: Mutex<Option<Child>>,
}

impl ProcessEngine {
    /// Starts the engine process. Must run inside a tokio runtime.
    pub fn spawn(settings: &EngineSettings, hub: EventHub) -> Result<Self, TransportError> {
        let mut child = Command::new(&settings.program)
            .args(&settings.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: settings.program.clone(),
                source,
            })?;
        let stdin = child
            .stdin
            .take()
            .ok_or(TransportError::MissingPipe("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or(TransportError::MissingPipe("stdout"))?;
        shell_info!(
            "Started engine `{}` (pid {:?})",
            settings.program,
            child.id()
        );

        let engine = Self::from_io(stdout, stdin, hub);
        *lock(&engine._child) = Some(child);
        Ok(engine)
    }

    /// Speaks the protocol over arbitrary streams. Must run inside a tokio
    /// runtime.
    pub fn from_io<R, W>(reader: R, writer: W, hub: EventHub) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let pending = PendingMap::default();
        let closed = Arc::new(AtomicBool::new(false));

        tokio::spawn(write_loop(writer, outbound_rx));
        tokio::spawn(read_loop(reader, pending.clone(), closed.clone(), hub));

        Self {
            outbound,
            pending,
            closed,
            next_id: AtomicU64::new(1),
            _child: Mutex::new(None),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn request(&self, command: &'static str, args: Value) -> Result<Value, CommandError> {
        if self.is_closed() {
            return Err(CommandError::Disconnected);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let line = serde_json::to_string(&RequestFrame { id, command, args }).map_err(|err| {
            CommandError::Malformed {
                command,
                message: err.to_string(),
            }
        })?;

        let (reply_tx, reply_rx) = oneshot::channel();
        lock(&self.pending).insert(id, reply_tx);
        // The reader marks the stream closed before failing pending requests,
        // so a request registered after that sweep is caught here.
        if self.is_closed() || self.outbound.send(line).is_err() {
            lock(&self.pending).remove(&id);
            return Err(CommandError::Disconnected);
        }
        shell_debug!("-> {} #{}", command, id);

        match reply_rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(CommandError::Rejected { command, message }),
            Err(_) => Err(CommandError::Disconnected),
        }
    }

    async fn request_list(
        &self,
        command: &'static str,
        args: Value,
    ) -> Result<FileList, CommandError> {
        let value = self.request(command, args).await?;
        decode(command, value)
    }

    async fn request_unit(&self, command: &'static str, args: Value) -> Result<(), CommandError> {
        self.request(command, args).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl EngineClient for ProcessEngine {
    async fn change_page(&self, page: u64) -> Result<FileList, CommandError> {
        self.request_list("change_page", json!({ "page": page })).await
    }

    async fn filter_list(&self, query: &str) -> Result<FileList, CommandError> {
        self.request_list("filter_list", json!({ "query": query })).await
    }

    async fn sort_list(
        &self,
        column: ListColumn,
        order: SortOrder,
    ) -> Result<FileList, CommandError> {
        self.request_list("sort_list", json!({ "column": column, "order": order }))
            .await
    }

    async fn remove_items_from_list(&self, keys: &[String]) -> Result<FileList, CommandError> {
        self.request_list("remove_items_from_list", json!({ "keys": keys }))
            .await
    }

    async fn clear_list(&self) -> Result<FileList, CommandError> {
        self.request_list("clear_list", json!({})).await
    }

    async fn import_paths(&self, paths: &[String], recursive: bool) -> Result<(), CommandError> {
        self.request_unit(
            "import_paths",
            json!({ "paths": paths, "recursive": recursive }),
        )
        .await
    }

    async fn compress(
        &self,
        options: &Value,
        threads: usize,
        base_folder: &str,
    ) -> Result<(), CommandError> {
        self.request_unit(
            "compress",
            json!({ "options": options, "threads": threads, "base_folder": base_folder }),
        )
        .await
    }

    async fn pause_compression(&self) -> Result<(), CommandError> {
        self.request_unit("pause_compression", json!({})).await
    }

    async fn resume_compression(&self) -> Result<(), CommandError> {
        self.request_unit("resume_compression", json!({})).await
    }

    async fn cancel_compression(&self) -> Result<(), CommandError> {
        self.request_unit("cancel_compression", json!({})).await
    }

    async fn preview(
        &self,
        ids: &[String],
        options: &Value,
        threads: usize,
    ) -> Result<(), CommandError> {
        self.request_unit(
            "preview",
            json!({ "ids": ids, "options": options, "threads": threads }),
        )
        .await
    }

    async fn exec_post_compression_action(
        &self,
        action: PostCompressionAction,
        payload: Option<&str>,
    ) -> Result<(), CommandError> {
        self.request_unit(
            "exec_post_compression_action",
            json!({ "post_compression_action": action, "payload": payload }),
        )
        .await
    }
}

async fn write_loop<W>(writer: W, mut outbound: mpsc::UnboundedReceiver<String>)
where
    W: AsyncWrite + Unpin,
{
    let mut sink = FramedWrite::new(writer, LinesCodec::new());
    while let Some(line) = outbound.recv().await {
        if let Err(err) = sink.send(line).await {
            shell_warn!("Engine write failed: {}", err);
            break;
        }
    }
}

async fn read_loop<R>(reader: R, pending: PendingMap, closed: Arc<AtomicBool>, hub: EventHub)
where
    R: AsyncRead + Unpin,
{
    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_BYTES));
    while let Some(line) = lines.next().await {
        match line {
            Ok(line) => route_line(&line, &pending, &hub),
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                shell_warn!("Skipping engine line longer than {} bytes", MAX_LINE_BYTES);
            }
            Err(LinesCodecError::Io(err)) => {
                shell_warn!("Engine read failed: {}", err);
                break;
            }
        }
    }

    closed.store(true, Ordering::SeqCst);
    let abandoned: Vec<_> = lock(&pending).drain().collect();
    shell_info!(
        "Engine stream closed, failing {} pending requests",
        abandoned.len()
    );
    // Dropping the senders resolves every waiter with `Disconnected`.
    drop(abandoned);
}

fn route_line(line: &str, pending: &PendingMap, hub: &EventHub) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    let frame: InboundFrame = match serde_json::from_str(line) {
        Ok(frame) => frame,
        Err(err) => {
            shell_warn!("Skipping unparseable engine line: {}", err);
            return;
        }
    };
    match frame {
        InboundFrame::Response { id, ok, error } => {
            let Some(reply_tx) = lock(pending).remove(&id) else {
                shell_warn!("Response for unknown request #{}", id);
                return;
            };
            let reply = match error {
                Some(message) => Err(message),
                None => Ok(ok.unwrap_or(Value::Null)),
            };
            // The requester may have gone away; nothing to do then.
            let _ = reply_tx.send(reply);
        }
        InboundFrame::Event { event, payload } => {
            match EngineEvent::from_parts(event.clone(), payload) {
                Ok(event) => {
                    hub.publish(&event);
                }
                Err(err) => shell_warn!("Skipping malformed {} event: {}", event, err),
            }
        }
    }
}

fn decode<T: DeserializeOwned>(command: &'static str, value: Value) -> Result<T, CommandError> {
    serde_json::from_value(value).map_err(|err| CommandError::Malformed {
        command,
        message: err.to_string(),
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
