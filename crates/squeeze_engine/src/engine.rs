use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use shell_logging::shell_debug;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::client::{run_command, CommandError, CommandResult, EngineClient, EngineCommand};
use crate::events::EventHub;
use crate::process::{EngineSettings, ProcessEngine, TransportError};

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

type OnDone = Box<dyn FnOnce(CommandResult) + Send>;
type Call = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Owns the async runtime and executes engine commands on it.
///
/// Callers stay synchronous: each command's outcome is handed to a callback
/// that runs on a runtime thread. Commands reach the client in the order they
/// were executed; their replies may complete in any order.
pub struct EngineHandle {
    runtime: Runtime,
    queue: mpsc::UnboundedSender<(EngineCommand, OnDone)>,
    events: EventHub,
}

impl EngineHandle {
    /// Starts the engine process and the transport around it.
    pub fn start(settings: &EngineSettings) -> Result<Self, TransportError> {
        let runtime = build_runtime()?;
        let events = EventHub::new();
        let client = {
            let _guard = runtime.enter();
            ProcessEngine::spawn(settings, events.clone())?
        };
        Ok(Self::assemble(runtime, Arc::new(client), events))
    }

    /// Wraps an existing client, e.g. an in-process engine.
    pub fn with_client(
        client: Arc<dyn EngineClient>,
        events: EventHub,
    ) -> Result<Self, TransportError> {
        Ok(Self::assemble(build_runtime()?, client, events))
    }

    fn assemble(runtime: Runtime, client: Arc<dyn EngineClient>, events: EventHub) -> Self {
        let (queue, commands) = mpsc::unbounded_channel();
        runtime.spawn(dispatch(client, commands));
        Self {
            runtime,
            queue,
            events,
        }
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn execute<F>(&self, command: EngineCommand, on_done: F)
    where
        F: FnOnce(CommandResult) + Send + 'static,
    {
        let queued: (EngineCommand, OnDone) = (command, Box::new(on_done));
        if let Err(mpsc::error::SendError((_, on_done))) = self.queue.send(queued) {
            on_done(Err(CommandError::Disconnected));
        }
    }

    /// Calls `callback` on every Ctrl-C until the runtime shuts down.
    pub fn on_interrupt<F>(&self, callback: F)
    where
        F: Fn() + Send + 'static,
    {
        self.runtime.spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                shell_debug!("Interrupt received");
                callback();
            }
        });
    }

    pub fn shutdown(self) {
        self.runtime.shutdown_timeout(SHUTDOWN_GRACE);
    }
}

/// Single consumer of the command queue.
///
/// Each call is polled once as soon as it is dequeued, which is where the
/// client sends its request, and only then parked to await the reply.
async fn dispatch(
    client: Arc<dyn EngineClient>,
    mut commands: mpsc::UnboundedReceiver<(EngineCommand, OnDone)>,
) {
    let mut in_flight: FuturesUnordered<Call> = FuturesUnordered::new();
    loop {
        tokio::select! {
            queued = commands.recv() => {
                let Some((command, on_done)) = queued else {
                    break;
                };
                let mut call: Call = Box::pin(run_one(client.clone(), command, on_done));
                if futures_util::poll!(&mut call).is_pending() {
                    in_flight.push(call);
                }
            }
            Some(()) = in_flight.next(), if !in_flight.is_empty() => {}
        }
    }
    while in_flight.next().await.is_some() {}
}

async fn run_one(client: Arc<dyn EngineClient>, command: EngineCommand, on_done: OnDone) {
    let name = command.name();
    let result = run_command(client.as_ref(), command).await;
    shell_debug!("{} finished: ok={}", name, result.is_ok());
    on_done(result);
}

fn build_runtime() -> Result<Runtime, TransportError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("squeeze-engine")
        .enable_all()
        .build()
        .map_err(TransportError::Runtime)
}
