use std::sync::mpsc;

use anyhow::Context;
use shell_logging::{shell_info, shell_warn};
use squeeze_core::{AppState, Msg};
use squeeze_engine::EngineHandle;

use super::bridge::EventBridge;
use super::config::{self, ShellConfig};
use super::effects::EffectRunner;
use super::logging;
use super::persistence::ConfigStore;

/// The wired-up service graph, ready for the main loop.
pub(crate) struct Services {
    pub state: AppState,
    pub runner: EffectRunner,
    pub bridge: EventBridge,
    pub msg_tx: mpsc::Sender<Msg>,
    pub msg_rx: mpsc::Receiver<Msg>,
}

pub(crate) fn build() -> anyhow::Result<Services> {
    let config_path = config::config_path();
    let (config, problem) = config::load_or_default(&config_path);
    logging::initialize(config.log_destination, config.log_level());
    let store = ConfigStore::new(config_path, problem.as_ref());
    match problem {
        Some(err) => shell_warn!("Using default settings: {}", err),
        None => shell_info!("Settings from {:?}", store.path()),
    }

    let engine = start_engine(&config)?;
    let (msg_tx, msg_rx) = mpsc::channel();

    let mut bridge = EventBridge::new(engine.events().clone(), msg_tx.clone());
    bridge.attach();

    let interrupt_tx = msg_tx.clone();
    engine.on_interrupt(move || {
        let _ = interrupt_tx.send(Msg::CloseRequested);
    });

    let state = AppState::with_preferences(config.preferences());
    let runner = EffectRunner::new(engine, msg_tx.clone(), config, store);

    Ok(Services {
        state,
        runner,
        bridge,
        msg_tx,
        msg_rx,
    })
}

fn start_engine(config: &ShellConfig) -> anyhow::Result<EngineHandle> {
    let settings = config.engine_settings();
    shell_info!("Starting engine {:?} {:?}", settings.program, settings.args);
    EngineHandle::start(&settings).context("could not start the compression engine")
}
