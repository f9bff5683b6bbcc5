use std::sync::mpsc;

use shell_logging::{shell_debug, shell_info};
use squeeze_core::{Effect, JobCommand, Msg, PostJobAction, StructuralRequest};
use squeeze_engine::{CommandReply, CommandResult, EngineCommand, EngineHandle};

use super::config::ShellConfig;
use super::convert::{column_to_wire, direction_to_wire, post_action_to_wire, snapshot_from};
use super::persistence::ConfigStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Exit,
}

/// Executes core effects against the engine and feeds outcomes back as
/// messages.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
    config: ShellConfig,
    store: ConfigStore,
}

impl EffectRunner {
    pub(crate) fn new(
        engine: EngineHandle,
        msg_tx: mpsc::Sender<Msg>,
        config: ShellConfig,
        store: ConfigStore,
    ) -> Self {
        Self {
            engine,
            msg_tx,
            config,
            store,
        }
    }

    /// Runs effects in order. Stops at the first one that ends the app.
    pub(crate) fn run(&mut self, effects: Vec<Effect>) -> Flow {
        for effect in effects {
            if self.apply(effect) == Flow::Exit {
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    fn apply(&mut self, effect: Effect) -> Flow {
        shell_debug!("Effect {:?}", effect);
        match effect {
            Effect::List { request, command } => {
                let engine_command = list_command(command);
                self.execute(engine_command, move |result| Msg::ListResponse {
                    request,
                    result: match result {
                        Ok(CommandReply::List(list)) => Ok(snapshot_from(list)),
                        Ok(CommandReply::Done) => Err("engine returned no list".to_string()),
                        Err(err) => Err(err.to_string()),
                    },
                });
            }
            Effect::ImportPaths { paths, recursive } => {
                self.execute_reporting(EngineCommand::ImportPaths { paths, recursive }, "import");
            }
            Effect::Compress {
                threads,
                base_folder,
            } => {
                let command = EngineCommand::Compress {
                    options: self.config.compression_payload(),
                    threads,
                    base_folder,
                };
                self.execute_job(command, JobCommand::Start);
            }
            Effect::PauseCompression => {
                self.execute_job(EngineCommand::PauseCompression, JobCommand::Pause);
            }
            Effect::ResumeCompression => {
                self.execute_job(EngineCommand::ResumeCompression, JobCommand::Resume);
            }
            Effect::CancelCompression => {
                self.execute_job(EngineCommand::CancelCompression, JobCommand::Cancel);
            }
            Effect::Preview { ids, threads } => {
                let command = EngineCommand::Preview {
                    ids: ids.clone(),
                    options: self.config.compression_payload(),
                    threads,
                };
                self.execute_failure(command, move |message| Msg::PreviewFailed { ids, message });
            }
            Effect::RunPostJobAction(action) => return self.post_job_action(action),
            Effect::SavePreferences(preferences) => {
                self.config.apply_preferences(&preferences);
                self.store.persist(&self.config);
            }
            Effect::Exit => return Flow::Exit,
        }
        Flow::Continue
    }

    fn post_job_action(&mut self, action: PostJobAction) -> Flow {
        if action == PostJobAction::CloseApp {
            shell_info!("Closing after finished compression");
            return Flow::Exit;
        }
        let Some(wire) = post_action_to_wire(action) else {
            return Flow::Continue;
        };
        let payload = match action {
            PostJobAction::OpenOutputFolder => self.config.output_folder.clone(),
            _ => None,
        };
        self.execute_reporting(
            EngineCommand::PostCompressionAction {
                action: wire,
                payload,
            },
            "post-compression action",
        );
        Flow::Continue
    }

    /// Runs `command`, turning every outcome into a message.
    fn execute<F>(&self, command: EngineCommand, to_msg: F)
    where
        F: FnOnce(CommandResult) -> Msg + Send + 'static,
    {
        let msg_tx = self.msg_tx.clone();
        self.engine.execute(command, move |result| {
            let _ = msg_tx.send(to_msg(result));
        });
    }

    /// Runs `command`; only a failure produces a message.
    fn execute_failure<F>(&self, command: EngineCommand, on_failure: F)
    where
        F: FnOnce(String) -> Msg + Send + 'static,
    {
        let msg_tx = self.msg_tx.clone();
        self.engine.execute(command, move |result| {
            if let Err(err) = result {
                let _ = msg_tx.send(on_failure(err.to_string()));
            }
        });
    }

    fn execute_job(&self, command: EngineCommand, job: JobCommand) {
        self.execute_failure(command, move |message| Msg::JobCommandFailed {
            command: job,
            message,
        });
    }

    fn execute_reporting(&self, command: EngineCommand, label: &'static str) {
        self.execute_failure(command, move |message| Msg::CommandFailed {
            command: label.to_string(),
            message,
        });
    }

    pub(crate) fn shutdown(self) {
        self.engine.shutdown();
    }
}

fn list_command(request: StructuralRequest) -> EngineCommand {
    match request {
        StructuralRequest::ChangePage { page } => EngineCommand::ChangePage { page },
        StructuralRequest::Filter(query) => EngineCommand::FilterList { query: query.text },
        StructuralRequest::Sort(spec) => EngineCommand::SortList {
            column: column_to_wire(spec.column),
            order: direction_to_wire(spec.direction),
        },
        StructuralRequest::Remove { ids } => EngineCommand::RemoveItems { keys: ids },
        StructuralRequest::Clear => EngineCommand::ClearList,
    }
}
