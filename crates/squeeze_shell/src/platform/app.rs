use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use shell_logging::{shell_info, shell_warn};
use squeeze_core::{update, AppState, Msg};

use super::bootstrap::{self, Services};
use super::effects::{EffectRunner, Flow};
use super::ui::input::{parse_line, Input, HELP};
use super::ui::render;

const TICK_INTERVAL: Duration = Duration::from_millis(200);

pub fn run_app() -> anyhow::Result<()> {
    let Services {
        state,
        mut runner,
        mut bridge,
        msg_tx,
        msg_rx,
    } = bootstrap::build()?;

    spawn_console_reader(msg_tx.clone());
    // Background tick to throttle rendering.
    let tick_tx = msg_tx.clone();
    thread::spawn(move || {
        while tick_tx.send(Msg::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });
    let _ = msg_tx.send(Msg::PageRequested(1));
    drop(msg_tx);

    print_out(&render::render(&state.view()));
    run_loop(state, &mut runner, &msg_rx);

    bridge.dispose();
    runner.shutdown();
    shell_info!("Shut down");
    Ok(())
}

/// Applies messages one at a time until an effect ends the app.
fn run_loop(mut state: AppState, runner: &mut EffectRunner, msg_rx: &mpsc::Receiver<Msg>) {
    while let Ok(msg) = msg_rx.recv() {
        let render_now = matches!(msg, Msg::Tick);
        let (next, effects) = update(state, msg);
        state = next;

        for notification in state.take_notifications() {
            print_out(&format!("{}\n", render::notification(&notification)));
        }
        if runner.run(effects) == Flow::Exit {
            break;
        }
        if render_now && state.consume_dirty() {
            print_out(&render::render(&state.view()));
        }
    }
}

fn spawn_console_reader(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    shell_warn!("Console input failed: {}", err);
                    break;
                }
            };
            match parse_line(&line) {
                Ok(Input::Message(msg)) => {
                    if msg_tx.send(msg).is_err() {
                        return;
                    }
                }
                Ok(Input::Help) => print_out(&format!("{HELP}\n")),
                Ok(Input::Empty) => {}
                Err(err) => print_out(&format!("{err}\n")),
            }
        }
        // End of input behaves like quit.
        let _ = msg_tx.send(Msg::CloseRequested);
    });
}

fn print_out(text: &str) {
    let mut stdout = io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}
