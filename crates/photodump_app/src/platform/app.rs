use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use photodump_core::{update, AppState, Msg};
use photodump_engine::EngineHandle;
use photodump_logging::{pd_info, pd_warn, set_current_job};

use super::commands::{Command, HELP};
use super::effects::{spawn_event_forwarder, EffectRunner, Flow};
use super::logging;
use super::settings::{Cli, ClientConfig};
use super::ui::render::{render_details, render_summary, TerminalSink};

/// Everything the main loop reacts to.
pub enum AppInput {
    Core(Msg),
    ShowStatus,
    ShowHelp,
    Invalid(String),
}

pub fn run_app(cli: Cli) -> Result<()> {
    let config = ClientConfig::resolve(&cli)?;
    logging::initialize(config.log_destination);
    pd_info!("Starting photodump client against {}", config.server_url);

    let (engine, events) = EngineHandle::new(config.api_settings(), config.reconnect_policy())
        .context("failed to start engine")?;

    let (input_tx, input_rx) = mpsc::channel::<AppInput>();
    spawn_event_forwarder(events, input_tx.clone());
    spawn_stdin_reader(input_tx.clone());

    let mut runner = EffectRunner::new(engine, TerminalSink::new(io::stdout()));
    runner.sink_mut().print_lines(["photodump ready, type 'help' for commands"]);

    let mut state = AppState::new();
    let mut last_summary = String::new();
    let mut next = Some(AppInput::Core(Msg::SessionStarted));

    while let Some(input) = next.take().or_else(|| input_rx.recv().ok()) {
        let msg = match input {
            AppInput::Core(msg) => msg,
            AppInput::ShowStatus => {
                runner.sink_mut().print_lines(render_details(&state.view()));
                continue;
            }
            AppInput::ShowHelp => {
                runner.sink_mut().print_lines(HELP.lines());
                continue;
            }
            AppInput::Invalid(reason) => {
                runner.sink_mut().print_lines([format!("?? {reason}")]);
                continue;
            }
        };

        let (new_state, effects) = update(state, msg);
        state = new_state;
        set_current_job(state.active_job().unwrap_or(0));

        if runner.run(effects) == Flow::Exit {
            break;
        }
        if state.consume_dirty() {
            let summary = render_summary(&state.view());
            if summary != last_summary {
                runner.sink_mut().print_lines([summary.as_str()]);
                last_summary = summary;
            }
        }
    }

    pd_info!("Shutting down");
    runner.shutdown();
    Ok(())
}

/// Read commands from stdin. End of input leaves, bypassing the quit guard.
fn spawn_stdin_reader(inbox: mpsc::Sender<AppInput>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    pd_warn!("stdin read failed: {}", err);
                    break;
                }
            };
            let input = match Command::parse(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Status)) => AppInput::ShowStatus,
                Ok(Some(Command::Help)) => AppInput::ShowHelp,
                Ok(Some(command)) => match command.into_msg() {
                    Some(msg) => AppInput::Core(msg),
                    None => continue,
                },
                Err(err) => AppInput::Invalid(err.to_string()),
            };
            if inbox.send(input).is_err() {
                return;
            }
        }
        let _ = inbox.send(AppInput::Core(Msg::QuitRequested));
        let _ = inbox.send(AppInput::Core(Msg::QuitConfirmed));
    });
}
