use std::io::{self, BufRead};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use browser_core::{update, BrowserState, Msg};
use browser_engine::{EngineConfig, EngineHandle, FileStore};
use browser_logging::{browser_debug, browser_info, browser_warn};

use super::commands::{parse_command, Command, HELP};
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::render::render;

const SHUTDOWN_FLUSH: Duration = Duration::from_secs(2);

/// Everything the update loop reacts to, serialized through one channel.
pub(crate) enum AppEvent {
    Msg(Msg),
    Line(String),
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    browser_logging::initialize(&config.log_settings());
    browser_info!("starting browser, data dir {:?}", config.data_dir);

    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let engine =
        EngineHandle::new(EngineConfig::new(store).with_risk_list(config.risk_list()));

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let mut runner = EffectRunner::new(engine, event_tx.clone());
    spawn_input_reader(event_tx.clone());

    let _ = event_tx.send(AppEvent::Msg(Msg::Started));
    // Links on the command line arrive like links from the OS.
    for uri in std::env::args().skip(1) {
        let _ = event_tx.send(AppEvent::Msg(Msg::DeepLinkReceived { uri }));
    }
    drop(event_tx);

    let mut state = BrowserState::new(config.browser_config());
    println!("{HELP}");
    while let Ok(event) = event_rx.recv() {
        let msg = match event {
            AppEvent::Msg(msg) => msg,
            AppEvent::Line(line) => match parse_command(&line, &state.view()) {
                Ok(Command::Send(msg)) => msg,
                Ok(Command::List) => {
                    print_view(&state);
                    continue;
                }
                Ok(Command::Help) => {
                    println!("{HELP}");
                    continue;
                }
                Ok(Command::Quit) => break,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            },
            AppEvent::InputClosed => break,
        };

        let (next, effects) = update(state, msg);
        state = next;
        runner.run(effects);
        if state.consume_dirty() {
            print_view(&state);
        }
    }

    if !runner.engine().flush(SHUTDOWN_FLUSH) {
        browser_warn!("pending writes did not finish before shutdown");
    }
    browser_info!("browser stopped");
    Ok(())
}

fn print_view(state: &BrowserState) {
    for line in render(&state.view()) {
        println!("{line}");
    }
}

fn spawn_input_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    browser_warn!("stdin read failed: {}", err);
                    break;
                }
            };
            if event_tx.send(AppEvent::Line(line)).is_err() {
                return;
            }
        }
        browser_debug!("stdin closed");
        let _ = event_tx.send(AppEvent::InputClosed);
    });
}
