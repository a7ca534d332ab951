use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use browser_core::{BrowserObserver, Effect, Msg, SecurityLevel, Tab, TabId};
use browser_engine::{EngineEvent, EngineHandle};
use browser_logging::{browser_debug, browser_info, browser_warn};

use super::app::AppEvent;
use super::render::level_name;

/// Prints rendering-layer notifications to stdout.
#[derive(Debug, Default)]
pub(crate) struct ConsoleObserver;

impl BrowserObserver for ConsoleObserver {
    fn on_tabs_changed(&mut self, tabs: &[Tab], active_id: TabId) {
        println!("tabs changed: {} open, active {}", tabs.len(), active_id);
    }

    fn on_security_assessed(&mut self, level: SecurityLevel, description: &str) {
        println!("security: {} {}", level_name(level), description);
    }

    fn on_deep_link_handled(&mut self) {
        println!("deep link handled");
    }
}

pub(crate) struct EffectRunner {
    engine: EngineHandle,
    observer: ConsoleObserver,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let runner = Self {
            engine,
            observer: ConsoleObserver,
        };
        runner.spawn_event_loop(event_tx);
        runner
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            if effect.notify(&mut self.observer) {
                continue;
            }
            match effect {
                Effect::LoadPersisted => self.engine.load(),
                Effect::PersistTabs { tabs } => {
                    browser_debug!("PersistTabs count={}", tabs.len());
                    self.engine.persist_tabs(&tabs);
                }
                Effect::PersistActiveTab { tab_id } => self.engine.persist_active(tab_id),
                Effect::Classify { tab_id, url } => {
                    browser_info!("Classify tab_id={} url_len={}", tab_id, url.len());
                    self.engine.classify(tab_id, url);
                }
                Effect::ScheduleReconcile { ticket, delay } => {
                    self.engine.schedule(ticket, delay);
                }
                Effect::GotoPage {
                    pager,
                    index,
                    animated,
                } => {
                    browser_debug!("GotoPage {:?} index={} animated={}", pager, index, animated);
                }
                Effect::MirrorScroll { pager, offset_px } => {
                    browser_debug!("MirrorScroll {:?} offset={}", pager, offset_px);
                }
                Effect::OpenSession {
                    uri,
                    redirect,
                    autosign,
                } => self.engine.open_session(uri, redirect, autosign),
                Effect::TabsChanged { .. }
                | Effect::SecurityAssessed { .. }
                | Effect::DeepLinkHandled => {}
            }
        }
    }

    fn spawn_event_loop(&self, event_tx: mpsc::Sender<AppEvent>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            let Some(event) = engine.try_recv() else {
                thread::sleep(Duration::from_millis(20));
                continue;
            };
            let msg = match event {
                EngineEvent::Loaded { tabs, active_id } => Msg::PersistedLoaded { tabs, active_id },
                EngineEvent::Classified {
                    tab_id,
                    url,
                    assessment,
                } => Msg::SecurityAssessed {
                    tab_id,
                    url,
                    assessment,
                },
                EngineEvent::TimerFired { ticket } => Msg::ReconcileTimerFired { ticket },
                EngineEvent::SessionFailed { reason } => {
                    browser_warn!("Session could not be opened: {}", reason);
                    continue;
                }
            };
            if event_tx.send(AppEvent::Msg(msg)).is_err() {
                break;
            }
        });
    }
}
