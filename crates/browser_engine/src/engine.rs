use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use browser_core::{classify, RiskList, RiskRegistry, Tab, TabId, Whitelist};
use browser_logging::{browser_debug, browser_error, browser_info, browser_warn};
use tokio::sync::mpsc as async_mpsc;

use crate::layout::{encode_active, encode_tabs, load_layout, ACTIVE_TAB_KEY, TABS_KEY};
use crate::session::{LoggingSessionOpener, SessionOpener};
use crate::{EngineEvent, KeyValueStore};

/// Collaborators the engine executes effects against.
#[derive(Clone)]
pub struct EngineConfig {
    pub store: Arc<dyn KeyValueStore>,
    pub whitelist: Arc<dyn Whitelist>,
    pub registry: Arc<dyn RiskRegistry>,
    pub sessions: Arc<dyn SessionOpener>,
}

impl EngineConfig {
    /// Empty risk list and a logging session opener.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let risk = Arc::new(RiskList::new());
        Self {
            store,
            whitelist: risk.clone(),
            registry: risk,
            sessions: Arc::new(LoggingSessionOpener),
        }
    }

    pub fn with_risk_list(mut self, risk: RiskList) -> Self {
        let risk = Arc::new(risk);
        self.whitelist = risk.clone();
        self.registry = risk;
        self
    }

    pub fn with_sessions(mut self, sessions: Arc<dyn SessionOpener>) -> Self {
        self.sessions = sessions;
        self
    }
}

enum EngineCommand {
    Load,
    Store { key: &'static str, value: String },
    Flush { done: mpsc::Sender<()> },
    Classify { tab_id: TabId, url: String },
    Schedule { ticket: u64, delay: Duration },
    OpenSession {
        uri: String,
        redirect: Option<String>,
        autosign: Option<String>,
    },
}

/// Storage work runs strictly in submission order.
enum StorageJob {
    Load,
    Set { key: &'static str, value: String },
    Flush { done: mpsc::Sender<()> },
}

#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_time()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    browser_error!("engine: failed to start runtime: {}", err);
                    return;
                }
            };

            let (storage_tx, storage_rx) = async_mpsc::unbounded_channel();
            runtime.spawn(run_storage(config.store.clone(), storage_rx, event_tx.clone()));

            while let Ok(command) = cmd_rx.recv() {
                dispatch(&runtime, &config, &storage_tx, &event_tx, command);
            }
            browser_debug!("engine: command channel closed");
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Read the persisted layout; answered with [`EngineEvent::Loaded`].
    pub fn load(&self) {
        self.send(EngineCommand::Load);
    }

    pub fn persist_tabs(&self, tabs: &[Tab]) {
        match encode_tabs(tabs) {
            Ok(value) => self.send(EngineCommand::Store {
                key: TABS_KEY,
                value,
            }),
            Err(err) => browser_error!("engine: failed to encode tabs: {}", err),
        }
    }

    pub fn persist_active(&self, tab_id: TabId) {
        self.send(EngineCommand::Store {
            key: ACTIVE_TAB_KEY,
            value: encode_active(tab_id),
        });
    }

    pub fn classify(&self, tab_id: TabId, url: impl Into<String>) {
        self.send(EngineCommand::Classify {
            tab_id,
            url: url.into(),
        });
    }

    /// Answered with [`EngineEvent::TimerFired`] after `delay`.
    pub fn schedule(&self, ticket: u64, delay: Duration) {
        self.send(EngineCommand::Schedule { ticket, delay });
    }

    pub fn open_session(&self, uri: String, redirect: Option<String>, autosign: Option<String>) {
        self.send(EngineCommand::OpenSession {
            uri,
            redirect,
            autosign,
        });
    }

    /// Block until every storage write queued so far has finished.
    ///
    /// Returns `false` if that took longer than `timeout`.
    pub fn flush(&self, timeout: Duration) -> bool {
        let (done, finished) = mpsc::channel();
        self.send(EngineCommand::Flush { done });
        finished.recv_timeout(timeout).is_ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            browser_warn!("engine: not running, command dropped");
        }
    }
}

fn dispatch(
    runtime: &tokio::runtime::Runtime,
    config: &EngineConfig,
    storage_tx: &async_mpsc::UnboundedSender<StorageJob>,
    event_tx: &mpsc::Sender<EngineEvent>,
    command: EngineCommand,
) {
    let storage_job = match command {
        EngineCommand::Load => Some(StorageJob::Load),
        EngineCommand::Store { key, value } => Some(StorageJob::Set { key, value }),
        EngineCommand::Flush { done } => Some(StorageJob::Flush { done }),
        EngineCommand::Classify { tab_id, url } => {
            let whitelist = config.whitelist.clone();
            let registry = config.registry.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let assessment = classify(&url, whitelist.as_ref(), registry.as_ref());
                browser_debug!(
                    "engine: tab {} classified as {:?}",
                    tab_id,
                    assessment.level
                );
                let _ = event_tx.send(EngineEvent::Classified {
                    tab_id,
                    url,
                    assessment,
                });
            });
            None
        }
        EngineCommand::Schedule { ticket, delay } => {
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = event_tx.send(EngineEvent::TimerFired { ticket });
            });
            None
        }
        EngineCommand::OpenSession {
            uri,
            redirect,
            autosign,
        } => {
            let sessions = config.sessions.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let result = sessions
                    .new_session(&uri, redirect.as_deref(), autosign.as_deref())
                    .await;
                if let Err(err) = result {
                    browser_warn!("engine: {}", err);
                    let _ = event_tx.send(EngineEvent::SessionFailed {
                        reason: err.to_string(),
                    });
                }
            });
            None
        }
    };

    if let Some(job) = storage_job {
        if storage_tx.send(job).is_err() {
            browser_error!("engine: storage task stopped, job dropped");
        }
    }
}

async fn run_storage(
    store: Arc<dyn KeyValueStore>,
    mut jobs: async_mpsc::UnboundedReceiver<StorageJob>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    while let Some(job) = jobs.recv().await {
        match job {
            StorageJob::Load => {
                let layout = load_layout(store.as_ref()).await;
                let _ = event_tx.send(EngineEvent::Loaded {
                    tabs: layout.tabs,
                    active_id: layout.active_id,
                });
            }
            StorageJob::Set { key, value } => {
                // In-memory state stays authoritative; a failed write is skipped.
                if let Err(err) = store.set(key, &value).await {
                    browser_error!("engine: failed to persist {}: {}", key, err);
                }
            }
            StorageJob::Flush { done } => {
                let _ = done.send(());
            }
        }
    }
    browser_info!("engine: storage task finished");
}
