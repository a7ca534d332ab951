use std::sync::{Arc, Mutex};
use std::time::Duration;

use browser_core::{RiskList, SecurityLevel, Tab};
use browser_engine::{
    EngineConfig, EngineEvent, EngineHandle, KeyValueStore, MemoryStore, SessionError,
    SessionOpener, ACTIVE_TAB_KEY, TABS_KEY,
};
use pretty_assertions::assert_eq;

const WAIT: Duration = Duration::from_secs(5);

fn tab(id: u64) -> Tab {
    Tab {
        id,
        url: format!("https://site{id}.example/"),
        title: format!("Site {id}"),
    }
}

fn engine_with(store: &MemoryStore) -> EngineHandle {
    browser_logging::initialize_for_tests();
    EngineHandle::new(EngineConfig::new(Arc::new(store.clone())))
}

#[tokio::test]
async fn load_reports_persisted_layout() {
    let store = MemoryStore::new();
    store
        .set(TABS_KEY, r#"[{"id":4,"url":"https://site4.example/","title":"Site 4"}]"#)
        .await
        .unwrap();
    store.set(ACTIVE_TAB_KEY, "4").await.unwrap();

    let engine = engine_with(&store);
    engine.load();
    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::Loaded {
            tabs: vec![tab(4)],
            active_id: Some(4),
        })
    );
}

#[test]
fn writes_land_in_submission_order() {
    let store = MemoryStore::new();
    let engine = engine_with(&store);

    engine.persist_tabs(&[tab(1)]);
    engine.persist_tabs(&[tab(1), tab(2)]);
    engine.persist_active(1);
    engine.persist_active(2);
    assert!(engine.flush(WAIT));

    assert_eq!(store.snapshot(ACTIVE_TAB_KEY).as_deref(), Some("2"));
    let tabs = store.snapshot(TABS_KEY).unwrap();
    assert!(tabs.contains("site2.example"));
}

#[test]
fn load_after_write_sees_the_write() {
    let store = MemoryStore::new();
    let engine = engine_with(&store);

    engine.persist_tabs(&[tab(9)]);
    engine.persist_active(9);
    engine.load();
    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::Loaded {
            tabs: vec![tab(9)],
            active_id: Some(9),
        })
    );
}

#[test]
fn classification_uses_the_risk_list() {
    browser_logging::initialize_for_tests();
    let mut risk = RiskList::new();
    risk.protect("uniswap.org").deny("drainer.example", "known drainer");
    let engine =
        EngineHandle::new(EngineConfig::new(Arc::new(MemoryStore::new())).with_risk_list(risk));

    engine.classify(3, "https://app.drainer.example/claim");
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::Classified {
            tab_id,
            url,
            assessment,
        }) => {
            assert_eq!(tab_id, 3);
            assert_eq!(url, "https://app.drainer.example/claim");
            assert_eq!(assessment.level, SecurityLevel::Danger);
            assert_eq!(assessment.description, "known drainer");
        }
        other => panic!("unexpected event {other:?}"),
    }

    engine.classify(4, "https://uniswap.org/");
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::Classified { assessment, .. }) => {
            assert_eq!(assessment.level, SecurityLevel::Whitelisted);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn timers_fire_with_their_ticket() {
    let engine = engine_with(&MemoryStore::new());
    engine.schedule(2, Duration::from_millis(40));
    engine.schedule(1, Duration::from_millis(5));

    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::TimerFired { ticket: 1 })
    );
    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::TimerFired { ticket: 2 })
    );
    assert_eq!(engine.try_recv(), None);
}

#[derive(Default)]
struct RecordingOpener {
    seen: Mutex<Vec<(String, Option<String>)>>,
}

#[async_trait::async_trait]
impl SessionOpener for RecordingOpener {
    async fn new_session(
        &self,
        uri: &str,
        redirect: Option<&str>,
        _autosign: Option<&str>,
    ) -> Result<(), SessionError> {
        self.seen
            .lock()
            .unwrap()
            .push((uri.to_string(), redirect.map(str::to_string)));
        if uri.contains("reject") {
            return Err(SessionError("bridge refused".to_string()));
        }
        Ok(())
    }
}

#[test]
fn sessions_go_to_the_opener() {
    browser_logging::initialize_for_tests();
    let opener = Arc::new(RecordingOpener::default());
    let engine = EngineHandle::new(
        EngineConfig::new(Arc::new(MemoryStore::new())).with_sessions(opener.clone()),
    );

    engine.open_session("wc:reject@1".to_string(), Some("myapp".to_string()), None);
    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::SessionFailed {
            reason: "session rejected: bridge refused".to_string(),
        })
    );
    assert_eq!(
        opener.seen.lock().unwrap().clone(),
        vec![("wc:reject@1".to_string(), Some("myapp".to_string()))]
    );
}
