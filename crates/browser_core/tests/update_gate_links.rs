use std::sync::Once;

use browser_core::{
    update, AdvisoryChoice, BrowserObserver, BrowserState, Effect, Msg, Pager,
    SecurityAssessment, SecurityLevel, Tab, TabId,
};
use pretty_assertions::assert_eq;
use url::form_urlencoded;

const SESSION: &str = "wc:abc@1?bridge=https%3A%2F%2Fb.example&key=deadbeef&redirect=myapp";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(browser_logging::initialize_for_tests);
}

fn ready(ids: &[TabId], active: TabId) -> BrowserState {
    let (state, _) = update(BrowserState::default(), Msg::Started);
    let tabs = ids
        .iter()
        .map(|&id| Tab {
            id,
            url: site(id),
            title: String::new(),
        })
        .collect();
    let (state, _) = update(
        state,
        Msg::PersistedLoaded {
            tabs,
            active_id: Some(active),
        },
    );
    state
}

fn site(id: TabId) -> String {
    format!("https://site{id}.example/")
}

fn assessed(tab_id: TabId, level: SecurityLevel, description: &str) -> Msg {
    assessed_url(tab_id, &site(tab_id), level, description)
}

fn assessed_url(tab_id: TabId, url: &str, level: SecurityLevel, description: &str) -> Msg {
    Msg::SecurityAssessed {
        tab_id,
        url: url.to_string(),
        assessment: SecurityAssessment {
            level,
            description: description.to_string(),
        },
    }
}

#[derive(Default)]
struct Recorder {
    tabs_changed: Vec<(usize, TabId)>,
    assessed: Vec<(SecurityLevel, String)>,
    handled: usize,
}

impl BrowserObserver for Recorder {
    fn on_tabs_changed(&mut self, tabs: &[Tab], active_id: TabId) {
        self.tabs_changed.push((tabs.len(), active_id));
    }

    fn on_security_assessed(&mut self, level: SecurityLevel, description: &str) {
        self.assessed.push((level, description.to_string()));
    }

    fn on_deep_link_handled(&mut self) {
        self.handled += 1;
    }
}

#[test]
fn session_link_notifies_before_opening_session() {
    init_logging();
    let state = ready(&[1], 1);
    let (state, effects) = update(
        state,
        Msg::DeepLinkReceived {
            uri: SESSION.to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::DeepLinkHandled,
            Effect::OpenSession {
                uri: SESSION.to_string(),
                redirect: Some("myapp".to_string()),
                autosign: None,
            },
        ]
    );
    // Sessions do not touch the tab collection.
    assert_eq!(state.tabs().len(), 1);
}

#[test]
fn wrapped_link_fires_handled_once() {
    init_logging();
    let state = ready(&[1], 1);
    let encoded: String = form_urlencoded::byte_serialize(SESSION.as_bytes()).collect();
    let (_, effects) = update(
        state,
        Msg::DeepLinkReceived {
            uri: format!("https://wallet.example/wc?uri={encoded}"),
        },
    );
    let mut recorder = Recorder::default();
    for effect in &effects {
        effect.notify(&mut recorder);
    }
    assert_eq!(recorder.handled, 1);
    assert!(matches!(effects[1], Effect::OpenSession { .. }));
}

#[test]
fn unhandled_link_emits_nothing() {
    init_logging();
    let state = ready(&[1], 1);
    let (_, effects) = update(
        state,
        Msg::DeepLinkReceived {
            uri: "ftp://nothing".to_string(),
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn browser_link_opens_tab_right_of_active() {
    init_logging();
    let state = ready(&[1, 2], 1);
    let (state, effects) = update(
        state,
        Msg::DeepLinkReceived {
            uri: "dapp://app.example/pool".to_string(),
        },
    );
    assert_eq!(effects[0], Effect::DeepLinkHandled);
    let active = state.tabs().active_tab().unwrap();
    assert_eq!(active.url, "https://app.example/pool");
    assert_eq!(state.tabs().active_index(), 1);
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::ScheduleReconcile { .. })));
}

#[test]
fn link_received_while_loading_is_dispatched_after_restore() {
    init_logging();
    let (state, _) = update(BrowserState::default(), Msg::Started);
    let (state, effects) = update(
        state,
        Msg::DeepLinkReceived {
            uri: "dapp://first.example/".to_string(),
        },
    );
    assert!(effects.is_empty());
    let (state, _) = update(
        state,
        Msg::DeepLinkReceived {
            uri: SESSION.to_string(),
        },
    );
    assert_eq!(state.pending_deep_link(), Some(SESSION));

    let (state, effects) = update(
        state,
        Msg::PersistedLoaded {
            tabs: Vec::new(),
            active_id: None,
        },
    );
    assert!(state.pending_deep_link().is_none());
    assert!(effects.contains(&Effect::DeepLinkHandled));
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::OpenSession { .. })));
}

#[test]
fn danger_on_active_tab_blocks_until_resolved() {
    init_logging();
    let state = ready(&[1, 2], 2);
    let (state, effects) = update(state, assessed(2, SecurityLevel::Danger, "drainer"));
    assert_eq!(
        effects,
        vec![Effect::SecurityAssessed {
            tab_id: 2,
            level: SecurityLevel::Danger,
            description: "drainer".to_string(),
        }]
    );
    let advisory = state.view().advisory.expect("advisory open");
    assert!(!advisory.dismissible);
    assert_eq!(advisory.level, SecurityLevel::Danger);

    let (state, effects) = update(state, assessed(2, SecurityLevel::Whitelisted, ""));
    assert!(effects.is_empty());
    assert_eq!(state.view().advisory.unwrap().level, SecurityLevel::Danger);

    let (state, _) = update(state, Msg::AdvisoryDismissRequested);
    assert!(state.view().advisory.is_some());

    let (state, _) = update(
        state,
        Msg::AdvisoryResolved {
            choice: AdvisoryChoice::ContinueAnyway,
        },
    );
    assert!(state.view().advisory.is_none());
    assert_eq!(state.tabs().len(), 2);
}

#[test]
fn close_tab_choice_closes_the_flagged_tab() {
    init_logging();
    let state = ready(&[1, 2], 2);
    let (state, _) = update(state, assessed(2, SecurityLevel::Warning, "look-alike"));
    let (state, effects) = update(
        state,
        Msg::AdvisoryResolved {
            choice: AdvisoryChoice::CloseTab,
        },
    );
    assert!(!state.tabs().contains(2));
    assert_eq!(state.tabs().active_id(), 1);
    assert!(state.view().advisory.is_none());
    assert!(effects.contains(&Effect::PersistActiveTab { tab_id: 1 }));
}

#[test]
fn shield_tap_shows_dismissible_advisory() {
    init_logging();
    let state = ready(&[1], 1);
    let (state, _) = update(state, assessed(1, SecurityLevel::Whitelisted, ""));
    assert!(state.view().advisory.is_none());
    assert_eq!(
        state.view().tabs[0].security_level,
        Some(SecurityLevel::Whitelisted)
    );

    let (state, _) = update(state, Msg::ShieldTapped { tab_id: 1 });
    let advisory = state.view().advisory.unwrap();
    assert!(advisory.dismissible);

    let (state, _) = update(state, Msg::AdvisoryDismissRequested);
    assert!(state.view().advisory.is_none());
}

#[test]
fn assessments_for_closed_tabs_are_dropped() {
    init_logging();
    let state = ready(&[1, 2], 2);
    let (state, _) = update(state, Msg::CloseTabRequested { tab_id: 1 });
    let (state, effects) = update(state, assessed(1, SecurityLevel::Danger, "drainer"));
    assert!(effects.is_empty());
    assert!(state.view().advisory.is_none());
}

#[test]
fn observer_receives_tab_and_security_notifications() {
    init_logging();
    let state = ready(&[1], 1);
    let mut recorder = Recorder::default();

    let (state, effects) = update(
        state,
        Msg::NewTabRequested {
            url: None,
            insert_right: false,
        },
    );
    let (_, more) = update(state, assessed(1, SecurityLevel::Danger, "drainer"));
    let delivered = effects
        .iter()
        .chain(more.iter())
        .filter(|effect| effect.notify(&mut recorder))
        .count();

    assert_eq!(delivered, 2);
    assert_eq!(recorder.tabs_changed, vec![(2, 2)]);
    assert_eq!(
        recorder.assessed,
        vec![(SecurityLevel::Danger, "drainer".to_string())]
    );
}

fn committed(tab_id: TabId, url: &str) -> Msg {
    Msg::NavigationCommitted {
        tab_id,
        url: url.to_string(),
        title: None,
    }
}

#[test]
fn late_result_for_a_left_url_is_dropped() {
    init_logging();
    let state = ready(&[1], 1);
    let (state, _) = update(state, committed(1, "https://drainer.example/"));
    let (state, _) = update(state, committed(1, "https://uniswap.org/"));

    let (state, effects) = update(
        state,
        assessed_url(1, "https://uniswap.org/", SecurityLevel::Whitelisted, ""),
    );
    assert_eq!(effects.len(), 1);

    let (state, effects) = update(
        state,
        assessed_url(1, "https://drainer.example/", SecurityLevel::Danger, "drainer"),
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.advisory.is_none());
    assert_eq!(view.tabs[0].url, "https://uniswap.org/");
    assert_eq!(view.tabs[0].security_level, Some(SecurityLevel::Whitelisted));
}

#[test]
fn blocking_advisory_pins_the_active_tab() {
    init_logging();
    let state = ready(&[1, 2, 3], 2);
    let (state, _) = update(state, assessed(2, SecurityLevel::Danger, "drainer"));

    let (state, effects) = update(state, Msg::SwitchTabRequested { tab_id: 1 });
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::SwipedLeft { tab_id: 2 });
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::NewTabRequested {
            url: None,
            insert_right: true,
        },
    );
    assert!(effects.is_empty());
    let (state, effects) = update(
        state,
        Msg::DeepLinkReceived {
            uri: "dapp://app.example/".to_string(),
        },
    );
    assert_eq!(effects, vec![Effect::DeepLinkHandled]);
    assert_eq!(state.tabs().len(), 3);
    assert_eq!(state.tabs().active_id(), 2);

    // A drag that lands elsewhere is undone.
    let (state, effects) = update(
        state,
        Msg::PagerSettled {
            source: Pager::Content,
            page: 0,
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::GotoPage {
                pager: Pager::AddressBar,
                index: 1,
                animated: true,
            },
            Effect::GotoPage {
                pager: Pager::Content,
                index: 1,
                animated: true,
            },
        ]
    );
    assert_eq!(state.tabs().active_id(), 2);

    let (state, _) = update(
        state,
        Msg::AdvisoryResolved {
            choice: AdvisoryChoice::ContinueAnyway,
        },
    );
    let (state, _) = update(state, Msg::SwitchTabRequested { tab_id: 1 });
    assert_eq!(state.tabs().active_id(), 1);
}
