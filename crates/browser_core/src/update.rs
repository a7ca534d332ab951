use browser_logging::{browser_debug, browser_info, browser_warn};

use crate::deeplink::{self, DeepLinkAction};
use crate::security::AdvisoryChoice;
use crate::state::BrowserPhase;
use crate::tab::{EdgeMove, Tab, TabCollection, TabId};
use crate::{BrowserState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: BrowserState, msg: Msg) -> (BrowserState, Vec<Effect>) {
    if state.phase == BrowserPhase::Loading {
        let effects = update_loading(&mut state, msg);
        return (state, effects);
    }

    let effects = match msg {
        Msg::Started | Msg::PersistedLoaded { .. } => {
            browser_debug!("browser already loaded; ignoring restore request");
            Vec::new()
        }
        Msg::SwitchTabRequested { .. }
        | Msg::SwipedLeft { .. }
        | Msg::SwipedRight { .. }
        | Msg::NewTabRequested { .. }
        | Msg::PageRequestedNewTab { .. }
            if state.gate.is_blocking() =>
        {
            browser_info!("ignoring tab change while a blocking advisory is open");
            Vec::new()
        }
        Msg::NewTabRequested { url, insert_right } => {
            open_tab(&mut state, url.as_deref(), insert_right)
        }
        Msg::PageRequestedNewTab { url } => open_tab(&mut state, url.as_deref(), true),
        Msg::CloseTabRequested { tab_id } => close_tab(&mut state, tab_id),
        Msg::CloseAllTabsRequested => close_all(&mut state),
        Msg::SwitchTabRequested { tab_id } => switch_tab(&mut state, tab_id),
        Msg::SwipedLeft { tab_id } => {
            let moved = state.tabs.switch_left(tab_id);
            edge_moved(&mut state, moved)
        }
        Msg::SwipedRight { tab_id } => {
            let moved = state.tabs.switch_right(tab_id);
            edge_moved(&mut state, moved)
        }
        Msg::NavigationCommitted { tab_id, url, title } => {
            navigation_committed(&mut state, tab_id, url, title.as_deref())
        }
        Msg::PagerScrolled { source, offset_px } => vec![state.nav.scrolled(source, offset_px)],
        Msg::PagerSettled { source, page } => {
            browser_debug!("pager {:?} settled on page {}", source, page);
            page_settled(&mut state, page)
        }
        Msg::AddressFocusChanged { focused } => {
            if !state.nav.focus_changed(focused) {
                return (state, Vec::new());
            }
            state.mark_dirty();
            if focused {
                state.nav.recompute(&state.tabs)
            } else {
                let platform = state.config.platform;
                let timings = state.config.timings;
                state.nav.after_layout_change(&state.tabs, platform, &timings)
            }
        }
        Msg::KeyboardShown { height } => {
            state.nav.keyboard_shown(height);
            state.mark_dirty();
            state.nav.recompute(&state.tabs)
        }
        Msg::KeyboardHidden => {
            if state.nav.keyboard_hidden() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SafeAreaMeasured { bottom } => {
            state.nav.set_safe_area_bottom(bottom);
            Vec::new()
        }
        Msg::ScreenBlurred => state.nav.recompute(&state.tabs),
        Msg::ReconcileTimerFired { ticket } => {
            let effects = state.nav.timer_fired(ticket, &state.tabs);
            if !effects.is_empty() {
                state.mark_dirty();
            }
            effects
        }
        Msg::DeepLinkReceived { uri } => dispatch_deep_link(&mut state, &uri),
        Msg::SecurityAssessed {
            tab_id,
            url,
            assessment,
        } => {
            let Some(tab) = state.tabs.get(tab_id) else {
                browser_debug!("dropping assessment for closed tab {}", tab_id);
                return (state, Vec::new());
            };
            if tab.url != url {
                browser_debug!("dropping assessment of a url tab {} has left", tab_id);
                return (state, Vec::new());
            }
            let active = tab_id == state.tabs.active_id();
            let level = assessment.level;
            let description = assessment.description.clone();
            if !state.gate.assess(tab_id, assessment, active) {
                return (state, Vec::new());
            }
            state.mark_dirty();
            vec![Effect::SecurityAssessed {
                tab_id,
                level,
                description,
            }]
        }
        Msg::ShieldTapped { tab_id } => {
            if state.tabs.contains(tab_id) && state.gate.present(tab_id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::AdvisoryDismissRequested => {
            if state.gate.dismiss() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::AdvisoryResolved { choice } => resolve_advisory(&mut state, choice),
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn update_loading(state: &mut BrowserState, msg: Msg) -> Vec<Effect> {
    match msg {
        Msg::Started => vec![Effect::LoadPersisted],
        Msg::PersistedLoaded { tabs, active_id } => restore(state, tabs, active_id),
        Msg::DeepLinkReceived { uri } => {
            browser_info!("holding deep link until tabs are loaded");
            state.pending_deep_link = Some(uri);
            Vec::new()
        }
        Msg::SafeAreaMeasured { bottom } => {
            state.nav.set_safe_area_bottom(bottom);
            Vec::new()
        }
        other => {
            browser_debug!("ignoring {:?} while loading", other);
            Vec::new()
        }
    }
}

fn restore(state: &mut BrowserState, records: Vec<Tab>, stored_active: Option<TabId>) -> Vec<Effect> {
    let restored = records.len();
    let record_ids: Vec<TabId> = records.iter().map(|tab| tab.id).collect();
    state.tabs = TabCollection::restore(state.config.home_url.clone(), records, stored_active);
    let renumbered = state
        .tabs
        .tabs()
        .iter()
        .any(|tab| !record_ids.contains(&tab.id));
    state.phase = BrowserPhase::Ready;
    state.mark_dirty();
    browser_info!(
        "restored {} tabs, active tab {}",
        state.tabs.len(),
        state.tabs.active_id()
    );

    let threshold = state.config.retention_threshold;
    let mut effects = Vec::new();
    if restored == 0 {
        effects.push(persist_tabs(state));
        effects.push(persist_active(state));
        effects.extend(state.nav.reset(&state.tabs));
    } else if state.tabs.len() > threshold {
        let retained = state.tabs.retained_window(threshold);
        browser_info!(
            "pruning persisted tabs from {} to {}",
            state.tabs.len(),
            retained.len()
        );
        effects.push(Effect::PersistTabs { tabs: retained });
        effects.push(persist_active(state));
        effects.extend(state.nav.reset(&state.tabs));
        effects.push(state.nav.schedule(state.config.timings.launch_prune_settle));
    } else {
        if renumbered {
            effects.push(persist_tabs(state));
        }
        if stored_active != Some(state.tabs.active_id()) {
            effects.push(persist_active(state));
        }
        effects.extend(state.nav.reset(&state.tabs));
    }
    effects.push(tabs_changed(state));

    if let Some(uri) = state.pending_deep_link.take() {
        effects.extend(dispatch_deep_link(state, &uri));
    }
    effects
}

fn open_tab(state: &mut BrowserState, url: Option<&str>, insert_right: bool) -> Vec<Effect> {
    let tab = state.tabs.create_tab(url, insert_right);
    browser_info!(
        "opened tab {} at index {:?} (total: {})",
        tab.id,
        state.tabs.index_of(tab.id),
        state.tabs.len()
    );
    tab_created(state)
}

fn tab_created(state: &mut BrowserState) -> Vec<Effect> {
    state.mark_dirty();
    let mut effects = vec![persist_tabs(state), persist_active(state), tabs_changed(state)];
    let platform = state.config.platform;
    let timings = state.config.timings;
    effects.extend(state.nav.after_tab_created(platform, &timings));
    effects
}

fn close_tab(state: &mut BrowserState, tab_id: TabId) -> Vec<Effect> {
    let Some(closed) = state.tabs.close_tab(tab_id) else {
        browser_debug!("close requested for unknown tab {}", tab_id);
        return Vec::new();
    };
    browser_info!(
        "closed tab {} (replacement: {:?}, total: {})",
        closed.closed.id,
        closed.replacement,
        state.tabs.len()
    );
    state.gate.forget(tab_id);
    state.mark_dirty();

    let mut effects = vec![persist_tabs(state), persist_active(state), tabs_changed(state)];
    let platform = state.config.platform;
    let timings = state.config.timings;
    effects.extend(state.nav.after_layout_change(&state.tabs, platform, &timings));
    state.gate.tab_activated(state.tabs.active_id());
    effects
}

fn close_all(state: &mut BrowserState) -> Vec<Effect> {
    state.tabs.close_all();
    state.gate.clear();
    state.mark_dirty();
    let mut effects = vec![persist_tabs(state), persist_active(state), tabs_changed(state)];
    effects.extend(state.nav.recompute(&state.tabs));
    effects
}

fn switch_tab(state: &mut BrowserState, tab_id: TabId) -> Vec<Effect> {
    if !state.tabs.switch_to(tab_id) {
        return Vec::new();
    }
    state.mark_dirty();
    let mut effects = vec![persist_active(state), tabs_changed(state)];
    effects.extend(state.nav.recompute(&state.tabs));
    state.gate.tab_activated(tab_id);
    effects
}

fn edge_moved(state: &mut BrowserState, moved: Option<EdgeMove>) -> Vec<Effect> {
    match moved {
        None => Vec::new(),
        Some(EdgeMove::Created(tab)) => {
            browser_info!("edge gesture created tab {}", tab.id);
            tab_created(state)
        }
        Some(EdgeMove::Switched(tab_id)) => {
            state.mark_dirty();
            let mut effects = vec![persist_active(state), tabs_changed(state)];
            effects.extend(state.nav.recompute(&state.tabs));
            let platform = state.config.platform;
            let timings = state.config.timings;
            effects.extend(state.nav.after_layout_change(&state.tabs, platform, &timings));
            state.gate.tab_activated(tab_id);
            effects
        }
    }
}

fn navigation_committed(
    state: &mut BrowserState,
    tab_id: TabId,
    url: String,
    title: Option<&str>,
) -> Vec<Effect> {
    if !state.tabs.contains(tab_id) {
        return Vec::new();
    }
    let mut effects = Vec::new();
    if state.tabs.update_tab(tab_id, &url, title) {
        state.mark_dirty();
        effects.push(persist_tabs(state));
        effects.push(tabs_changed(state));
    }
    effects.push(Effect::Classify { tab_id, url });
    effects
}

fn page_settled(state: &mut BrowserState, page: usize) -> Vec<Effect> {
    if state.gate.is_blocking() {
        browser_debug!("blocking advisory open; pager snaps back from {}", page);
        return state.nav.page_refused(page, &state.tabs);
    }
    if !state.nav.page_settled(page, &state.tabs) {
        return state.nav.recompute(&state.tabs);
    }
    let tab_id = state.tabs.tabs()[page].id;
    let mut effects = Vec::new();
    if state.tabs.switch_to(tab_id) {
        state.mark_dirty();
        effects.push(persist_active(state));
        effects.push(tabs_changed(state));
        state.gate.tab_activated(tab_id);
    }
    if state.config.platform == crate::Platform::Android && !state.nav.tab_creating() {
        effects.push(state.nav.schedule(state.config.timings.idle_resync));
    }
    effects
}

fn resolve_advisory(state: &mut BrowserState, choice: AdvisoryChoice) -> Vec<Effect> {
    let was_open = state.gate.open_advisory().is_some();
    let to_close = state.gate.resolve(choice);
    if was_open && state.gate.open_advisory().is_none() {
        state.mark_dirty();
    }
    match to_close {
        Some(tab_id) => close_tab(state, tab_id),
        None => Vec::new(),
    }
}

fn dispatch_deep_link(state: &mut BrowserState, uri: &str) -> Vec<Effect> {
    let mut handled = false;
    let action = deeplink::parse(uri, &state.config.deep_links, || handled = true);

    let mut effects = Vec::new();
    if handled {
        effects.push(Effect::DeepLinkHandled);
    }
    match action {
        DeepLinkAction::OpenSession {
            uri,
            redirect,
            autosign,
        } => {
            browser_info!("deep link opens a session");
            effects.push(Effect::OpenSession {
                uri,
                redirect,
                autosign,
            });
        }
        DeepLinkAction::NavigateBrowser { url } if state.gate.is_blocking() => {
            browser_warn!(
                "blocking advisory open; not opening deep link ({} chars)",
                url.len()
            );
        }
        DeepLinkAction::NavigateBrowser { url } => {
            effects.extend(open_tab(state, Some(&url), true));
        }
        DeepLinkAction::NotHandled => {
            browser_debug!("deep link not handled");
        }
    }
    effects
}

fn persist_tabs(state: &BrowserState) -> Effect {
    Effect::PersistTabs {
        tabs: state.tabs.tabs().to_vec(),
    }
}

fn persist_active(state: &BrowserState) -> Effect {
    Effect::PersistActiveTab {
        tab_id: state.tabs.active_id(),
    }
}

fn tabs_changed(state: &BrowserState) -> Effect {
    Effect::TabsChanged {
        tabs: state.tabs.tabs().to_vec(),
        active_id: state.tabs.active_id(),
    }
}
