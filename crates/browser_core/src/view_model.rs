use crate::security::{Presentation, SecurityLevel};
use crate::state::{BrowserPhase, BrowserState};
use crate::tab::TabId;

/// What an address bar offers when swiped past its edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeTarget {
    NewTab,
    Tab { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub active: bool,
    pub left: EdgeTarget,
    pub right: EdgeTarget,
    pub security_level: Option<SecurityLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryView {
    pub tab_id: TabId,
    pub level: SecurityLevel,
    pub description: String,
    pub presentation: Presentation,
    pub dismissible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrowserViewModel {
    /// Nothing is rendered until persisted tabs are loaded.
    pub ready: bool,
    pub tabs: Vec<TabView>,
    pub active_id: Option<TabId>,
    pub current_index: usize,
    pub suggest_page_visible: bool,
    /// The address-bar pager does not page while its input is focused.
    pub address_pager_locked: bool,
    pub keyboard_inset: u32,
    pub advisory: Option<AdvisoryView>,
}

impl BrowserViewModel {
    pub(crate) fn from_state(state: &BrowserState) -> Self {
        if state.phase() == BrowserPhase::Loading {
            return Self::default();
        }

        let tabs = state.tabs().tabs();
        let active_id = state.tabs().active_id();
        let edge = |index: Option<usize>| match index.and_then(|i| tabs.get(i)) {
            Some(tab) => EdgeTarget::Tab {
                url: tab.url.clone(),
            },
            None => EdgeTarget::NewTab,
        };

        let tab_views = tabs
            .iter()
            .enumerate()
            .map(|(index, tab)| TabView {
                id: tab.id,
                url: tab.url.clone(),
                title: tab.title.clone(),
                active: tab.id == active_id,
                left: edge(index.checked_sub(1)),
                right: edge(Some(index + 1)),
                security_level: state.gate().assessment(tab.id).map(|a| a.level),
            })
            .collect();

        let advisory = state.gate().open_advisory().map(|advisory| AdvisoryView {
            tab_id: advisory.tab_id,
            level: advisory.assessment.level,
            description: advisory.assessment.description.clone(),
            dismissible: advisory.presentation.is_dismissible(),
            presentation: advisory.presentation.clone(),
        });

        let focused = state.nav().address_focused();
        Self {
            ready: true,
            tabs: tab_views,
            active_id: Some(active_id),
            current_index: state.nav().current_index(),
            suggest_page_visible: focused,
            address_pager_locked: focused,
            keyboard_inset: state.nav().keyboard_inset(),
            advisory,
        }
    }
}
