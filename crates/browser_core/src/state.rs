use crate::config::BrowserConfig;
use crate::nav::NavigationSynchronizer;
use crate::security::SecurityGate;
use crate::tab::TabCollection;
use crate::view_model::BrowserViewModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserPhase {
    /// Persisted tabs have not been read yet; nothing is rendered.
    #[default]
    Loading,
    Ready,
}

/// The whole browser session, owned by the update loop.
///
/// `tabs` is only mutated through [`TabCollection`] operations called from
/// `update`; every other component reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserState {
    pub(crate) config: BrowserConfig,
    pub(crate) phase: BrowserPhase,
    pub(crate) tabs: TabCollection,
    pub(crate) nav: NavigationSynchronizer,
    pub(crate) gate: SecurityGate,
    pub(crate) pending_deep_link: Option<String>,
    dirty: bool,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self::new(BrowserConfig::default())
    }
}

impl BrowserState {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            tabs: TabCollection::new(config.home_url.clone()),
            gate: SecurityGate::new(config.risk_disclosure_url.clone()),
            nav: NavigationSynchronizer::new(),
            phase: BrowserPhase::Loading,
            pending_deep_link: None,
            dirty: false,
            config,
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn phase(&self) -> BrowserPhase {
        self.phase
    }

    pub fn tabs(&self) -> &TabCollection {
        &self.tabs
    }

    pub fn nav(&self) -> &NavigationSynchronizer {
        &self.nav
    }

    pub fn gate(&self) -> &SecurityGate {
        &self.gate
    }

    pub fn pending_deep_link(&self) -> Option<&str> {
        self.pending_deep_link.as_deref()
    }

    pub fn view(&self) -> BrowserViewModel {
        BrowserViewModel::from_state(self)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
