use std::collections::BTreeMap;

use browser_logging::browser_debug;
use url::Url;

use crate::tab::TabId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SecurityLevel {
    Unknown = 0,
    Whitelisted = 1,
    Warning = 2,
    Danger = 3,
}

impl SecurityLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Warning and danger block browsing until the user decides.
    pub fn is_blocking(self) -> bool {
        matches!(self, SecurityLevel::Warning | SecurityLevel::Danger)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityAssessment {
    pub level: SecurityLevel,
    pub description: String,
}

impl SecurityAssessment {
    pub fn unknown() -> Self {
        Self {
            level: SecurityLevel::Unknown,
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// Heuristic match, e.g. a look-alike of a known domain.
    Warning,
    /// Known malicious host.
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskEntry {
    pub level: RiskLevel,
    pub description: String,
}

pub trait RiskRegistry: Send + Sync {
    fn lookup(&self, host: &str) -> Option<RiskEntry>;
}

pub trait Whitelist: Send + Sync {
    fn contains(&self, host: &str) -> bool;
}

/// Lowercased host of `url`, without a trailing dot.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Classify a navigation target.
///
/// A registry danger entry wins over whitelist membership; a registry
/// warning comes next, then the whitelist. Anything else is unknown.
pub fn classify(
    url: &str,
    whitelist: &dyn Whitelist,
    registry: &dyn RiskRegistry,
) -> SecurityAssessment {
    let Some(host) = host_of(url) else {
        return SecurityAssessment::unknown();
    };

    let entry = registry.lookup(&host);
    if let Some(RiskEntry {
        level: RiskLevel::Danger,
        description,
    }) = &entry
    {
        return SecurityAssessment {
            level: SecurityLevel::Danger,
            description: description.clone(),
        };
    }
    if let Some(RiskEntry {
        level: RiskLevel::Warning,
        description,
    }) = entry
    {
        return SecurityAssessment {
            level: SecurityLevel::Warning,
            description,
        };
    }
    if whitelist.contains(&host) {
        return SecurityAssessment {
            level: SecurityLevel::Whitelisted,
            description: String::new(),
        };
    }
    SecurityAssessment::unknown()
}

/// How an advisory is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// Cannot be dismissed; only [`AdvisoryChoice`] resolves it.
    Blocking,
    /// Dismissible notice for whitelisted sites.
    Confirmation,
    /// Dismissible notice for unclassified sites.
    Explanation { disclosure_url: String },
}

impl Presentation {
    pub fn is_dismissible(&self) -> bool {
        !matches!(self, Presentation::Blocking)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub tab_id: TabId,
    pub assessment: SecurityAssessment,
    pub presentation: Presentation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryChoice {
    CloseTab,
    ContinueAnyway,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GateEntry {
    assessment: SecurityAssessment,
    acknowledged: bool,
}

/// Per-tab assessments plus the single advisory currently open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecurityGate {
    entries: BTreeMap<TabId, GateEntry>,
    open: Option<Advisory>,
    disclosure_url: String,
}

impl SecurityGate {
    pub fn new(disclosure_url: impl Into<String>) -> Self {
        Self {
            entries: BTreeMap::new(),
            open: None,
            disclosure_url: disclosure_url.into(),
        }
    }

    pub fn open_advisory(&self) -> Option<&Advisory> {
        self.open.as_ref()
    }

    /// A blocking advisory is open; the active tab must not change until
    /// it is resolved.
    pub fn is_blocking(&self) -> bool {
        self.blocking_open()
    }

    pub fn assessment(&self, tab_id: TabId) -> Option<&SecurityAssessment> {
        self.entries.get(&tab_id).map(|entry| &entry.assessment)
    }

    fn blocking_open_for(&self, tab_id: TabId) -> bool {
        self.open.as_ref().is_some_and(|advisory| {
            advisory.tab_id == tab_id && !advisory.presentation.is_dismissible()
        })
    }

    fn blocking_open(&self) -> bool {
        self.open
            .as_ref()
            .is_some_and(|advisory| !advisory.presentation.is_dismissible())
    }

    fn presentation_for(&self, level: SecurityLevel) -> Presentation {
        match level {
            SecurityLevel::Warning | SecurityLevel::Danger => Presentation::Blocking,
            SecurityLevel::Whitelisted => Presentation::Confirmation,
            SecurityLevel::Unknown => Presentation::Explanation {
                disclosure_url: self.disclosure_url.clone(),
            },
        }
    }

    /// Record a fresh classification of `tab_id`.
    ///
    /// Returns `false` when it was ignored because a blocking advisory for
    /// the same tab is still unresolved. Blocking assessments of the active
    /// tab open their advisory straight away.
    pub fn assess(&mut self, tab_id: TabId, assessment: SecurityAssessment, active: bool) -> bool {
        if self.blocking_open_for(tab_id) {
            browser_debug!("gate: ignoring assessment for tab {} while blocked", tab_id);
            return false;
        }

        let presentation = self.presentation_for(assessment.level);
        let blocking = assessment.level.is_blocking();
        self.entries.insert(
            tab_id,
            GateEntry {
                assessment: assessment.clone(),
                acknowledged: false,
            },
        );

        let open_for_tab = self
            .open
            .as_ref()
            .is_some_and(|advisory| advisory.tab_id == tab_id);
        if open_for_tab {
            if let Some(advisory) = self.open.as_mut() {
                advisory.assessment = assessment;
                advisory.presentation = presentation;
            }
        } else if blocking && active {
            self.present(tab_id);
        }
        true
    }

    /// Open the advisory for the recorded assessment of `tab_id`.
    ///
    /// Tabs never classified get an unknown assessment. A blocking advisory
    /// that is already open stays in place.
    pub fn present(&mut self, tab_id: TabId) -> bool {
        if self.blocking_open() {
            return false;
        }
        let assessment = self
            .entries
            .get(&tab_id)
            .map(|entry| entry.assessment.clone())
            .unwrap_or_else(SecurityAssessment::unknown);
        let presentation = self.presentation_for(assessment.level);
        self.open = Some(Advisory {
            tab_id,
            assessment,
            presentation,
        });
        true
    }

    /// A tab became active; reopen an unresolved blocking assessment.
    pub fn tab_activated(&mut self, tab_id: TabId) -> bool {
        let pending = self
            .entries
            .get(&tab_id)
            .is_some_and(|entry| entry.assessment.level.is_blocking() && !entry.acknowledged);
        pending && self.present(tab_id)
    }

    /// Backdrop tap, back button or swipe. Blocking advisories ignore it.
    pub fn dismiss(&mut self) -> bool {
        match &self.open {
            Some(advisory) if advisory.presentation.is_dismissible() => {
                self.open = None;
                true
            }
            _ => false,
        }
    }

    /// Resolve the open blocking advisory.
    ///
    /// Returns the tab to close for [`AdvisoryChoice::CloseTab`].
    pub fn resolve(&mut self, choice: AdvisoryChoice) -> Option<TabId> {
        let advisory = self.open.take()?;
        if advisory.presentation.is_dismissible() {
            // Nothing to resolve; choices only exist on blocking advisories.
            self.open = Some(advisory);
            return None;
        }
        if let Some(entry) = self.entries.get_mut(&advisory.tab_id) {
            entry.acknowledged = true;
        }
        match choice {
            AdvisoryChoice::CloseTab => Some(advisory.tab_id),
            AdvisoryChoice::ContinueAnyway => None,
        }
    }

    /// Drop everything known about a closed tab.
    pub fn forget(&mut self, tab_id: TabId) {
        self.entries.remove(&tab_id);
        if self.open.as_ref().is_some_and(|advisory| advisory.tab_id == tab_id) {
            self.open = None;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.open = None;
    }
}
