use browser_core::{SecurityAssessment, Tab, TabId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Loaded {
        tabs: Vec<Tab>,
        active_id: Option<TabId>,
    },
    Classified {
        tab_id: TabId,
        url: String,
        assessment: SecurityAssessment,
    },
    TimerFired {
        ticket: u64,
    },
    SessionFailed {
        reason: String,
    },
}
