//! Browser core: tab collection, navigation sync, security gate and deep-link
//! dispatch as a pure state machine.
mod config;
mod deeplink;
mod effect;
mod msg;
mod nav;
mod risk;
mod security;
mod state;
mod tab;
mod update;
mod view_model;

pub use config::{BrowserConfig, NavTimings, Platform, DEFAULT_HOME_URL, RETENTION_THRESHOLD};
pub use deeplink::{
    parse, parse_session_uri, DeepLinkAction, DeepLinkConfig, DeepLinkError, SessionUri,
};
pub use effect::{BrowserObserver, Effect};
pub use msg::Msg;
pub use nav::{NavigationSynchronizer, Pager};
pub use risk::RiskList;
pub use security::{
    classify, host_of, Advisory, AdvisoryChoice, Presentation, RiskEntry, RiskLevel,
    RiskRegistry, SecurityAssessment, SecurityGate, SecurityLevel, Whitelist,
};
pub use state::{BrowserPhase, BrowserState};
pub use tab::{ClosedTab, EdgeMove, Tab, TabCollection, TabId};
pub use update::update;
pub use view_model::{AdvisoryView, BrowserViewModel, EdgeTarget, TabView};
