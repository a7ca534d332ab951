use crate::nav::Pager;
use crate::security::{AdvisoryChoice, SecurityAssessment};
use crate::tab::{Tab, TabId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Host finished launching; persisted state should be read.
    Started,
    /// Persisted tabs arrived (empty when nothing was stored or reading failed).
    PersistedLoaded {
        tabs: Vec<Tab>,
        active_id: Option<TabId>,
    },
    /// User asked for a new tab.
    NewTabRequested {
        url: Option<String>,
        insert_right: bool,
    },
    /// A page asked to open a new tab (e.g. `window.open`).
    PageRequestedNewTab { url: Option<String> },
    CloseTabRequested { tab_id: TabId },
    CloseAllTabsRequested,
    SwitchTabRequested { tab_id: TabId },
    /// Address-bar edge gesture towards the left neighbour.
    SwipedLeft { tab_id: TabId },
    /// Address-bar edge gesture towards the right neighbour.
    SwipedRight { tab_id: TabId },
    /// The rendering engine committed a navigation in a tab.
    NavigationCommitted {
        tab_id: TabId,
        url: String,
        title: Option<String>,
    },
    /// User is dragging one pager horizontally.
    PagerScrolled { source: Pager, offset_px: i32 },
    /// A user drag ended on `page`.
    PagerSettled { source: Pager, page: usize },
    AddressFocusChanged { focused: bool },
    KeyboardShown { height: u32 },
    KeyboardHidden,
    SafeAreaMeasured { bottom: u32 },
    /// The browser screen is about to lose focus.
    ScreenBlurred,
    ReconcileTimerFired { ticket: u64 },
    DeepLinkReceived { uri: String },
    /// Classification of `url` in `tab_id`, as requested by `Effect::Classify`.
    SecurityAssessed {
        tab_id: TabId,
        url: String,
        assessment: SecurityAssessment,
    },
    /// User tapped the security shield of a tab's address bar.
    ShieldTapped { tab_id: TabId },
    /// Backdrop tap, back button or swipe on the open advisory.
    AdvisoryDismissRequested,
    AdvisoryResolved { choice: AdvisoryChoice },
    NoOp,
}
