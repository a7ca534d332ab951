use std::time::Duration;

use crate::nav::Pager;
use crate::security::SecurityLevel;
use crate::tab::{Tab, TabId};

/// Work requested by `update`, executed by the host.
///
/// Persistence effects are always emitted after the in-memory mutation they
/// reflect; the host never feeds their outcome back into state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadPersisted,
    PersistTabs { tabs: Vec<Tab> },
    PersistActiveTab { tab_id: TabId },
    Classify { tab_id: TabId, url: String },
    ScheduleReconcile { ticket: u64, delay: Duration },
    /// Reposition a pager without it reporting the change back.
    GotoPage { pager: Pager, index: usize, animated: bool },
    MirrorScroll { pager: Pager, offset_px: i32 },
    OpenSession {
        uri: String,
        redirect: Option<String>,
        autosign: Option<String>,
    },
    TabsChanged { tabs: Vec<Tab>, active_id: TabId },
    SecurityAssessed {
        tab_id: TabId,
        level: SecurityLevel,
        description: String,
    },
    DeepLinkHandled,
}

/// Notifications for the rendering layer.
pub trait BrowserObserver {
    fn on_tabs_changed(&mut self, tabs: &[Tab], active_id: TabId);
    fn on_security_assessed(&mut self, level: SecurityLevel, description: &str);
    fn on_deep_link_handled(&mut self);
}

impl Effect {
    /// Deliver this effect to `observer` if it is a notification.
    ///
    /// Returns `false` for effects the observer does not care about.
    pub fn notify(&self, observer: &mut dyn BrowserObserver) -> bool {
        match self {
            Effect::TabsChanged { tabs, active_id } => observer.on_tabs_changed(tabs, *active_id),
            Effect::SecurityAssessed {
                level, description, ..
            } => observer.on_security_assessed(*level, description),
            Effect::DeepLinkHandled => observer.on_deep_link_handled(),
            _ => return false,
        }
        true
    }
}
