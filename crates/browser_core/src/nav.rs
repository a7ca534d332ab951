use std::time::Duration;

use browser_logging::browser_debug;

use crate::config::{NavTimings, Platform};
use crate::effect::Effect;
use crate::tab::TabCollection;

/// The two paged widgets that present tabs side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pager {
    AddressBar,
    Content,
}

impl Pager {
    pub const ALL: [Pager; 2] = [Pager::AddressBar, Pager::Content];

    pub fn other(self) -> Pager {
        match self {
            Pager::AddressBar => Pager::Content,
            Pager::Content => Pager::AddressBar,
        }
    }
}

/// Keeps both pagers on the active tab.
///
/// `current_index` is the only source of truth; the pagers are driven to it
/// with `GotoPage` effects that do not report back. Deferred recomputation is
/// keyed by a ticket so only the most recently scheduled timer has effect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationSynchronizer {
    current_index: usize,
    /// Last page a pager reported on its own (user drag).
    reported_index: Option<usize>,
    live_ticket: Option<u64>,
    next_ticket: u64,
    tab_creating: bool,
    address_focused: bool,
    keyboard_inset: u32,
    safe_area_bottom: u32,
}

impl NavigationSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn address_focused(&self) -> bool {
        self.address_focused
    }

    pub fn keyboard_inset(&self) -> u32 {
        self.keyboard_inset
    }

    pub fn tab_creating(&self) -> bool {
        self.tab_creating
    }

    pub fn live_ticket(&self) -> Option<u64> {
        self.live_ticket
    }

    /// Re-derive the index from `tabs` and jump both pagers if they are off.
    pub fn recompute(&mut self, tabs: &TabCollection) -> Vec<Effect> {
        let index = tabs.active_index();
        let pagers_agree = self.reported_index.map_or(true, |reported| reported == index);
        if index == self.current_index && pagers_agree {
            return Vec::new();
        }
        browser_debug!(
            "nav: jump to index {} (was {}, reported {:?})",
            index,
            self.current_index,
            self.reported_index
        );
        self.current_index = index;
        self.reported_index = None;
        goto_both(index)
    }

    /// Set the initial page without animating, e.g. right after restore.
    pub fn reset(&mut self, tabs: &TabCollection) -> Vec<Effect> {
        self.current_index = tabs.active_index();
        self.reported_index = None;
        Pager::ALL
            .iter()
            .map(|&pager| Effect::GotoPage {
                pager,
                index: self.current_index,
                animated: false,
            })
            .collect()
    }

    /// Arm a reconcile timer, superseding any earlier one.
    pub fn schedule(&mut self, delay: Duration) -> Effect {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.live_ticket = Some(ticket);
        Effect::ScheduleReconcile { ticket, delay }
    }

    /// Handle a timer firing. Stale tickets are ignored.
    pub fn timer_fired(&mut self, ticket: u64, tabs: &TabCollection) -> Vec<Effect> {
        if self.live_ticket != Some(ticket) {
            browser_debug!("nav: stale reconcile ticket {}", ticket);
            return Vec::new();
        }
        self.live_ticket = None;
        self.tab_creating = false;
        self.recompute(tabs)
    }

    /// Layout changed (tab closed, input defocused). Android waits for the
    /// keyboard animation before recomputing.
    pub fn after_layout_change(
        &mut self,
        tabs: &TabCollection,
        platform: Platform,
        timings: &NavTimings,
    ) -> Vec<Effect> {
        match platform {
            Platform::Ios => self.recompute(tabs),
            Platform::Android => vec![self.schedule(timings.android_layout_settle)],
        }
    }

    /// A tab was just created; its pages mount before the pagers can jump.
    pub fn after_tab_created(&mut self, platform: Platform, timings: &NavTimings) -> Vec<Effect> {
        self.tab_creating = true;
        vec![self.schedule(timings.tab_create_settle(platform))]
    }

    /// Mirror a user drag into the other pager.
    pub fn scrolled(&self, source: Pager, offset_px: i32) -> Effect {
        Effect::MirrorScroll {
            pager: source.other(),
            offset_px,
        }
    }

    /// A pager finished a user-driven page change.
    ///
    /// Returns `true` when `page` is a valid index that the caller should
    /// activate.
    pub fn page_settled(&mut self, page: usize, tabs: &TabCollection) -> bool {
        self.reported_index = Some(page);
        if page >= tabs.len() {
            return false;
        }
        self.current_index = page;
        true
    }

    /// A pager settled on `page` but the active tab may not change; snap
    /// both pagers back.
    pub fn page_refused(&mut self, page: usize, tabs: &TabCollection) -> Vec<Effect> {
        self.reported_index = Some(page);
        self.recompute(tabs)
    }

    /// Returns `true` when focus actually changed.
    pub fn focus_changed(&mut self, focused: bool) -> bool {
        if self.address_focused == focused {
            return false;
        }
        self.address_focused = focused;
        true
    }

    pub fn keyboard_shown(&mut self, height: u32) {
        if self.address_focused {
            self.keyboard_inset = height.saturating_sub(self.safe_area_bottom);
        }
    }

    /// Returns `true` when the inset changed.
    pub fn keyboard_hidden(&mut self) -> bool {
        if self.keyboard_inset == 0 {
            return false;
        }
        self.keyboard_inset = 0;
        true
    }

    pub fn set_safe_area_bottom(&mut self, bottom: u32) {
        self.safe_area_bottom = bottom;
    }
}

fn goto_both(index: usize) -> Vec<Effect> {
    Pager::ALL
        .iter()
        .map(|&pager| Effect::GotoPage {
            pager,
            index,
            animated: true,
        })
        .collect()
}
