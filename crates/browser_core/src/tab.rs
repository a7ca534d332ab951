use std::collections::HashSet;

use browser_logging::browser_warn;

pub type TabId = u64;

/// Restored ids above this are renumbered so allocation never runs out.
const MAX_RESTORED_ID: TabId = TabId::MAX / 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
    pub title: String,
}

/// Result of closing a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedTab {
    pub closed: Tab,
    /// Default tab synthesized because the closed tab was the only one.
    pub replacement: Option<TabId>,
}

/// Result of an address-bar edge gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeMove {
    /// An existing neighbour became active.
    Switched(TabId),
    /// There was no neighbour; a new tab was created at that edge.
    Created(Tab),
}

/// Ordered tab collection plus the active pointer.
///
/// Never empty: every operation that could remove the last tab synthesizes
/// a default tab first, and the active id always names a tab in `tabs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabCollection {
    tabs: Vec<Tab>,
    active_id: TabId,
    next_id: TabId,
    home_url: String,
}

impl TabCollection {
    /// A collection holding one default tab.
    pub fn new(home_url: impl Into<String>) -> Self {
        let home_url = home_url.into();
        let tab = default_tab(1, &home_url);
        Self {
            active_id: tab.id,
            tabs: vec![tab],
            next_id: 2,
            home_url,
        }
    }

    /// Rebuild from persisted records.
    ///
    /// Duplicate ids keep their first occurrence. A missing or stale
    /// `stored_active` falls back to the last tab. Ids too large to leave
    /// room for new tabs are renumbered from 1 in order.
    pub fn restore(
        home_url: impl Into<String>,
        records: Vec<Tab>,
        stored_active: Option<TabId>,
    ) -> Self {
        let home_url = home_url.into();
        let mut seen = HashSet::new();
        let mut tabs: Vec<Tab> = records
            .into_iter()
            .filter(|tab| seen.insert(tab.id))
            .collect();

        if tabs.is_empty() {
            return Self::new(home_url);
        }

        let mut active_id = stored_active
            .filter(|id| tabs.iter().any(|tab| tab.id == *id))
            .unwrap_or_else(|| tabs[tabs.len() - 1].id);

        let max_id = tabs.iter().map(|tab| tab.id).max().unwrap_or(0);
        let next_id = match max_id.checked_add(1).filter(|next| *next <= MAX_RESTORED_ID) {
            Some(next) => next,
            None => {
                browser_warn!(
                    "tabs: restored id {} leaves no room for new ids; renumbering {} tabs",
                    max_id,
                    tabs.len()
                );
                let active_index = tabs.iter().position(|tab| tab.id == active_id);
                for (tab, id) in tabs.iter_mut().zip(1..) {
                    tab.id = id;
                }
                active_id = active_index.map_or(1, |index| tabs[index].id);
                tabs.len() as TabId + 1
            }
        };

        Self {
            tabs,
            active_id,
            next_id,
            home_url,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_id(&self) -> TabId {
        self.active_id
    }

    pub fn active_index(&self) -> usize {
        self.index_of(self.active_id).unwrap_or(0)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.get(self.active_id)
    }

    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == id)
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.index_of(id).is_some()
    }

    /// Insert a new tab and make it active.
    ///
    /// With `insert_right` the tab lands immediately after the active tab,
    /// otherwise at the end.
    pub fn create_tab(&mut self, url: Option<&str>, insert_right: bool) -> Tab {
        let url = url.unwrap_or(&self.home_url).to_string();
        let tab = Tab {
            id: self.allocate_id(),
            url,
            title: String::new(),
        };
        let position = if insert_right {
            self.index_of(self.active_id)
                .map_or(self.tabs.len(), |index| index + 1)
        } else {
            self.tabs.len()
        };
        self.tabs.insert(position, tab.clone());
        self.active_id = tab.id;
        tab
    }

    /// Create a tab at position 0 and make it active.
    fn create_tab_at_front(&mut self) -> Tab {
        let tab = default_tab(self.allocate_id(), &self.home_url);
        self.tabs.insert(0, tab.clone());
        self.active_id = tab.id;
        tab
    }

    /// Close `id`. Unknown ids are ignored.
    pub fn close_tab(&mut self, id: TabId) -> Option<ClosedTab> {
        let index = self.index_of(id)?;
        let mut replacement = None;

        if id == self.active_id {
            if self.tabs.len() == 1 {
                // Appended, so `index` still points at the closing tab.
                replacement = Some(self.create_tab(None, false).id);
            } else if index == 0 {
                self.active_id = self.tabs[1].id;
            } else {
                self.active_id = self.tabs[index - 1].id;
            }
        }

        let closed = self.tabs.remove(index);
        if self.tabs.is_empty() {
            replacement = Some(self.create_tab(None, false).id);
        }
        Some(ClosedTab {
            closed,
            replacement,
        })
    }

    /// Replace every tab with a single default tab.
    pub fn close_all(&mut self) -> Tab {
        self.tabs.clear();
        self.create_tab(None, false)
    }

    /// Returns `true` when the active pointer moved.
    pub fn switch_to(&mut self, id: TabId) -> bool {
        if id == self.active_id || !self.contains(id) {
            return false;
        }
        self.active_id = id;
        true
    }

    /// Activate the left neighbour of `id`, creating a tab when `id` is first.
    pub fn switch_left(&mut self, id: TabId) -> Option<EdgeMove> {
        let index = self.index_of(id)?;
        if index == 0 {
            return Some(EdgeMove::Created(self.create_tab_at_front()));
        }
        let target = self.tabs[index - 1].id;
        self.active_id = target;
        Some(EdgeMove::Switched(target))
    }

    /// Activate the right neighbour of `id`, creating a tab when `id` is last.
    pub fn switch_right(&mut self, id: TabId) -> Option<EdgeMove> {
        let index = self.index_of(id)?;
        if index + 1 == self.tabs.len() {
            self.active_id = id;
            return Some(EdgeMove::Created(self.create_tab(None, true)));
        }
        let target = self.tabs[index + 1].id;
        self.active_id = target;
        Some(EdgeMove::Switched(target))
    }

    /// Record a committed navigation. Returns `true` if anything changed.
    pub fn update_tab(&mut self, id: TabId, url: &str, title: Option<&str>) -> bool {
        let Some(tab) = self.tabs.iter_mut().find(|tab| tab.id == id) else {
            return false;
        };
        let mut changed = false;
        if tab.url != url {
            tab.url = url.to_string();
            changed = true;
        }
        if let Some(title) = title {
            if tab.title != title {
                tab.title = title.to_string();
                changed = true;
            }
        }
        changed
    }

    /// At most `limit` tabs ending at the active tab.
    pub fn retained_window(&self, limit: usize) -> Vec<Tab> {
        let limit = limit.max(1);
        let end = self.active_index() + 1;
        let start = end.saturating_sub(limit);
        self.tabs[start..end].to_vec()
    }

    fn allocate_id(&mut self) -> TabId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }
}

fn default_tab(id: TabId, home_url: &str) -> Tab {
    Tab {
        id,
        url: home_url.to_string(),
        title: String::new(),
    }
}
