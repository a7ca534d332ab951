//! Persisted tab layout.
//!
//! Two keys, no schema version: `activeTabId` holds a JSON integer and
//! `tabs` a JSON array of `{id, url, title}` records.

use browser_core::{Tab, TabId};
use browser_logging::{browser_info, browser_warn};
use serde::{Deserialize, Serialize};

use crate::{KeyValueStore, StoreError};

pub const ACTIVE_TAB_KEY: &str = "activeTabId";
pub const TABS_KEY: &str = "tabs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRecord {
    pub id: TabId,
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl From<&Tab> for TabRecord {
    fn from(tab: &Tab) -> Self {
        Self {
            id: tab.id,
            url: tab.url.clone(),
            title: tab.title.clone(),
        }
    }
}

impl From<TabRecord> for Tab {
    fn from(record: TabRecord) -> Self {
        Tab {
            id: record.id,
            url: record.url,
            title: record.title,
        }
    }
}

/// What a launch reads back; empty when nothing usable was stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedLayout {
    pub tabs: Vec<Tab>,
    pub active_id: Option<TabId>,
}

pub fn encode_tabs(tabs: &[Tab]) -> Result<String, StoreError> {
    let records: Vec<TabRecord> = tabs.iter().map(TabRecord::from).collect();
    Ok(serde_json::to_string(&records)?)
}

pub fn decode_tabs(text: &str) -> Result<Vec<Tab>, StoreError> {
    let records: Vec<TabRecord> = serde_json::from_str(text)?;
    Ok(records.into_iter().map(Tab::from).collect())
}

pub fn encode_active(tab_id: TabId) -> String {
    tab_id.to_string()
}

pub fn decode_active(text: &str) -> Result<TabId, StoreError> {
    Ok(serde_json::from_str(text)?)
}

/// Read both keys. Read or decode failures are logged and count as absent.
pub async fn load_layout(store: &dyn KeyValueStore) -> PersistedLayout {
    let tabs = match store.get(TABS_KEY).await {
        Ok(Some(text)) => decode_tabs(&text).unwrap_or_else(|err| {
            browser_warn!("layout: discarding unreadable {}: {}", TABS_KEY, err);
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(err) => {
            browser_warn!("layout: failed to read {}: {}", TABS_KEY, err);
            Vec::new()
        }
    };

    let active_id = match store.get(ACTIVE_TAB_KEY).await {
        Ok(Some(text)) => match decode_active(&text) {
            Ok(id) => Some(id),
            Err(err) => {
                browser_warn!("layout: discarding unreadable {}: {}", ACTIVE_TAB_KEY, err);
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            browser_warn!("layout: failed to read {}: {}", ACTIVE_TAB_KEY, err);
            None
        }
    };

    browser_info!(
        "layout: loaded {} tabs, active {:?}",
        tabs.len(),
        active_id
    );
    PersistedLayout { tabs, active_id }
}
