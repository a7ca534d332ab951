use std::time::Duration;

use crate::deeplink::DeepLinkConfig;

/// Page opened for tabs created without an explicit URL.
pub const DEFAULT_HOME_URL: &str = "https://home.wallet.example/";

/// Tab count above which the persisted list is pruned at launch.
pub const RETENTION_THRESHOLD: usize = 10;

/// Host platform; decides whether layout-driven recomputation is deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// Recomputes immediately after defocus and tab close.
    #[default]
    Ios,
    /// Delays recomputation to absorb soft-keyboard layout animation.
    Android,
}

/// Settle delays used by the navigation synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavTimings {
    /// Delay before recomputing after a layout change on Android.
    pub android_layout_settle: Duration,
    /// Delay before the initial page is recomputed after launch pruning.
    pub launch_prune_settle: Duration,
    /// Delay before jumping to a freshly created tab on iOS.
    pub ios_tab_create_settle: Duration,
    /// Delay before jumping to a freshly created tab on Android.
    pub android_tab_create_settle: Duration,
    /// Resync after the user stops paging on Android.
    pub idle_resync: Duration,
}

impl Default for NavTimings {
    fn default() -> Self {
        Self {
            android_layout_settle: Duration::from_millis(50),
            launch_prune_settle: Duration::from_millis(100),
            ios_tab_create_settle: Duration::from_millis(200),
            android_tab_create_settle: Duration::from_millis(500),
            idle_resync: Duration::from_millis(2000),
        }
    }
}

impl NavTimings {
    pub fn tab_create_settle(&self, platform: Platform) -> Duration {
        match platform {
            Platform::Ios => self.ios_tab_create_settle,
            Platform::Android => self.android_tab_create_settle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    pub home_url: String,
    pub retention_threshold: usize,
    pub platform: Platform,
    pub timings: NavTimings,
    pub deep_links: DeepLinkConfig,
    /// Linked from the advisory shown for unclassified sites.
    pub risk_disclosure_url: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_HOME_URL.to_string(),
            retention_threshold: RETENTION_THRESHOLD,
            platform: Platform::default(),
            timings: NavTimings::default(),
            deep_links: DeepLinkConfig::default(),
            risk_disclosure_url: "https://home.wallet.example/risk-disclosure".to_string(),
        }
    }
}
