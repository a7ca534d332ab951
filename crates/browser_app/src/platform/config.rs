//! Host configuration read from RON.
//!
//! Looked up in `$BROWSER_CONFIG`, then `./browser.ron`. Every field has a
//! default, so a missing file or a partial one is fine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use browser_core::{
    BrowserConfig, DeepLinkConfig, NavTimings, Platform, RiskList, DEFAULT_HOME_URL,
    RETENTION_THRESHOLD,
};
use browser_logging::{browser_info, LogDestination, LogSettings, DEFAULT_LOG_FILE};
use log::LevelFilter;
use serde::Deserialize;

const CONFIG_ENV: &str = "BROWSER_CONFIG";
const CONFIG_FILENAME: &str = "browser.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub(crate) enum PlatformSetting {
    #[default]
    Ios,
    Android,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub(crate) enum LogTarget {
    File,
    #[default]
    Terminal,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct TimingsConfig {
    pub android_layout_settle_ms: u64,
    pub launch_prune_settle_ms: u64,
    pub ios_tab_create_settle_ms: u64,
    pub android_tab_create_settle_ms: u64,
    pub idle_resync_ms: u64,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        let timings = NavTimings::default();
        let ms = |d: Duration| u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        Self {
            android_layout_settle_ms: ms(timings.android_layout_settle),
            launch_prune_settle_ms: ms(timings.launch_prune_settle),
            ios_tab_create_settle_ms: ms(timings.ios_tab_create_settle),
            android_tab_create_settle_ms: ms(timings.android_tab_create_settle),
            idle_resync_ms: ms(timings.idle_resync),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct DeniedDomain {
    pub domain: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct LogConfig {
    pub destination: LogTarget,
    pub level: String,
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            destination: LogTarget::default(),
            level: "info".to_string(),
            file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AppConfig {
    pub home_url: String,
    pub retention_threshold: usize,
    pub platform: PlatformSetting,
    pub timings: TimingsConfig,
    pub product_domain: String,
    pub product_scheme: String,
    pub risk_disclosure_url: String,
    pub data_dir: PathBuf,
    pub whitelist: Vec<String>,
    pub deny: Vec<DeniedDomain>,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let core = BrowserConfig::default();
        Self {
            home_url: DEFAULT_HOME_URL.to_string(),
            retention_threshold: RETENTION_THRESHOLD,
            platform: PlatformSetting::default(),
            timings: TimingsConfig::default(),
            product_domain: core.deep_links.product_domain,
            product_scheme: core.deep_links.product_scheme,
            risk_disclosure_url: core.risk_disclosure_url,
            data_dir: PathBuf::from("./browser_data"),
            whitelist: Vec::new(),
            deny: Vec::new(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = ron::from_str(text).context("invalid browser config")?;
        if config.retention_threshold == 0 {
            anyhow::bail!("retention_threshold must be at least 1");
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    /// `$BROWSER_CONFIG` must exist when set; `./browser.ron` is optional.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }
        let local = Path::new(CONFIG_FILENAME);
        if local.exists() {
            return Self::load_from(local);
        }
        Ok(Self::default())
    }

    pub fn browser_config(&self) -> BrowserConfig {
        let t = &self.timings;
        BrowserConfig {
            home_url: self.home_url.clone(),
            retention_threshold: self.retention_threshold,
            platform: match self.platform {
                PlatformSetting::Ios => Platform::Ios,
                PlatformSetting::Android => Platform::Android,
            },
            timings: NavTimings {
                android_layout_settle: Duration::from_millis(t.android_layout_settle_ms),
                launch_prune_settle: Duration::from_millis(t.launch_prune_settle_ms),
                ios_tab_create_settle: Duration::from_millis(t.ios_tab_create_settle_ms),
                android_tab_create_settle: Duration::from_millis(t.android_tab_create_settle_ms),
                idle_resync: Duration::from_millis(t.idle_resync_ms),
            },
            deep_links: DeepLinkConfig {
                product_domain: self.product_domain.clone(),
                product_scheme: self.product_scheme.clone(),
            },
            risk_disclosure_url: self.risk_disclosure_url.clone(),
        }
    }

    pub fn risk_list(&self) -> RiskList {
        let mut risk = RiskList::new();
        for domain in &self.whitelist {
            risk.protect(domain);
        }
        for denied in &self.deny {
            risk.deny(&denied.domain, denied.description.clone());
        }
        browser_info!(
            "risk list: {} protected, {} denied",
            risk.protected_len(),
            risk.denied_len()
        );
        risk
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            destination: match self.log.destination {
                LogTarget::File => LogDestination::File,
                LogTarget::Terminal => LogDestination::Terminal,
                LogTarget::Both => LogDestination::Both,
            },
            level: self.log.level.parse().unwrap_or(LevelFilter::Info),
            file_path: self.log.file.clone(),
        }
    }
}
