//! Start-up configuration

use crate::state_machine::state::DEFAULT_USER_ID;
use crate::state_machine::{Mode, WidgetContext};
use std::path::PathBuf;
use std::time::Duration;

/// Origin used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the widget, read once at start-up
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// API origin, trailing slash removed
    pub base_url: String,
    pub stateless: bool,
    pub user_id: String,
    /// SQLite file for persisted slots; `None` keeps them in memory
    pub store_path: Option<PathBuf>,
    pub timeout: Duration,
    /// JSON log destination for the terminal app
    pub log_file: Option<PathBuf>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stateless: false,
            user_id: DEFAULT_USER_ID.to_string(),
            store_path: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_file: None,
        }
    }
}

impl WidgetConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = non_empty("CHAT_WIDGET_API_BASE_URL")
            .map_or_else(|| DEFAULT_BASE_URL.to_string(), |url| normalize_base_url(&url));

        Self {
            base_url,
            // Only the literal "true" enables stateless mode
            stateless: lookup("CHAT_WIDGET_USE_STATELESS").is_some_and(|v| v.trim() == "true"),
            user_id: non_empty("CHAT_WIDGET_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            store_path: non_empty("CHAT_WIDGET_STORE_PATH").map(PathBuf::from),
            timeout: non_empty("CHAT_WIDGET_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs),
            log_file: non_empty("CHAT_WIDGET_LOG_FILE").map(PathBuf::from),
        }
    }

    pub fn mode(&self) -> Mode {
        if self.stateless {
            Mode::Stateless
        } else {
            Mode::Stateful
        }
    }

    /// Full URL for the current mode
    pub fn endpoint(&self) -> String {
        endpoint_url(&self.base_url, self.mode())
    }

    pub fn context(&self) -> WidgetContext {
        WidgetContext::new(self.user_id.clone())
    }
}

/// Strips one trailing slash
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    url.strip_suffix('/').unwrap_or(url).to_string()
}

/// Endpoint selection is a pure function of mode
pub fn endpoint_url(base_url: &str, mode: Mode) -> String {
    format!("{}{}", normalize_base_url(base_url), mode.path())
}
