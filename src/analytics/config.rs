//! Analytics recording configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Record search events at all
    pub enabled: bool,

    /// Await each write instead of spawning it. Used by tests that read
    /// analytics right after a search.
    pub record_inline: bool,

    /// Upper bound on a single write
    pub record_timeout_ms: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            record_inline: false,
            record_timeout_ms: 2000,
        }
    }
}

impl AnalyticsConfig {
    pub fn builder() -> AnalyticsConfigBuilder {
        AnalyticsConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct AnalyticsConfigBuilder {
    config: AnalyticsConfig,
}

impl AnalyticsConfigBuilder {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn record_inline(mut self, inline: bool) -> Self {
        self.config.record_inline = inline;
        self
    }

    pub fn record_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.record_timeout_ms = timeout_ms;
        self
    }

    pub fn build(self) -> AnalyticsConfig {
        self.config
    }
}
