//! Timing policy for the change coalescer.
//!
//! Every value here is product tuning, not protocol: the defaults carry the
//! observed behavior of the shipping application, and each can be overridden
//! through the environment (`DARKROOM_*`).

use std::time::Duration;

/// Tunable timing policy for one edit session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Whether low-latency interactive previews stream while dragging.
    pub live_previews_enabled: bool,
    /// Quiet period after the last edit in a burst before one history
    /// snapshot is taken.
    pub history_debounce: Duration,
    /// Quiet period before the authoritative (final-quality) render fires.
    pub render_debounce: Duration,
    /// Minimum spacing between interactive renders while dragging.
    pub interactive_throttle: Duration,
    /// Idle delay after a drag ends when interactive previews are enabled --
    /// short, because the interactive stream already supplied a preview.
    pub settle_delay_live: Duration,
    /// Idle delay after a drag ends when interactive previews are disabled --
    /// longer, since nothing else has rendered yet.
    pub settle_delay_static: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            live_previews_enabled: true,
            history_debounce: Duration::from_millis(300),
            render_debounce: Duration::from_millis(100),
            interactive_throttle: Duration::from_millis(100),
            settle_delay_live: Duration::from_millis(50),
            settle_delay_static: Duration::from_millis(150),
        }
    }
}

impl SessionConfig {
    /// The idle-settle delay for the current live-preview setting.
    pub fn settle_delay(&self) -> Duration {
        if self.live_previews_enabled {
            self.settle_delay_live
        } else {
            self.settle_delay_static
        }
    }

    /// Build a config from the environment, falling back to defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_bool("DARKROOM_LIVE_PREVIEWS") {
            config.live_previews_enabled = v;
        }
        if let Some(v) = env_ms("DARKROOM_HISTORY_DEBOUNCE_MS") {
            config.history_debounce = v;
        }
        if let Some(v) = env_ms("DARKROOM_RENDER_DEBOUNCE_MS") {
            config.render_debounce = v;
        }
        if let Some(v) = env_ms("DARKROOM_INTERACTIVE_THROTTLE_MS") {
            config.interactive_throttle = v;
        }
        if let Some(v) = env_ms("DARKROOM_SETTLE_DELAY_LIVE_MS") {
            config.settle_delay_live = v;
        }
        if let Some(v) = env_ms("DARKROOM_SETTLE_DELAY_STATIC_MS") {
            config.settle_delay_static = v;
        }
        config
    }
}

fn env_ms(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.parse::<bool>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_delay_tracks_live_preview_setting() {
        let mut config = SessionConfig::default();
        config.live_previews_enabled = true;
        assert_eq!(config.settle_delay(), config.settle_delay_live);

        config.live_previews_enabled = false;
        assert_eq!(config.settle_delay(), config.settle_delay_static);
    }

    #[test]
    fn settle_is_shorter_when_live_previews_are_on() {
        let config = SessionConfig::default();
        assert!(config.settle_delay_live < config.settle_delay_static);
    }
}
