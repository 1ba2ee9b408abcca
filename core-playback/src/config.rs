//! # Playback Configuration
//!
//! Tunables for the playback session.

use crate::backend::NativeRetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Elapsed seconds beyond which "previous" restarts the current track
    /// instead of moving back in the queue.
    ///
    /// Default: 3.0 seconds.
    #[serde(default = "default_restart_threshold_secs")]
    pub restart_threshold_secs: f64,

    /// How the native route is treated after a failed native dispatch.
    ///
    /// Default: [`NativeRetryPolicy::EveryCall`].
    #[serde(default)]
    pub native_retry_policy: NativeRetryPolicy,

    /// Delay before skipping to the next track after a backend error.
    /// `None` disables the skip.
    ///
    /// Default: 1 second.
    #[serde(default = "default_error_skip_delay")]
    pub error_skip_delay: Option<Duration>,

    /// Volume applied to every backend at startup, in `0.0..=1.0`.
    ///
    /// Default: 1.0.
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    /// Whether to search for similar songs when a song queue runs out.
    ///
    /// Default: true.
    #[serde(default = "default_true")]
    pub auto_continue: bool,

    /// Display values for tracks with missing metadata.
    #[serde(default)]
    pub display_defaults: DisplayDefaults,

    /// Rewrite `http://` artwork references to `https://`.
    ///
    /// Default: true.
    #[serde(default = "default_true")]
    pub upgrade_insecure_artwork: bool,

    /// Auto-continuation query used when no mood matches and the finished
    /// track has no artist.
    ///
    /// Default: "trending hindi songs 2025".
    #[serde(default = "default_fallback_query")]
    pub fallback_query: String,
}

/// Placeholders shown to backends and the now-playing surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDefaults {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self {
            title: "Melo Music".to_string(),
            artist: "Melo".to_string(),
            album: "Melo Music".to_string(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            restart_threshold_secs: default_restart_threshold_secs(),
            native_retry_policy: NativeRetryPolicy::default(),
            error_skip_delay: default_error_skip_delay(),
            initial_volume: default_initial_volume(),
            auto_continue: default_true(),
            display_defaults: DisplayDefaults::default(),
            upgrade_insecure_artwork: default_true(),
            fallback_query: default_fallback_query(),
        }
    }
}

impl PlaybackConfig {
    /// Configuration for hosts that manage their own queue endings.
    ///
    /// - No auto-continuation
    /// - No automatic skip after errors
    pub fn manual() -> Self {
        Self {
            auto_continue: false,
            error_skip_delay: None,
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !self.restart_threshold_secs.is_finite() || self.restart_threshold_secs < 0.0 {
            return Err("restart_threshold_secs must be a finite value >= 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err("initial_volume must be between 0.0 and 1.0".to_string());
        }

        if self.fallback_query.trim().is_empty() {
            return Err("fallback_query must not be empty".to_string());
        }

        if self.display_defaults.title.trim().is_empty() {
            return Err("display_defaults.title must not be empty".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_restart_threshold_secs() -> f64 {
    3.0
}

fn default_error_skip_delay() -> Option<Duration> {
    Some(Duration::from_secs(1))
}

fn default_initial_volume() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_fallback_query() -> String {
    "trending hindi songs 2025".to_string()
}
