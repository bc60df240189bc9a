//! Vista configuration system
//!
//! This crate provides centralized configuration for the page controller,
//! loading timing and geometry settings from `vista.toml` with environment
//! variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure for Vista
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct VistaConfig {
    /// Viewport size and frame pacing
    pub viewport: ViewportConfig,
    /// Navigation bar, mobile menu and anchor scrolling
    pub navigation: NavigationConfig,
    /// Reveal-on-scroll observers
    pub reveal: RevealConfig,
    /// Statistic counter animation
    pub counter: CounterConfig,
    /// Shared notification surface
    pub notification: NotificationConfig,
    /// Simulated login form
    pub login: LoginConfig,
    /// Page fade transitions
    pub transition: TransitionConfig,
    /// Scroll progress indicator
    pub progress: ProgressConfig,
    /// Headless block layout
    pub layout: LayoutConfig,
}

/// Viewport configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    /// Viewport width in CSS pixels
    pub width: f64,
    /// Viewport height in CSS pixels
    pub height: f64,
    /// Length of one runtime frame in milliseconds
    pub frame_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Scroll offset past which the navbar gets its `scrolled` variant
    pub scroll_threshold: f64,
    /// Subtracted from anchor targets to clear the fixed navbar
    pub anchor_offset: f64,
    /// Widest viewport treated as mobile when closing the menu on link click
    pub mobile_breakpoint: f64,
    /// Duration of smooth anchor scrolling
    pub smooth_scroll_ms: u64,
    /// CSS timing function for smooth anchor scrolling, e.g. `ease-in-out`
    /// or `cubic-bezier(0.25, 0.1, 0.25, 1)`
    pub scroll_easing: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RevealConfig {
    /// Fraction of the element that must be on screen
    pub threshold: f64,
    /// Pixels trimmed from the bottom of the viewport for feature cards and fade-ins
    pub bottom_margin: f64,
    /// Pixels trimmed from the bottom of the viewport for timeline items
    pub timeline_bottom_margin: f64,
    /// Per-card animation delay step in seconds
    pub stagger_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CounterConfig {
    pub duration_ms: u64,
    pub tick_ms: u64,
    /// Fraction of a stat element that must be visible before counting starts
    pub visibility_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub display_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoginConfig {
    /// Simulated round-trip before the login "succeeds"
    pub submit_delay_ms: u64,
    /// Delay of the (inert) post-login redirect
    pub redirect_delay_ms: u64,
    /// Run field validation before submitting
    pub validate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransitionConfig {
    pub fade_out_ms: u64,
    pub fade_in_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProgressConfig {
    /// Install the scroll progress bar on load
    pub enabled: bool,
    pub throttle_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub line_height: f64,
    /// Average glyph advance used to wrap text
    pub char_width: f64,
    /// Height of an empty block element
    pub default_block_height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            frame_ms: 16,
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            scroll_threshold: 50.0,
            anchor_offset: 80.0,
            mobile_breakpoint: 768.0,
            smooth_scroll_ms: 400,
            scroll_easing: "ease-in-out".to_string(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            bottom_margin: 50.0,
            timeline_bottom_margin: 100.0,
            stagger_s: 0.1,
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2000,
            tick_ms: 16,
            visibility_threshold: 0.5,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { display_ms: 3000 }
    }
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: 2000,
            redirect_delay_ms: 1500,
            validate: false,
        }
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            fade_out_ms: 300,
            fade_in_delay_ms: 100,
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            throttle_ms: 100,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_height: 24.0,
            char_width: 8.0,
            default_block_height: 0.0,
        }
    }
}

impl VistaConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from the default location (vista.toml in the current directory)
    /// or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("vista.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        // Viewport
        env_parse("VISTA_VIEWPORT_WIDTH", &mut self.viewport.width);
        env_parse("VISTA_VIEWPORT_HEIGHT", &mut self.viewport.height);
        env_parse("VISTA_FRAME_MS", &mut self.viewport.frame_ms);

        // Navigation
        env_parse("VISTA_NAV_SCROLL_THRESHOLD", &mut self.navigation.scroll_threshold);
        env_parse("VISTA_NAV_ANCHOR_OFFSET", &mut self.navigation.anchor_offset);
        env_parse("VISTA_NAV_MOBILE_BREAKPOINT", &mut self.navigation.mobile_breakpoint);
        env_parse("VISTA_SMOOTH_SCROLL_MS", &mut self.navigation.smooth_scroll_ms);
        env_parse("VISTA_SCROLL_EASING", &mut self.navigation.scroll_easing);

        // Counter
        env_parse("VISTA_COUNTER_DURATION_MS", &mut self.counter.duration_ms);
        env_parse("VISTA_COUNTER_TICK_MS", &mut self.counter.tick_ms);

        // Notification / login
        env_parse("VISTA_NOTIFICATION_MS", &mut self.notification.display_ms);
        env_parse("VISTA_LOGIN_DELAY_MS", &mut self.login.submit_delay_ms);
        if let Ok(val) = std::env::var("VISTA_LOGIN_VALIDATE") {
            self.login.validate = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("VISTA_PROGRESS_BAR") {
            self.progress.enabled = parse_flag(&val);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from vista.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

fn env_parse<T: std::str::FromStr>(key: &str, slot: &mut T) {
    if let Ok(val) = std::env::var(key) {
        if let Ok(parsed) = val.parse::<T>() {
            *slot = parsed;
        }
    }
}
