//! Process-wide Options
//!
//! Canopy has exactly one externally observable knob: the delay between a
//! state update and the deferred re-render it schedules. Every renderer reads
//! it at enqueue time, so changing it takes effect for the next scheduled
//! update.
//!
//! Options can be loaded from a JSON document or from the environment:
//!
//! ```rust,ignore
//! use canopy_core::options::{self, Options};
//!
//! options::set(Options::from_json(r#"{ "delay_ms": 16 }"#)?);
//! assert_eq!(options::current().delay_ms, 16);
//! ```

use std::sync::OnceLock;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable consulted by [`Options::from_env`].
pub const DELAY_ENV: &str = "CANOPY_DELAY_MS";

/// Runtime options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Re-render debounce window in milliseconds. Zero means "next flush".
    pub delay_ms: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self { delay_ms: 0 }
    }
}

impl Options {
    /// The debounce window as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Parse options from a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build options from the environment, falling back to defaults for
    /// unset variables.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();
        if let Ok(raw) = std::env::var(DELAY_ENV) {
            options.delay_ms = raw
                .trim()
                .parse()
                .map_err(|_| Error::InvalidOption(format!("{DELAY_ENV}={raw:?} is not a number of milliseconds")))?;
        }
        Ok(options)
    }
}

static OPTIONS: OnceLock<RwLock<Options>> = OnceLock::new();

fn global() -> &'static RwLock<Options> {
    OPTIONS.get_or_init(|| RwLock::new(Options::default()))
}

/// Snapshot of the current process-wide options.
pub fn current() -> Options {
    global().read().clone()
}

/// Replace the process-wide options.
pub fn set(options: Options) {
    tracing::debug!(delay_ms = options.delay_ms, "options updated");
    *global().write() = options;
}
