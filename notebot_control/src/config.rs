//! Controller configuration.
//!
//! One TOML file, loaded through [`ConfigLoader`], validated, then resolved
//! against the routine catalogue into a [`LoadedConfig`] ready for the
//! robot loop. Every field except `[shared].service_name` has a default.
//!
//! ```toml
//! cycle_time_ms = 20
//! alliance = "red"
//! routine = "4 notes: internal, podium, speaker, amp"
//!
//! [shared]
//! service_name = "notebot"
//!
//! [timing]
//! settle_delay_s = 1.0
//! fire_duration_s = 1.0
//! ```

use core::time::Duration;
use std::path::Path;

use notebot_common::config::{ConfigError, ConfigLoader, SharedConfig};
use notebot_common::consts::{DEFAULT_CYCLE_TIME, FIRE_DURATION, NOTE_SETTLE_DELAY};
use notebot_common::field::Alliance;
use serde::Deserialize;

use crate::autonomous::{Routine, RoutineCatalogue};
use crate::controller::NoteTimings;
use crate::error::RoutineError;
use crate::sim::SimConfig;

// ─── Sections ───────────────────────────────────────────────────────

/// `[timing]` section.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait after the capture sensor first sees a note [s].
    pub settle_delay_s: f64,
    /// Length of the firing pulse [s].
    pub fire_duration_s: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay_s: NOTE_SETTLE_DELAY.as_secs_f64(),
            fire_duration_s: FIRE_DURATION.as_secs_f64(),
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        Duration::try_from_secs_f64(self.settle_delay_s).map_err(|_| {
            ConfigError::ValidationError(format!(
                "timing.settle_delay_s must be a non-negative number of seconds, got {}",
                self.settle_delay_s
            ))
        })?;
        let fire = Duration::try_from_secs_f64(self.fire_duration_s).unwrap_or_default();
        if fire.is_zero() {
            return Err(ConfigError::ValidationError(format!(
                "timing.fire_duration_s must be positive, got {}",
                self.fire_duration_s
            )));
        }
        Ok(())
    }

    /// Timings for the note manager. Call on a validated config.
    pub fn timings(&self) -> NoteTimings {
        NoteTimings {
            settle_delay: Duration::try_from_secs_f64(self.settle_delay_s)
                .unwrap_or(NOTE_SETTLE_DELAY),
            fire_duration: Duration::try_from_secs_f64(self.fire_duration_s)
                .unwrap_or(FIRE_DURATION),
        }
    }
}

// ─── Controller Config ──────────────────────────────────────────────

fn default_cycle_time_ms() -> u64 {
    DEFAULT_CYCLE_TIME.as_millis() as u64
}

/// Top-level file contents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControllerConfig {
    pub shared: SharedConfig,

    /// Control cycle period [ms].
    #[serde(default = "default_cycle_time_ms")]
    pub cycle_time_ms: u64,

    #[serde(default)]
    pub alliance: Alliance,

    /// Autonomous routine by exact name. Defaults to the first enabled one.
    #[serde(default)]
    pub routine: Option<String>,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub sim: SimConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            cycle_time_ms: default_cycle_time_ms(),
            alliance: Alliance::default(),
            routine: None,
            timing: TimingConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.cycle_time_ms == 0 {
            return Err(ConfigError::ValidationError(
                "cycle_time_ms must be positive".to_string(),
            ));
        }
        self.timing.validate()?;
        self.sim.validate()
    }

    #[inline]
    pub fn cycle_time(&self) -> Duration {
        Duration::from_millis(self.cycle_time_ms)
    }

    /// Validate and pick the routine, mirrored for the configured alliance.
    pub fn resolve(self, catalogue: &RoutineCatalogue) -> Result<LoadedConfig, ConfigError> {
        self.validate()?;
        let routine = match self.routine.as_deref() {
            Some(name) => catalogue.select(name),
            None => catalogue
                .default_routine()
                .ok_or_else(|| RoutineError::Unknown("<default>".to_string())),
        }
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?
        .for_alliance(self.alliance);

        Ok(LoadedConfig {
            cycle_time: self.cycle_time(),
            timings: self.timing.timings(),
            routine,
            config: self,
        })
    }
}

// ─── Loaded Config Bundle ───────────────────────────────────────────

/// Validated configuration, ready for the robot loop.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ControllerConfig,
    pub cycle_time: Duration,
    pub timings: NoteTimings,
    pub routine: Routine,
}

/// Load, validate and resolve against the built-in catalogue.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    resolve_builtin(ControllerConfig::load(path)?)
}

pub fn load_config_from_str(content: &str) -> Result<LoadedConfig, ConfigError> {
    resolve_builtin(ControllerConfig::from_toml(content)?)
}

fn resolve_builtin(config: ControllerConfig) -> Result<LoadedConfig, ConfigError> {
    let catalogue =
        RoutineCatalogue::builtin().map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    config.resolve(&catalogue)
}

// ─── Tests ──────────────────────────────────────────────────────────
