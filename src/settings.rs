//! Simulation parameters and engine configuration
//!
//! `SimParams` are the live tunables the control surface can change.
//! `EngineConfig` is read once at startup, optionally from a JSON file.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Tunables read at the top of every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimParams {
    /// Photons queued by a FIRE (> 0)
    pub photons_per_burst: u32,
    /// Fractional energy loss per collision, half of it per wall hit ([0, 1))
    pub global_decay: f64,
    /// Multiplier on dt (> 0)
    pub time_scale: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            photons_per_burst: 200,
            global_decay: 0.0,
            time_scale: 1.0,
        }
    }
}

impl SimParams {
    /// Check every field
    pub fn validate(&self) -> Result<(), ParamError> {
        validate_burst(f64::from(self.photons_per_burst))?;
        validate_decay(self.global_decay)?;
        validate_time_scale(self.time_scale)?;
        Ok(())
    }

    /// Return a copy with `update` applied.
    ///
    /// Fields are checked one by one; invalid ones are logged and skipped so
    /// the rest of the update still lands.
    pub fn merged(&self, update: &ParamUpdate) -> Self {
        let mut next = *self;

        if let Some(n) = update.photons_per_burst {
            match validate_burst(n) {
                Ok(n) => next.photons_per_burst = n,
                Err(e) => warn!("Ignoring parameter: {}", e),
            }
        }
        if let Some(d) = update.global_decay {
            match validate_decay(d) {
                Ok(()) => next.global_decay = d,
                Err(e) => warn!("Ignoring parameter: {}", e),
            }
        }
        if let Some(t) = update.time_scale {
            match validate_time_scale(t) {
                Ok(()) => next.time_scale = t,
                Err(e) => warn!("Ignoring parameter: {}", e),
            }
        }

        next
    }
}

/// Burst sizes arrive as JSON numbers; accept any whole positive value that
/// fits a `u32` (`50` and `50.0` alike)
fn validate_burst(n: f64) -> Result<u32, ParamError> {
    if !(n.is_finite() && n.fract() == 0.0 && n >= 1.0 && n <= f64::from(u32::MAX)) {
        return Err(ParamError::PhotonsPerBurst(n));
    }
    Ok(n as u32)
}

fn validate_decay(d: f64) -> Result<(), ParamError> {
    if !(0.0..1.0).contains(&d) {
        return Err(ParamError::GlobalDecay(d));
    }
    Ok(())
}

fn validate_time_scale(t: f64) -> Result<(), ParamError> {
    if !(t > 0.0 && t.is_finite()) {
        return Err(ParamError::TimeScale(t));
    }
    Ok(())
}

/// Partial parameter update from the control channel.
///
/// Every field is a plain JSON number so one out-of-range value never fails
/// the whole message; range checks happen in [`SimParams::merged`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photons_per_burst: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_decay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_scale: Option<f64>,
}

impl ParamUpdate {
    pub fn is_empty(&self) -> bool {
        self.photons_per_burst.is_none() && self.global_decay.is_none() && self.time_scale.is_none()
    }
}

/// Engine startup configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// RNG seed for emission and separation
    pub seed: u64,
    /// Sleep to hold the fixed timestep; off runs ticks back to back
    pub realtime: bool,
    /// Poll interval while stopped (ms)
    pub idle_poll_ms: u64,
    /// Pause after a faulted tick (ms)
    pub error_backoff_ms: u64,
    /// Pending control messages the inbox holds
    pub control_capacity: usize,
    /// Ticks between statistics log lines (0 disables)
    pub stats_interval: u64,
    /// Initial tunables
    pub params: SimParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_1ced,
            realtime: true,
            idle_poll_ms: 100,
            error_backoff_ms: 1000,
            control_capacity: 64,
            stats_interval: 60,
            params: SimParams::default(),
        }
    }
}

impl EngineConfig {
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.params.validate()?;
        Ok(config)
    }
}
