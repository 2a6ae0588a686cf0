//! Error types
//!
//! None of these are fatal to the engine: tick faults are retried, parameter
//! errors drop the offending field, control errors are reported to the sender.

use thiserror::Error;

/// A tick that could not complete
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    #[error("photon {id} has a non-finite position, velocity or wavelength")]
    NonFinite { id: u64 },
    #[error("tick panicked: {0}")]
    Panicked(String),
}

/// Sending on the control channel failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("control inbox is full")]
    Full,
    #[error("engine is no longer listening")]
    Disconnected,
}

/// A parameter value outside its allowed range
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("photonsPerBurst must be a whole number > 0 (got {0})")]
    PhotonsPerBurst(f64),
    #[error("globalDecay must be in [0, 1) (got {0})")]
    GlobalDecay(f64),
    #[error("timeScale must be > 0 (got {0})")]
    TimeScale(f64),
}
