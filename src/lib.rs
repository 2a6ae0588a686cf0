//! Photon Sim - a 2D photon-like particle collision simulator
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (particles, spatial grid, collisions)
//! - `engine`: Control loop, run state and resilience policy
//! - `channel`: Control inbox and latest-frame-wins data channel
//! - `protocol`: Control messages and exported frames
//! - `settings`: Tunable parameters and engine configuration
//! - `spectrum`: Wavelength to display color for renderers

pub mod channel;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod settings;
pub mod sim;
pub mod spectrum;

pub use engine::{EngineHandle, RunState, SimulationEngine, spawn};
pub use error::{ControlError, ParamError, TickError};
pub use protocol::{Command, ControlMessage, Frame};
pub use settings::{EngineConfig, ParamUpdate, SimParams};

use glam::DVec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;

    /// Arena dimensions (logical units)
    pub const BOUNDS_WIDTH: f64 = 800.0;
    pub const BOUNDS_HEIGHT: f64 = 600.0;

    /// Constant particle speed ("c")
    pub const SPEED_OF_LIGHT: f64 = 200.0;
    pub const COLLISION_RADIUS: f64 = 8.0;
    /// Grid cell edge; 3x the radius keeps every contact inside the 3x3 block
    pub const GRID_CELL_SIZE: f64 = COLLISION_RADIUS * 3.0;

    /// Energy = K / wavelength (E = hc/λ analog)
    pub const ENERGY_CONSTANT: f64 = 100_000.0;

    /// Beam emitter
    pub const BEAM_ORIGIN_X: f64 = 50.0;
    pub const BEAM_ORIGIN_Y: f64 = BOUNDS_HEIGHT / 2.0;
    /// Half-width of the angular spread around +x (radians)
    pub const BEAM_SPREAD: f64 = 0.15;

    /// Emitted wavelength range: visible plus some UV/IR
    pub const WAVELENGTH_MIN: f64 = 350.0;
    pub const WAVELENGTH_MAX: f64 = 800.0;

    /// Unconsumed frames the data channel may hold before new ones are dropped
    pub const FRAME_BACKLOG: usize = 2;

    /// Absolute window for the post-collision energy correction
    pub const ENERGY_CORRECTION_TOLERANCE: f64 = 0.01;
    /// Extra push applied on top of half the overlap when separating
    pub const SEPARATION_SLOP: f64 = 0.1;
}

/// Arena size as a vector
#[inline]
pub fn bounds() -> DVec2 {
    DVec2::new(consts::BOUNDS_WIDTH, consts::BOUNDS_HEIGHT)
}

/// Beam origin point
#[inline]
pub fn beam_origin() -> DVec2 {
    DVec2::new(consts::BEAM_ORIGIN_X, consts::BEAM_ORIGIN_Y)
}

/// Unit vector at `theta` radians from +x
#[inline]
pub fn unit_from_angle(theta: f64) -> DVec2 {
    DVec2::new(theta.cos(), theta.sin())
}
