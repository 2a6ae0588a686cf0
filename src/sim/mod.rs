//! Fixed-timestep simulation module
//!
//! All physics lives here. This module must stay single-threaded and seeded:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by particle id)
//! - No channel, timing or rendering dependencies

pub mod collision;
pub mod grid;
pub mod particle;
pub mod state;
pub mod tick;
pub mod vector;

pub use collision::{EnergyExchange, reflect_off_walls, resolve_collision, separate_overlap};
pub use grid::SpatialGrid;
pub use particle::Particle;
pub use state::{RunState, SimState};
pub use tick::{TickStats, tick};
pub use vector::{Vector2D, Vector2DExt};
