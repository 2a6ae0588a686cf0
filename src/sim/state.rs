//! Simulation state and run-state machine
//!
//! Everything a tick reads or writes lives here. Parameters are not stored;
//! the engine passes them in so updates can only land between ticks.

use glam::DVec2;
use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::SpatialGrid;
use super::particle::Particle;
use crate::consts::*;
use crate::protocol::Command;
use crate::{beam_origin, unit_from_angle};

/// Whether the engine advances physics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    /// Seed the RNG was created from
    pub seed: u64,
    /// Emission and separation randomness
    pub rng: Pcg32,
    pub run_state: RunState,
    /// Live particles, ascending by id
    pub particles: Vec<Particle>,
    /// Neighbor index, rebuilt every tick
    pub grid: SpatialGrid,
    /// Particles still to emit from the current beam
    pub beam_queue: u32,
    /// Physics ticks executed since start
    pub tick: u64,
    /// Collisions resolved since the last clear
    pub collisions: u64,
    /// Next particle id
    next_id: u64,
}

impl SimState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            run_state: RunState::Stopped,
            particles: Vec::new(),
            grid: SpatialGrid::new(GRID_CELL_SIZE),
            beam_queue: 0,
            tick: 0,
            collisions: 0,
            next_id: 0,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Id the next spawned particle will get
    #[inline]
    pub fn peek_next_id(&self) -> u64 {
        self.next_id
    }

    /// Allocate a new particle id
    fn next_particle_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a particle with a fresh id and return the id
    pub fn spawn(&mut self, pos: DVec2, vel: DVec2, wavelength: f64) -> u64 {
        let id = self.next_particle_id();
        self.particles.push(Particle::new(id, pos, vel, wavelength));
        id
    }

    /// Emit one beam particle: fixed origin, small random spread, random wavelength
    pub fn emit_beam_particle(&mut self) -> u64 {
        let spread = self.rng.random_range(-BEAM_SPREAD..=BEAM_SPREAD);
        let wavelength = self.rng.random_range(WAVELENGTH_MIN..=WAVELENGTH_MAX);
        let vel = unit_from_angle(spread) * SPEED_OF_LIGHT;
        self.spawn(beam_origin(), vel, wavelength)
    }

    /// Apply a control command. `photons_per_burst` sizes a FIRE.
    pub fn apply_command(&mut self, command: Command, photons_per_burst: u32) {
        match command {
            Command::Start => {
                self.run_state = RunState::Running;
                info!("Simulation started");
            }
            Command::Stop => {
                self.run_state = RunState::Stopped;
                info!("Simulation stopped at tick {}", self.tick);
            }
            Command::Fire => {
                self.beam_queue = photons_per_burst;
                self.run_state = RunState::Running;
                info!("Beam fired: {} photons queued", photons_per_burst);
            }
            Command::Clear => self.clear(),
        }
    }

    /// Remove all particles and reset ids and the collision counter
    pub fn clear(&mut self) {
        self.particles.clear();
        self.grid.clear();
        self.beam_queue = 0;
        self.next_id = 0;
        self.collisions = 0;
        info!("Cleared all photons");
    }

    /// Sum of particle energies
    pub fn total_energy(&self) -> f64 {
        self.particles.iter().map(Particle::energy).sum()
    }

    /// Sum of particle momentum vectors
    pub fn total_momentum(&self) -> DVec2 {
        self.particles.iter().map(Particle::momentum).sum()
    }

    /// First particle whose state is not finite
    pub fn find_non_finite(&self) -> Option<u64> {
        self.particles.iter().find(|p| !p.is_finite()).map(|p| p.id)
    }

    /// Return to a consistent state after a failed tick.
    ///
    /// Drops particles with non-finite state and the stale grid; everything
    /// else, including ids already handed out, is kept.
    pub fn recover(&mut self) {
        let before = self.particles.len();
        self.particles.retain(Particle::is_finite);
        let dropped = before - self.particles.len();
        if dropped > 0 {
            warn!("Dropped {} corrupted photon(s) during recovery", dropped);
        }
        self.grid.clear();
    }
}
