//! Photon-like particle
//!
//! Every particle travels at `SPEED_OF_LIGHT`; only its direction changes.
//! Wavelength is the stored quantity, energy is derived from it (E = K/λ).

use glam::DVec2;

use super::vector::Vector2DExt;
use crate::consts::*;

/// A photon-like particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Monotonic id, never reused until a clear
    pub id: u64,
    pub pos: DVec2,
    pub vel: DVec2,
    /// Always > 0
    pub wavelength: f64,
}

impl Particle {
    pub fn new(id: u64, pos: DVec2, vel: DVec2, wavelength: f64) -> Self {
        Self {
            id,
            pos,
            vel,
            wavelength,
        }
    }

    /// Energy; wavelengths below 1.0 are treated as 1.0 so this stays finite
    #[inline]
    pub fn energy(&self) -> f64 {
        ENERGY_CONSTANT / self.wavelength.max(1.0)
    }

    /// Set wavelength from a target energy.
    ///
    /// Non-positive energies, and energies so small the wavelength would
    /// overflow, clamp to 1.0.
    pub fn set_energy(&mut self, energy: f64) {
        let wavelength = ENERGY_CONSTANT / energy;
        self.wavelength = if energy <= 0.0 || !wavelength.is_finite() {
            ENERGY_CONSTANT
        } else {
            wavelength
        };
    }

    /// p = E/c
    #[inline]
    pub fn momentum_magnitude(&self) -> f64 {
        self.energy() / SPEED_OF_LIGHT
    }

    /// Momentum vector along the direction of travel
    pub fn momentum(&self) -> DVec2 {
        self.vel.direction() * self.momentum_magnitude()
    }

    /// Point the particle along `dir`, restoring speed to exactly c
    pub fn set_direction(&mut self, dir: DVec2) {
        self.vel = dir.direction() * SPEED_OF_LIGHT;
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.wavelength.is_finite()
    }
}
