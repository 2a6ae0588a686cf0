//! Fixed timestep simulation tick
//!
//! One tick: emit, integrate, bounce off walls, rebuild the grid, resolve
//! collisions, then aggregate statistics. Control input and frame export are
//! handled by the engine around this.

use std::collections::HashSet;

use glam::DVec2;

use super::collision::{reflect_off_walls, resolve_collision, separate_overlap};
use super::state::SimState;
use crate::bounds;
use crate::consts::*;
use crate::error::TickError;
use crate::settings::SimParams;

/// Aggregates computed at the end of a tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickStats {
    /// Particles alive after the tick
    pub count: usize,
    /// Particle emitted this tick, if any
    pub emitted: Option<u64>,
    pub wall_hits: usize,
    /// Collisions resolved this tick
    pub collisions: usize,
    pub total_energy: f64,
    pub total_momentum: DVec2,
}

/// Advance the simulation by one fixed timestep.
///
/// Does not check the run state and does not bump `state.tick`; the engine
/// does both so a faulted tick is not counted.
pub fn tick(state: &mut SimState, params: &SimParams, dt: f64) -> Result<TickStats, TickError> {
    let mut stats = TickStats::default();

    // --- Emission ---
    if state.beam_queue > 0 {
        stats.emitted = Some(state.emit_beam_particle());
        state.beam_queue -= 1;
    }

    // --- Movement and walls ---
    let step = dt * params.time_scale;
    let arena = bounds();
    for p in state.particles.iter_mut() {
        p.pos += p.vel * step;
        if reflect_off_walls(p, arena, COLLISION_RADIUS, params.global_decay) {
            stats.wall_hits += 1;
        }
    }

    // --- Collision detection and response ---
    state.grid.rebuild(&state.particles);
    stats.collisions = resolve_contacts(state, params.global_decay).len();
    state.collisions += stats.collisions as u64;

    if let Some(id) = state.find_non_finite() {
        return Err(TickError::NonFinite { id });
    }

    stats.count = state.particles.len();
    stats.total_energy = state.total_energy();
    stats.total_momentum = state.total_momentum();
    Ok(stats)
}

/// Resolve every touching pair once, in ascending id order.
///
/// Returns the resolved `(lower id, higher id)` pairs in resolution order.
fn resolve_contacts(state: &mut SimState, global_decay: f64) -> Vec<(u64, u64)> {
    let SimState {
        particles,
        grid,
        rng,
        ..
    } = state;

    let contact_distance = COLLISION_RADIUS * 2.0;
    let mut processed: HashSet<(u64, u64)> = HashSet::new();
    let mut candidates: Vec<usize> = Vec::new();
    let mut resolved = Vec::new();

    for i in 0..particles.len() {
        candidates.clear();
        candidates.extend(grid.neighbors(particles[i].pos));

        for &j in &candidates {
            let (id_i, id_j) = (particles[i].id, particles[j].id);
            // Lower id owns the pair; also skips self
            if id_i >= id_j {
                continue;
            }
            if processed.contains(&(id_i, id_j)) {
                continue;
            }

            let distance = particles[i].pos.distance(particles[j].pos);
            if distance < contact_distance {
                processed.insert((id_i, id_j));
                resolved.push((id_i, id_j));

                let (p1, p2) = pair_mut(particles, i, j);
                resolve_collision(p1, p2, global_decay);
                separate_overlap(p1, p2, distance, COLLISION_RADIUS, rng);
            }
        }
    }

    resolved
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (head, tail) = items.split_at_mut(b);
        (&mut head[a], &mut tail[0])
    } else {
        let (head, tail) = items.split_at_mut(a);
        (&mut tail[0], &mut head[b])
    }
}
