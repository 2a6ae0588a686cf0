//! Collision response for photon-like particles
//!
//! Pairwise collisions trade energy (wavelength) along the line of centers and
//! reflect the along-axis component of each direction. Speed never changes.

use glam::DVec2;
use rand::Rng;

use super::particle::Particle;
use super::vector::Vector2DExt;
use crate::consts::*;

/// Energy bookkeeping of one resolved collision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyExchange {
    /// Energies before the collision
    pub before: (f64, f64),
    /// Sum after transfer and decay, before the numerical correction
    pub uncorrected_sum: f64,
    /// Energies written back to the particles
    pub after: (f64, f64),
    /// Whether the tolerance-gated correction was applied
    pub corrected: bool,
}

impl EnergyExchange {
    pub fn total_before(&self) -> f64 {
        self.before.0 + self.before.1
    }

    pub fn total_after(&self) -> f64 {
        self.after.0 + self.after.1
    }
}

/// Resolve a collision between two particles already in contact.
///
/// Only `p1` and `p2` are mutated. The exchange follows a fixed recipe:
/// transfer `min(E1, E2) * |v1·n - v2·n| / 2` from the higher-energy particle
/// to the other, scale both by `1 - decay`, nudge the sum back to the expected
/// total when within `ENERGY_CORRECTION_TOLERANCE`, then mirror both
/// directions across the tangent line.
pub fn resolve_collision(p1: &mut Particle, p2: &mut Particle, global_decay: f64) -> EnergyExchange {
    let e1 = p1.energy();
    let e2 = p2.energy();
    let e_total = e1 + e2;

    // Collision normal (from p2 to p1)
    let mut axis = (p1.pos - p2.pos).direction();
    if axis.magnitude() == 0.0 {
        axis = DVec2::X;
    }

    let v1_dir = p1.vel.direction();
    let v2_dir = p2.vel.direction();
    let v1_along = v1_dir.along(axis);
    let v2_along = v2_dir.along(axis);

    // Head-on hits move the most energy, glancing ones almost none
    let efficiency = (v1_along - v2_along).abs();
    let transfer = e1.min(e2) * (efficiency * 0.5);

    let (mut e1_final, mut e2_final) = if e1 > e2 {
        (e1 - transfer, e2 + transfer)
    } else {
        (e1 + transfer, e2 - transfer)
    };

    if global_decay > 0.0 {
        e1_final *= 1.0 - global_decay;
        e2_final *= 1.0 - global_decay;
    }

    let expected = e_total * (1.0 - global_decay);
    let uncorrected_sum = e1_final + e2_final;
    // Only small float drift is corrected; larger deviations are left alone
    let corrected = uncorrected_sum > 0.0
        && (uncorrected_sum - expected).abs() < ENERGY_CORRECTION_TOLERANCE;
    if corrected {
        let factor = expected / uncorrected_sum;
        e1_final *= factor;
        e2_final *= factor;
    }

    p1.set_energy(e1_final);
    p2.set_energy(e2_final);

    p1.set_direction(reflect_along(v1_dir, axis, v1_along));
    p2.set_direction(reflect_along(v2_dir, axis, v2_along));

    EnergyExchange {
        before: (e1, e2),
        uncorrected_sum,
        after: (p1.energy(), p2.energy()),
        corrected,
    }
}

/// Negate the `axis` component of `dir`, keep the tangential part.
///
/// Falls back to `dir` when the result has no direction.
fn reflect_along(dir: DVec2, axis: DVec2, along: f64) -> DVec2 {
    let tangent = dir - axis * along;
    let reflected = (tangent + axis * -along).direction();
    if reflected == DVec2::ZERO { dir } else { reflected }
}

/// Push two overlapping particles apart along their line of centers.
///
/// `distance` is the separation measured at detection time. Each particle
/// moves `overlap / 2 + SEPARATION_SLOP`; coincident particles get a random
/// diagonal.
pub fn separate_overlap<R: Rng>(
    p1: &mut Particle,
    p2: &mut Particle,
    distance: f64,
    radius: f64,
    rng: &mut R,
) {
    let overlap = radius * 2.0 - distance;
    if overlap <= 0.0 {
        return;
    }

    let mut separation = (p1.pos - p2.pos).direction();
    if separation.magnitude() == 0.0 {
        let sx = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let sy = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        separation = DVec2::new(sx, sy).direction();
    }

    let push = separation * (overlap * 0.5 + SEPARATION_SLOP);
    p1.pos += push;
    p2.pos -= push;
}

/// Reflect a particle off the arena walls (inset by `radius`).
///
/// At or beyond a wall, that velocity component flips and the position is
/// clamped back inside. A hit costs `decay / 2` of the particle's energy.
/// Returns true when any wall was touched.
pub fn reflect_off_walls(p: &mut Particle, bounds: DVec2, radius: f64, global_decay: f64) -> bool {
    let mut hit_wall = false;

    if p.pos.x <= radius || p.pos.x >= bounds.x - radius {
        p.vel.x = -p.vel.x;
        p.pos.x = p.pos.x.clamp(radius, bounds.x - radius);
        hit_wall = true;
    }

    if p.pos.y <= radius || p.pos.y >= bounds.y - radius {
        p.vel.y = -p.vel.y;
        p.pos.y = p.pos.y.clamp(radius, bounds.y - radius);
        hit_wall = true;
    }

    if hit_wall && global_decay > 0.0 {
        p.set_energy(p.energy() * (1.0 - global_decay * 0.5));
    }

    hit_wall
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_from_angle;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn photon(id: u64, pos: DVec2, dir: DVec2, wavelength: f64) -> Particle {
        Particle::new(id, pos, dir.direction() * SPEED_OF_LIGHT, wavelength)
    }

    #[test]
    fn test_head_on_collision() {
        let mut a = photon(0, DVec2::new(100.0, 100.0), DVec2::X, 400.0);
        let mut b = photon(1, DVec2::new(110.0, 100.0), -DVec2::X, 700.0);

        let ex = resolve_collision(&mut a, &mut b, 0.0);

        // Both along-axis components reverse
        assert!((a.vel - DVec2::new(-SPEED_OF_LIGHT, 0.0)).length() < 1e-9);
        assert!((b.vel - DVec2::new(SPEED_OF_LIGHT, 0.0)).length() < 1e-9);

        // Full transfer of min(E) from the hotter particle (a, 250) to b (~142.9)
        let e_b = ENERGY_CONSTANT / 700.0;
        assert!((ex.after.0 - (250.0 - e_b)).abs() < 1e-6);
        assert!((ex.after.1 - 2.0 * e_b).abs() < 1e-6);
        assert!((ex.total_after() - ex.total_before()).abs() < 1e-9);
        assert!(ex.corrected);
    }

    #[test]
    fn test_equal_energy_takes_else_branch() {
        // Equal energies: energy flows from p2 into p1
        let mut a = photon(0, DVec2::new(100.0, 100.0), DVec2::X, 500.0);
        let mut b = photon(1, DVec2::new(110.0, 100.0), -DVec2::X, 500.0);

        let ex = resolve_collision(&mut a, &mut b, 0.0);

        assert!((ex.after.0 - 400.0).abs() < 1e-6);
        // p2 drains to zero, which clamps to the minimum energy of 1.0
        assert_eq!(b.wavelength, ENERGY_CONSTANT);
        assert!(b.energy() > 0.0);
    }

    #[test]
    fn test_glancing_collision_transfers_little() {
        // Parallel travel perpendicular to the axis: no along-axis component
        let mut a = photon(0, DVec2::new(100.0, 100.0), DVec2::Y, 400.0);
        let mut b = photon(1, DVec2::new(110.0, 100.0), DVec2::Y, 700.0);

        let ex = resolve_collision(&mut a, &mut b, 0.0);

        assert!((ex.after.0 - 250.0).abs() < 1e-9);
        assert!((a.vel - DVec2::Y * SPEED_OF_LIGHT).length() < 1e-9);
    }

    #[test]
    fn test_coincident_positions_use_x_axis() {
        let mut a = photon(0, DVec2::new(100.0, 100.0), DVec2::X, 400.0);
        let mut b = photon(1, DVec2::new(100.0, 100.0), DVec2::Y, 400.0);

        resolve_collision(&mut a, &mut b, 0.0);

        // a's x component reflects, b is untouched along x
        assert!((a.vel - DVec2::new(-SPEED_OF_LIGHT, 0.0)).length() < 1e-9);
        assert!((b.vel - DVec2::new(0.0, SPEED_OF_LIGHT)).length() < 1e-9);
    }

    #[test]
    fn test_decay_reduces_total() {
        let mut a = photon(0, DVec2::new(100.0, 100.0), DVec2::X, 400.0);
        let mut b = photon(1, DVec2::new(110.0, 100.0), -DVec2::X, 700.0);
        let decay = 0.1;

        let ex = resolve_collision(&mut a, &mut b, decay);

        let expected = ex.total_before() * (1.0 - decay);
        assert!((ex.total_after() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_separate_overlap_pushes_apart() {
        let mut a = photon(0, DVec2::new(100.0, 100.0), DVec2::X, 400.0);
        let mut b = photon(1, DVec2::new(110.0, 100.0), -DVec2::X, 400.0);
        let mut rng = Pcg32::seed_from_u64(1);

        separate_overlap(&mut a, &mut b, 10.0, COLLISION_RADIUS, &mut rng);

        // overlap 6 -> each moves 3.1
        assert!((a.pos.x - 96.9).abs() < 1e-9);
        assert!((b.pos.x - 113.1).abs() < 1e-9);
        assert!(a.pos.distance(b.pos) > COLLISION_RADIUS * 2.0);
    }

    #[test]
    fn test_separate_coincident_uses_diagonal() {
        let mut a = photon(0, DVec2::new(100.0, 100.0), DVec2::X, 400.0);
        let mut b = photon(1, DVec2::new(100.0, 100.0), -DVec2::X, 400.0);
        let mut rng = Pcg32::seed_from_u64(7);

        separate_overlap(&mut a, &mut b, 0.0, COLLISION_RADIUS, &mut rng);

        let d = a.pos - b.pos;
        assert!((d.x.abs() - d.y.abs()).abs() < 1e-9);
        assert!((d.length() - 2.0 * (COLLISION_RADIUS + SEPARATION_SLOP)).abs() < 1e-9);
    }

    #[test]
    fn test_separate_no_overlap_is_noop() {
        let mut a = photon(0, DVec2::new(100.0, 100.0), DVec2::X, 400.0);
        let mut b = photon(1, DVec2::new(120.0, 100.0), -DVec2::X, 400.0);
        let mut rng = Pcg32::seed_from_u64(1);

        separate_overlap(&mut a, &mut b, 20.0, COLLISION_RADIUS, &mut rng);

        assert_eq!(a.pos, DVec2::new(100.0, 100.0));
        assert_eq!(b.pos, DVec2::new(120.0, 100.0));
    }

    #[test]
    fn test_wall_clamp_and_flip() {
        let mut p = photon(0, DVec2::new(COLLISION_RADIUS - 1.0, 300.0), -DVec2::X, 500.0);

        let hit = reflect_off_walls(&mut p, crate::bounds(), COLLISION_RADIUS, 0.0);

        assert!(hit);
        assert_eq!(p.pos.x, COLLISION_RADIUS);
        assert!(p.vel.x > 0.0);
        assert_eq!(p.wavelength, 500.0);
    }

    #[test]
    fn test_wall_corner_decay_applied_once() {
        let mut p = photon(0, DVec2::new(795.0, 595.0), DVec2::ONE, 500.0);

        let hit = reflect_off_walls(&mut p, crate::bounds(), COLLISION_RADIUS, 0.2);

        assert!(hit);
        assert!(p.vel.x < 0.0 && p.vel.y < 0.0);
        assert_eq!(p.pos, DVec2::new(792.0, 592.0));
        assert!((p.energy() - 200.0 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_inside_walls_untouched() {
        let mut p = photon(0, DVec2::new(400.0, 300.0), DVec2::ONE, 500.0);
        let before = p.clone();
        assert!(!reflect_off_walls(&mut p, crate::bounds(), COLLISION_RADIUS, 0.5));
        assert_eq!(p, before);
    }

    proptest! {
        #[test]
        fn prop_collision_keeps_speed_and_energy(
            x1 in 10.0..790.0f64, y1 in 10.0..590.0f64,
            dx in -15.0..15.0f64, dy in -15.0..15.0f64,
            a1 in -3.2..3.2f64, a2 in -3.2..3.2f64,
            w1 in WAVELENGTH_MIN..WAVELENGTH_MAX,
            w2 in WAVELENGTH_MIN..WAVELENGTH_MAX,
        ) {
            let mut a = photon(0, DVec2::new(x1, y1), unit_from_angle(a1), w1);
            let mut b = photon(1, DVec2::new(x1 + dx, y1 + dy), unit_from_angle(a2), w2);

            let ex = resolve_collision(&mut a, &mut b, 0.0);

            prop_assert!((a.vel.length() - SPEED_OF_LIGHT).abs() < SPEED_OF_LIGHT * 1e-6);
            prop_assert!((b.vel.length() - SPEED_OF_LIGHT).abs() < SPEED_OF_LIGHT * 1e-6);
            prop_assert!(a.wavelength > 0.0 && b.wavelength > 0.0);
            prop_assert!(a.energy() > 0.0 && b.energy() > 0.0);
            prop_assert!((ex.uncorrected_sum - ex.total_before()).abs() < ENERGY_CORRECTION_TOLERANCE);
            prop_assert!(ex.corrected);
            prop_assert!((ex.total_after() - ex.total_before()).abs() < ex.total_before() * 1e-9);
        }
    }
}
