//! Asteroid field seeding
//!
//! Only uniform `[0, 1)` floats are drawn, so the same seed always yields the
//! same field.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Asteroid, Entity};
use super::registry::IdAllocator;
use super::state::Game;
use crate::consts::*;
use crate::geometry::Size;

/// Draw a field of non-overlapping asteroids inside `size`
///
/// Every candidate draw, accepted or not, spends one of
/// `ASTEROID_SEED_ATTEMPTS`; a crowded arena may end up with fewer asteroids
/// than the drawn count.
pub fn seed_field<R: Rng>(rng: &mut R, size: Size, ids: &mut IdAllocator) -> Vec<Asteroid> {
    let spread = (MAX_ASTEROIDS - MIN_ASTEROIDS + 1) as f64;
    let count = (MIN_ASTEROIDS + (rng.random::<f64>() * spread) as usize).min(MAX_ASTEROIDS);

    let mut asteroids: Vec<Asteroid> = Vec::with_capacity(count);
    let mut attempts = ASTEROID_SEED_ATTEMPTS;
    while asteroids.len() < count && attempts > 0 {
        attempts -= 1;

        let radius = rng.random::<f64>() * (MAX_ASTEROID_SIZE - MIN_ASTEROID_SIZE) + MIN_ASTEROID_SIZE;
        let x = radius + rng.random::<f64>() * (size.width - 2.0 * radius);
        let y = radius + rng.random::<f64>() * (size.height - 2.0 * radius);
        let position = DVec2::new(x, y);

        let crowded = asteroids.iter().any(|other| {
            other.position.distance(position) < radius + other.radius + MIN_ASTEROID_SEPARATION
        });
        if crowded {
            continue;
        }

        asteroids.push(Asteroid::new(ids.next(), position, radius));
    }

    asteroids
}

impl Game {
    /// Seed the asteroid field from the game seed; returns how many were placed
    pub fn seed_asteroids(&mut self) -> usize {
        let mut rng = Pcg32::seed_from_u64(self.seed);
        let field = seed_field(&mut rng, self.size, self.registry.ids_mut());
        let placed = field.len();
        for asteroid in field {
            self.registry.add(Entity::Asteroid(asteroid));
        }

        log::info!("Seeded {placed} asteroids from seed {}", self.seed);
        placed
    }
}
