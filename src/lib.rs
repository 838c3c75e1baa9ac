//! Space Wars - a deterministic 2D space combat simulation kernel
//!
//! Core modules:
//! - `geometry`: Vector and polygon math
//! - `sim`: Deterministic simulation (colliders, entities, tick, registry)
//! - `snapshot`: Serializable world state
//! - `scoreboard`: Standings derived from a finished round
//! - `settings`: Headless runner configuration

pub mod error;
pub mod geometry;
pub mod scoreboard;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use error::{DecodeError, FireError, GameError, SettingsError, ThrustChannel, ThrustError};
pub use geometry::{Size, Vector2, VectorExt};
pub use scoreboard::{Scoreboard, Standing};
pub use settings::Settings;
pub use sim::{Game, Status};
pub use snapshot::WorldState;

/// Gameplay tuning constants
pub mod consts {
    // Asteroid field
    pub const MIN_ASTEROIDS: usize = 2;
    pub const MAX_ASTEROIDS: usize = 7;
    pub const MIN_ASTEROID_SIZE: f64 = 10.0;
    pub const MAX_ASTEROID_SIZE: f64 = 30.0;
    /// Minimum gap between two seeded asteroids
    pub const MIN_ASTEROID_SEPARATION: f64 = 10.0;
    /// Candidate draws allowed while seeding one field
    pub const ASTEROID_SEED_ATTEMPTS: usize = 1000;

    // Ship
    pub const SHIP_SIZE: f64 = 30.0;
    pub const MAX_HEALTH: f64 = 100.0;
    pub const MAX_ENERGY: f64 = 100.0;
    pub const MAX_THRUST: f64 = 100.0;
    /// Edge to edge of a 1920 wide arena in 10 seconds
    pub const MAX_VELOCITY_SEC: f64 = 1920.0 / 10.0;
    /// Reaches max velocity in about 5 seconds of full main thrust, drag included
    pub const ACCELERATION_COEFFICIENT: f64 = 0.325 * MAX_VELOCITY_SEC;
    /// Coasting drops below 10% of max velocity in about 10 seconds
    pub const DRAG_COEFFICIENT: f64 = 0.2385 * MAX_VELOCITY_SEC;
    /// Side thrusters relative to the main engine
    pub const SIDE_THRUST_POWER_COEFFICIENT: f64 = 0.5;
    pub const ENERGY_CONSUMPTION_MAIN_THRUST_SEC: f64 = MAX_ENERGY / 8.0;
    pub const ENERGY_CONSUMPTION_SIDE_THRUST_SEC: f64 = MAX_ENERGY / 15.0;
    pub const ENERGY_RECHARGE_RATE_SEC: f64 = MAX_ENERGY / 8.0;
    pub const SHIP_EXPLOSION_RADIUS: f64 = 30.0;
    pub const SHIP_EXPLOSION_DURATION_SEC: f64 = 1.0;

    // Scoring
    pub const SCORE_PER_KILL: f64 = 100.0;
    pub const SCORE_PER_DAMAGE_COEFFICIENT: f64 = 0.5;
    pub const SCORE_PER_SURVIVOR: f64 = 50.0;

    // Laser
    pub const LASER_RELOAD_SEC: f64 = 0.25;
    pub const ENERGY_CONSUMPTION_LASER: f64 = 6.0;
    pub const LASER_LIFESPAN_SEC: f64 = 5.0;
    pub const LASER_DAMAGE: f64 = 20.0;
    /// Edge to edge of a 1920 wide arena in 6 seconds
    pub const LASER_VELOCITY_SEC: f64 = 1920.0 / 6.0;
    pub const LASER_WIDTH: f64 = 2.0;
    pub const LASER_LENGTH: f64 = 12.0;
    pub const LASER_EXPLOSION_RADIUS: f64 = 15.0;
    pub const LASER_EXPLOSION_DURATION_SEC: f64 = 0.75;

    // Rocket
    pub const MAX_ROCKETS: u32 = 10;
    pub const ROCKET_RELOAD_SEC: f64 = 1.0;
    pub const ENERGY_CONSUMPTION_ROCKET: f64 = 20.0;
    pub const ROCKET_LIFESPAN_SEC: f64 = 10.0;
    pub const ROCKET_DAMAGE: f64 = 60.0;
    /// Edge to edge of a 1920 wide arena in 7 seconds
    pub const ROCKET_VELOCITY_SEC: f64 = 1920.0 / 7.0;
    pub const ROCKET_DETONATE_RADIUS: f64 = 20.0;
    pub const ROCKET_EXPLOSION_RADIUS: f64 = 30.0;
    pub const ROCKET_EXPLOSION_DURATION_SEC: f64 = 1.0;

    /// Countdown between the penultimate destruction and the end of the round
    pub const GRACEFUL_END_MS: f64 = SHIP_EXPLOSION_DURATION_SEC * 1000.0 + 100.0;
}

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Convert radians to degrees
#[inline]
pub fn rad_to_deg(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// Float comparison with the tolerance used across the geometry tests
#[inline]
pub fn almost_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
