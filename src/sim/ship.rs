//! Spaceship flight model and combat state

use std::f64::consts::PI;

use glam::DVec2;

use super::collision::Collider;
use super::context::{CollisionPartner, Context, Effect};
use super::entity::{CollisionOrder, Entity, EntityId, Explosion};
use super::projectile::{Projectile, ProjectileKind};
use crate::consts::*;
use crate::error::{FireError, ThrustChannel, ThrustError};
use crate::geometry::VectorExt;

/// Thruster settings, each channel in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Engine {
    pub main_thrust: f64,
    pub left_thrust: f64,
    pub right_thrust: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spaceship {
    pub(crate) id: EntityId,
    pub(crate) name: String,
    pub(crate) enabled: bool,
    /// Heading in radians; follows the velocity vector while moving
    pub(crate) rotation: f64,
    pub(crate) start_rotation: f64,
    pub(crate) position: DVec2,
    pub(crate) start_position: DVec2,
    /// Muzzle relative to the ship centre at heading 0
    pub(crate) gun_offset: DVec2,
    pub(crate) velocity: DVec2,
    pub(crate) health: f64,
    pub(crate) energy: f64,
    pub(crate) engine: Engine,
    pub(crate) rockets: u32,
    pub(crate) kills: u32,
    pub(crate) score: f64,
    pub(crate) collider: Collider,
    pub(crate) laser_reload_sec: f64,
    pub(crate) rocket_reload_sec: f64,
}

impl Spaceship {
    pub fn new(id: EntityId, name: impl Into<String>, position: DVec2, rotation: f64) -> Self {
        let mut ship = Self {
            id,
            name: name.into(),
            enabled: true,
            rotation,
            start_rotation: rotation,
            position,
            start_position: position,
            gun_offset: DVec2::new(SHIP_SIZE / 2.0, 0.0),
            velocity: DVec2::ZERO,
            health: MAX_HEALTH,
            energy: MAX_ENERGY,
            engine: Engine::default(),
            rockets: MAX_ROCKETS,
            kills: 0,
            score: 0.0,
            collider: Collider::circle(position, SHIP_SIZE / 2.0),
            laser_reload_sec: 0.0,
            rocket_reload_sec: 0.0,
        };
        ship.reset();
        ship
    }

    /// Back to the start pose with full health, energy and rockets
    pub fn reset(&mut self) {
        self.enabled = true;
        self.set_position(self.start_position);
        self.rotation = self.start_rotation;
        self.health = MAX_HEALTH;
        self.energy = MAX_ENERGY;
        self.rockets = MAX_ROCKETS;
        self.engine = Engine::default();
        self.kills = 0;
        self.score = 0.0;
        self.velocity = DVec2::ZERO;
        self.laser_reload_sec = 0.0;
        self.rocket_reload_sec = 0.0;
        self.collider.set_enabled(true);
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        self.position
    }

    #[inline]
    pub fn start_position(&self) -> DVec2 {
        self.start_position
    }

    #[inline]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[inline]
    pub fn start_rotation(&self) -> f64 {
        self.start_rotation
    }

    #[inline]
    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    #[inline]
    pub fn health(&self) -> f64 {
        self.health
    }

    #[inline]
    pub fn energy(&self) -> f64 {
        self.energy
    }

    #[inline]
    pub fn engine(&self) -> Engine {
        self.engine
    }

    #[inline]
    pub fn rockets(&self) -> u32 {
        self.rockets
    }

    #[inline]
    pub fn kills(&self) -> u32 {
        self.kills
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    pub fn laser_reload_sec(&self) -> f64 {
        self.laser_reload_sec
    }

    #[inline]
    pub fn rocket_reload_sec(&self) -> f64 {
        self.rocket_reload_sec
    }

    #[inline]
    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }

    pub fn set_position(&mut self, position: DVec2) {
        self.position = position;
        self.collider.set_position(position);
    }

    /// Pose the ship returns to on reset
    pub fn set_start_position(&mut self, position: DVec2, rotation: f64) {
        self.start_position = position;
        self.start_rotation = rotation;
    }

    /// Set all three thrusters at once; nothing changes if any value is invalid
    pub fn set_engine_thrust(&mut self, main: f64, left: f64, right: f64) -> Result<(), ThrustError> {
        for (channel, value) in [
            (ThrustChannel::Main, main),
            (ThrustChannel::Left, left),
            (ThrustChannel::Right, right),
        ] {
            if !(0.0..=MAX_THRUST).contains(&value) {
                return Err(ThrustError::OutOfRange { channel });
            }
        }

        self.engine = Engine {
            main_thrust: main,
            left_thrust: left,
            right_thrust: right,
        };
        Ok(())
    }

    pub fn fire_laser(&mut self, ctx: &mut Context) -> Result<(), FireError> {
        if self.energy < ENERGY_CONSUMPTION_LASER {
            return Err(FireError::NotEnoughEnergy);
        }
        if self.laser_reload_sec > 0.0 {
            return Err(FireError::LaserCoolingDown);
        }

        self.energy -= ENERGY_CONSUMPTION_LASER;
        self.laser_reload_sec = LASER_RELOAD_SEC;
        self.launch(ProjectileKind::Laser, ctx);
        Ok(())
    }

    pub fn fire_rocket(&mut self, ctx: &mut Context) -> Result<(), FireError> {
        if self.rockets == 0 {
            return Err(FireError::NotEnoughRockets);
        }
        if self.energy < ENERGY_CONSUMPTION_ROCKET {
            return Err(FireError::NotEnoughEnergy);
        }
        if self.rocket_reload_sec > 0.0 {
            return Err(FireError::RocketCoolingDown);
        }

        self.rockets -= 1;
        self.energy -= ENERGY_CONSUMPTION_ROCKET;
        self.rocket_reload_sec = ROCKET_RELOAD_SEC;
        self.launch(ProjectileKind::Rocket, ctx);
        Ok(())
    }

    /// World position of the gun muzzle
    pub fn gun_position(&self) -> DVec2 {
        self.position + self.gun_offset.rotated(self.rotation)
    }

    fn launch(&self, kind: ProjectileKind, ctx: &mut Context) {
        let id = ctx.next_id();
        let projectile = Projectile::new(id, kind, self.gun_position(), self.rotation, self.id);
        ctx.spawn(Entity::Projectile(projectile));
    }

    pub fn add_score(&mut self, amount: f64) {
        self.score += amount;
    }

    /// Credit a kill
    pub fn record_kill(&mut self) {
        self.kills += 1;
        self.score += SCORE_PER_KILL;
    }

    /// Apply `damage`; `dealer` is credited with the kill if this destroys the ship
    pub fn take_damage(&mut self, damage: f64, dealer: Option<EntityId>, ctx: &mut Context) {
        self.health = (self.health - damage).max(0.0);
        if self.health > 0.0 {
            return;
        }

        self.destroy(ctx);
        if let Some(killer) = dealer {
            ctx.push(Effect::Kill {
                victim: self.id,
                killer,
            });
        }
    }

    fn destroy(&mut self, ctx: &mut Context) {
        self.enabled = false;
        Explosion::spawn_at(ctx, self.position, SHIP_EXPLOSION_RADIUS, SHIP_EXPLOSION_DURATION_SEC);
        ctx.push(Effect::ShipDestroyed(self.id));
    }

    /// Ramming an asteroid or another ship is fatal
    pub fn on_collision(&mut self, other: &Entity, order: CollisionOrder, ctx: &mut Context) {
        match other {
            Entity::Asteroid(_) => {
                self.take_damage(MAX_HEALTH, None, ctx);
                ctx.push(Effect::Collision {
                    ship: self.id,
                    with: CollisionPartner::Asteroid,
                });
            }
            Entity::Spaceship(ship) => {
                self.take_damage(MAX_HEALTH, None, ctx);
                // One log entry per colliding pair
                if order == CollisionOrder::First {
                    ctx.push(Effect::Collision {
                        ship: self.id,
                        with: CollisionPartner::Ship(ship.id),
                    });
                }
            }
            Entity::Projectile(_) | Entity::Explosion(_) => {}
        }
    }

    pub fn update(&mut self, dt_ms: f64) {
        let dt = dt_ms / 1000.0;

        self.cool_guns(dt);
        self.manage_energy(dt);
        if self.energy <= 0.0 {
            self.engine = Engine::default();
            return;
        }
        self.fly(dt);
    }

    fn cool_guns(&mut self, dt: f64) {
        self.laser_reload_sec = (self.laser_reload_sec - dt).max(0.0);
        self.rocket_reload_sec = (self.rocket_reload_sec - dt).max(0.0);
    }

    fn manage_energy(&mut self, dt: f64) {
        self.energy = (self.energy + dt * ENERGY_RECHARGE_RATE_SEC).min(MAX_ENERGY);

        let Engine {
            main_thrust,
            left_thrust,
            right_thrust,
        } = self.engine;
        self.energy -= main_thrust / MAX_THRUST * dt * ENERGY_CONSUMPTION_MAIN_THRUST_SEC;
        self.energy -= left_thrust / MAX_THRUST * dt * ENERGY_CONSUMPTION_SIDE_THRUST_SEC;
        self.energy -= right_thrust / MAX_THRUST * dt * ENERGY_CONSUMPTION_SIDE_THRUST_SEC;
        self.energy = self.energy.max(0.0);
    }

    fn fly(&mut self, dt: f64) {
        let forward = DVec2::X;
        let side = SIDE_THRUST_POWER_COEFFICIENT * dt * ACCELERATION_COEFFICIENT;

        let main = forward.rotated(self.rotation)
            * (self.engine.main_thrust / MAX_THRUST * dt * ACCELERATION_COEFFICIENT);
        let left = forward.rotated(self.rotation + PI / 2.0) * (self.engine.left_thrust / MAX_THRUST * side);
        let right = forward.rotated(self.rotation - PI / 2.0) * (self.engine.right_thrust / MAX_THRUST * side);
        let drag = forward.rotated(self.rotation + PI)
            * (self.velocity.length() / MAX_VELOCITY_SEC * dt * DRAG_COEFFICIENT);

        self.velocity = (self.velocity + main + left + right + drag).clamped(MAX_VELOCITY_SEC / dt);
        self.position += self.velocity * dt;
        if self.velocity.length() > 0.0 {
            self.rotation = self.velocity.y.atan2(self.velocity.x);
        }
        self.collider.set_position(self.position);
    }
}
