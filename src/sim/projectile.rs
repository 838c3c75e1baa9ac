//! Lasers and rockets

use glam::DVec2;

use super::collision::Collider;
use super::context::{Context, Effect};
use super::entity::{Entity, EntityId, Explosion};
use super::events::DamageType;
use crate::consts::*;
use crate::geometry::Size;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Laser,
    Rocket,
}

impl ProjectileKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Laser => "laser",
            Self::Rocket => "rocket",
        }
    }

    pub fn damage_type(self) -> DamageType {
        match self {
            Self::Laser => DamageType::Laser,
            Self::Rocket => DamageType::Rocket,
        }
    }

    pub fn speed(self) -> f64 {
        match self {
            Self::Laser => LASER_VELOCITY_SEC,
            Self::Rocket => ROCKET_VELOCITY_SEC,
        }
    }

    pub fn lifespan_sec(self) -> f64 {
        match self {
            Self::Laser => LASER_LIFESPAN_SEC,
            Self::Rocket => ROCKET_LIFESPAN_SEC,
        }
    }

    pub fn damage(self) -> f64 {
        match self {
            Self::Laser => LASER_DAMAGE,
            Self::Rocket => ROCKET_DAMAGE,
        }
    }

    /// Explosion radius and duration left behind on impact
    pub fn explosion(self) -> (f64, f64) {
        match self {
            Self::Laser => (LASER_EXPLOSION_RADIUS, LASER_EXPLOSION_DURATION_SEC),
            Self::Rocket => (ROCKET_EXPLOSION_RADIUS, ROCKET_EXPLOSION_DURATION_SEC),
        }
    }

    /// Lasers are thin oriented bolts, rockets detonate within a radius
    pub fn collider(self, position: DVec2, rotation: f64) -> Collider {
        match self {
            Self::Laser => Collider::square(position, rotation, Size::new(LASER_WIDTH, LASER_LENGTH)),
            Self::Rocket => Collider::circle(position, ROCKET_DETONATE_RADIUS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub(crate) id: EntityId,
    pub(crate) kind: ProjectileKind,
    pub(crate) enabled: bool,
    pub(crate) position: DVec2,
    pub(crate) rotation: f64,
    pub(crate) velocity: DVec2,
    pub(crate) lifespan_sec: f64,
    pub(crate) damage: f64,
    /// Ship that fired this projectile
    pub(crate) owner: EntityId,
    pub(crate) explosion_radius: f64,
    pub(crate) explosion_duration_sec: f64,
    pub(crate) collider: Collider,
}

impl Projectile {
    /// Projectile flying along `rotation` at the speed of its kind
    pub fn new(id: EntityId, kind: ProjectileKind, position: DVec2, rotation: f64, owner: EntityId) -> Self {
        let (explosion_radius, explosion_duration_sec) = kind.explosion();
        Self {
            id,
            kind,
            enabled: true,
            position,
            rotation,
            velocity: DVec2::from_angle(rotation) * kind.speed(),
            lifespan_sec: kind.lifespan_sec(),
            damage: kind.damage(),
            owner,
            explosion_radius,
            explosion_duration_sec,
            collider: kind.collider(position, rotation),
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> ProjectileKind {
        self.kind
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
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[inline]
    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    #[inline]
    pub fn lifespan_sec(&self) -> f64 {
        self.lifespan_sec
    }

    #[inline]
    pub fn damage(&self) -> f64 {
        self.damage
    }

    #[inline]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    #[inline]
    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    pub fn set_position(&mut self, position: DVec2) {
        self.position = position;
        self.collider.set_position(position);
    }

    pub fn update(&mut self, dt_ms: f64, ctx: &mut Context) {
        let dt = dt_ms / 1000.0;

        self.lifespan_sec -= dt;
        if self.lifespan_sec <= 0.0 {
            // Expired projectiles fizzle out
            self.destroy(false, ctx);
            return;
        }

        self.set_position(self.position + self.velocity * dt);
    }

    /// Hits on any ship but the owner deal damage and score for the owner
    pub fn on_collision(&mut self, other: &mut Entity, ctx: &mut Context) {
        if let Entity::Spaceship(ship) = other {
            if ship.id() == self.owner {
                return;
            }

            ctx.push(Effect::Damage {
                dealer: self.owner,
                target: ship.id(),
                amount: self.damage,
                damage_type: self.kind.damage_type(),
            });
            ship.take_damage(self.damage, Some(self.owner), ctx);
            ctx.push(Effect::Score {
                ship: self.owner,
                amount: self.damage * SCORE_PER_DAMAGE_COEFFICIENT,
            });
        }

        self.destroy(true, ctx);
    }

    fn destroy(&mut self, explode: bool, ctx: &mut Context) {
        self.lifespan_sec = 0.0;
        self.enabled = false;
        ctx.despawn(self.id);
        if explode {
            Explosion::spawn_at(ctx, self.position, self.explosion_radius, self.explosion_duration_sec);
        }
    }
}
