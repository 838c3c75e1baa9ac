//! Entities living in the arena
//!
//! The set of entity kinds is closed, so dispatch is a `match` over
//! [`Entity`] rather than a trait object.

use glam::DVec2;

use super::collision::Collider;
use super::context::Context;
use super::projectile::Projectile;
use super::ship::Spaceship;

/// Unique within one game; also shared with log entries
pub type EntityId = u64;

/// Position of an entity in the collision pair being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOrder {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Asteroid(Asteroid),
    Spaceship(Spaceship),
    Projectile(Projectile),
    Explosion(Explosion),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Asteroid(a) => a.id,
            Entity::Spaceship(s) => s.id(),
            Entity::Projectile(p) => p.id(),
            Entity::Explosion(e) => e.id,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            Entity::Asteroid(a) => a.enabled,
            Entity::Spaceship(s) => s.enabled(),
            Entity::Projectile(p) => p.enabled(),
            Entity::Explosion(e) => e.enabled,
        }
    }

    pub fn position(&self) -> DVec2 {
        match self {
            Entity::Asteroid(a) => a.position,
            Entity::Spaceship(s) => s.position(),
            Entity::Projectile(p) => p.position(),
            Entity::Explosion(e) => e.position,
        }
    }

    /// Move the entity and its collider together
    pub fn set_position(&mut self, position: DVec2) {
        match self {
            Entity::Asteroid(a) => a.set_position(position),
            Entity::Spaceship(s) => s.set_position(position),
            Entity::Projectile(p) => p.set_position(position),
            Entity::Explosion(e) => e.position = position,
        }
    }

    /// Explosions are visual only and never collide
    pub fn collider(&self) -> Option<&Collider> {
        match self {
            Entity::Asteroid(a) => Some(&a.collider),
            Entity::Spaceship(s) => Some(s.collider()),
            Entity::Projectile(p) => Some(p.collider()),
            Entity::Explosion(_) => None,
        }
    }

    /// Short lowercase name of the kind, used in logs and snapshots
    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::Asteroid(_) => "asteroid",
            Entity::Spaceship(_) => "spaceship",
            Entity::Projectile(p) => p.kind().name(),
            Entity::Explosion(_) => "explosion",
        }
    }

    #[inline]
    pub fn as_ship(&self) -> Option<&Spaceship> {
        match self {
            Entity::Spaceship(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_ship_mut(&mut self) -> Option<&mut Spaceship> {
        match self {
            Entity::Spaceship(s) => Some(s),
            _ => None,
        }
    }

    /// Advance by `dt_ms` milliseconds; disabled entities are left untouched
    pub fn update(&mut self, dt_ms: f64, ctx: &mut Context) {
        if !self.enabled() {
            return;
        }
        match self {
            Entity::Asteroid(_) => {}
            Entity::Spaceship(s) => s.update(dt_ms),
            Entity::Projectile(p) => p.update(dt_ms, ctx),
            Entity::Explosion(e) => e.update(dt_ms, ctx),
        }
    }

    pub fn on_collision(&mut self, other: &mut Entity, order: CollisionOrder, ctx: &mut Context) {
        match self {
            Entity::Spaceship(s) => s.on_collision(other, order, ctx),
            Entity::Projectile(p) => p.on_collision(other, ctx),
            Entity::Asteroid(_) | Entity::Explosion(_) => {}
        }
    }
}

/// Static circular obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct Asteroid {
    pub id: EntityId,
    pub enabled: bool,
    pub position: DVec2,
    pub radius: f64,
    pub collider: Collider,
}

impl Asteroid {
    pub fn new(id: EntityId, position: DVec2, radius: f64) -> Self {
        Self {
            id,
            enabled: true,
            position,
            radius,
            collider: Collider::circle(position, radius),
        }
    }

    pub fn set_position(&mut self, position: DVec2) {
        self.position = position;
        self.collider.set_position(position);
    }
}

/// Short-lived blast left behind by a destroyed ship or projectile
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub id: EntityId,
    pub enabled: bool,
    pub position: DVec2,
    pub radius: f64,
    pub duration_sec: f64,
    pub lifespan_sec: f64,
}

impl Explosion {
    pub fn new(id: EntityId, position: DVec2, radius: f64, duration_sec: f64) -> Self {
        Self {
            id,
            enabled: true,
            position,
            radius,
            duration_sec,
            lifespan_sec: duration_sec,
        }
    }

    /// Queue an explosion of `radius` whose bounding box is centred on `centre`
    pub fn spawn_at(ctx: &mut Context, centre: DVec2, radius: f64, duration_sec: f64) {
        let id = ctx.next_id();
        let corner = centre - DVec2::splat(radius);
        ctx.spawn(Entity::Explosion(Explosion::new(id, corner, radius, duration_sec)));
    }

    pub fn update(&mut self, dt_ms: f64, ctx: &mut Context) {
        self.lifespan_sec -= dt_ms / 1000.0;
        if self.lifespan_sec <= 0.0 {
            self.lifespan_sec = 0.0;
            self.enabled = false;
            ctx.despawn(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::context::Effect;
    use crate::sim::registry::IdAllocator;

    #[test]
    fn test_explosion_burns_out() {
        let mut ids = IdAllocator::new();
        let mut explosion = Entity::Explosion(Explosion::new(1, DVec2::ZERO, 15.0, 0.75));

        let mut ctx = Context::new(&mut ids);
        explosion.update(500.0, &mut ctx);
        assert!(explosion.enabled());
        assert!(ctx.effects().is_empty());

        explosion.update(250.0, &mut ctx);
        assert!(!explosion.enabled());
        assert_eq!(ctx.into_effects(), vec![Effect::Despawn(1)]);

        let Entity::Explosion(e) = &explosion else {
            unreachable!()
        };
        assert_eq!(e.lifespan_sec, 0.0);
    }

    #[test]
    fn test_explosion_spawns_at_box_corner() {
        let mut ids = IdAllocator::new();
        let mut ctx = Context::new(&mut ids);
        Explosion::spawn_at(&mut ctx, DVec2::new(100.0, 100.0), 30.0, 1.0);

        match ctx.into_effects().as_slice() {
            [Effect::Spawn(Entity::Explosion(e))] => {
                assert_eq!(e.position, DVec2::new(70.0, 70.0));
                assert_eq!(e.lifespan_sec, 1.0);
                assert_eq!(e.id, 1);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_asteroid_is_inert() {
        let mut ids = IdAllocator::new();
        let mut ctx = Context::new(&mut ids);
        let mut asteroid = Entity::Asteroid(Asteroid::new(1, DVec2::new(50.0, 50.0), 20.0));
        let before = asteroid.clone();
        asteroid.update(1000.0, &mut ctx);
        assert_eq!(asteroid, before);

        asteroid.set_position(DVec2::new(10.0, 20.0));
        assert_eq!(asteroid.collider().map(Collider::position), Some(DVec2::new(10.0, 20.0)));
        assert!(Entity::Explosion(Explosion::new(2, DVec2::ZERO, 1.0, 1.0))
            .collider()
            .is_none());
    }
}
