//! Serializable world state
//!
//! A snapshot carries the status, seed, arena size, every entity tagged by a
//! `"type"` discriminator and the event log. Decoding is tolerant: a bad
//! entity or log entry is skipped with a warning and the rest still loads.

use std::collections::BTreeSet;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::geometry::Size;
use crate::sim::{
    Asteroid, Collider, Engine, Entity, EntityId, Explosion, Game, LogEntry, Projectile, ProjectileKind,
    Spaceship, Status,
};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Point> for DVec2 {
    fn from(p: Point) -> Self {
        DVec2::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColliderRecord {
    Circle {
        enabled: bool,
        position: Point,
        radius: f64,
    },
    Square {
        enabled: bool,
        position: Point,
        rotation: f64,
        size: Size,
    },
    Polygon {
        enabled: bool,
        position: Point,
        rotation: f64,
        vertices: Vec<Point>,
    },
}

impl ColliderRecord {
    pub fn enabled(&self) -> bool {
        match self {
            Self::Circle { enabled, .. } | Self::Square { enabled, .. } | Self::Polygon { enabled, .. } => *enabled,
        }
    }
}

impl From<&Collider> for ColliderRecord {
    fn from(collider: &Collider) -> Self {
        match collider {
            Collider::Circle(c) => Self::Circle {
                enabled: c.enabled,
                position: c.position.into(),
                radius: c.radius,
            },
            Collider::Square(s) => Self::Square {
                enabled: s.enabled,
                position: s.position.into(),
                rotation: s.rotation,
                size: s.size,
            },
            Collider::Polygon(p) => Self::Polygon {
                enabled: p.enabled,
                position: p.position.into(),
                rotation: p.rotation,
                vertices: p.polygon.vertices().iter().map(|v| Point::from(*v)).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsteroidRecord {
    pub id: EntityId,
    pub enabled: bool,
    pub position: Point,
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collider: Option<ColliderRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRecord {
    pub main_thrust: f64,
    pub left_thrust: f64,
    pub right_thrust: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceshipRecord {
    pub id: EntityId,
    pub enabled: bool,
    /// Derived from health on encode, ignored on decode
    #[serde(default)]
    pub destroyed: bool,
    pub name: String,
    #[serde(default)]
    pub start_position: Option<Point>,
    #[serde(default)]
    pub start_rotation: Option<f64>,
    pub position: Point,
    pub rotation: f64,
    pub velocity: Point,
    pub health: f64,
    pub energy: f64,
    pub engine: EngineRecord,
    pub rockets: u32,
    pub kills: u32,
    pub score: f64,
    pub laser_reload_timer_sec: f64,
    pub rocket_reload_timer_sec: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collider: Option<ColliderRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileRecord {
    pub id: EntityId,
    pub enabled: bool,
    pub position: Point,
    pub rotation: f64,
    pub velocity: Point,
    pub lifespan_sec: f64,
    pub damage: f64,
    /// Id of the ship that fired it
    pub owner: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collider: Option<ColliderRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplosionRecord {
    pub id: EntityId,
    pub enabled: bool,
    pub position: Point,
    pub radius: f64,
    pub duration_sec: f64,
    pub lifespan_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntityRecord {
    Asteroid(AsteroidRecord),
    Spaceship(SpaceshipRecord),
    Laser(ProjectileRecord),
    Rocket(ProjectileRecord),
    Explosion(ExplosionRecord),
}

impl EntityRecord {
    pub fn id(&self) -> EntityId {
        match self {
            Self::Asteroid(r) => r.id,
            Self::Spaceship(r) => r.id,
            Self::Laser(r) | Self::Rocket(r) => r.id,
            Self::Explosion(r) => r.id,
        }
    }
}

impl From<&Entity> for EntityRecord {
    fn from(entity: &Entity) -> Self {
        match entity {
            Entity::Asteroid(a) => Self::Asteroid(AsteroidRecord {
                id: a.id,
                enabled: a.enabled,
                position: a.position.into(),
                radius: a.radius,
                collider: Some((&a.collider).into()),
            }),
            Entity::Spaceship(s) => Self::Spaceship(SpaceshipRecord {
                id: s.id(),
                enabled: s.enabled(),
                destroyed: s.is_destroyed(),
                name: s.name().to_string(),
                start_position: Some(s.start_position().into()),
                start_rotation: Some(s.start_rotation()),
                position: s.position().into(),
                rotation: s.rotation(),
                velocity: s.velocity().into(),
                health: s.health(),
                energy: s.energy(),
                engine: EngineRecord {
                    main_thrust: s.engine().main_thrust,
                    left_thrust: s.engine().left_thrust,
                    right_thrust: s.engine().right_thrust,
                },
                rockets: s.rockets(),
                kills: s.kills(),
                score: s.score(),
                laser_reload_timer_sec: s.laser_reload_sec(),
                rocket_reload_timer_sec: s.rocket_reload_sec(),
                collider: Some(s.collider().into()),
            }),
            Entity::Projectile(p) => {
                let record = ProjectileRecord {
                    id: p.id(),
                    enabled: p.enabled(),
                    position: p.position().into(),
                    rotation: p.rotation(),
                    velocity: p.velocity().into(),
                    lifespan_sec: p.lifespan_sec(),
                    damage: p.damage(),
                    owner: p.owner(),
                    collider: Some(p.collider().into()),
                };
                match p.kind() {
                    ProjectileKind::Laser => Self::Laser(record),
                    ProjectileKind::Rocket => Self::Rocket(record),
                }
            }
            Entity::Explosion(e) => Self::Explosion(ExplosionRecord {
                id: e.id,
                enabled: e.enabled,
                position: e.position.into(),
                radius: e.radius,
                duration_sec: e.duration_sec,
                lifespan_sec: e.lifespan_sec,
            }),
        }
    }
}

/// Complete world state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub status: Status,
    pub seed: u64,
    pub size: Size,
    pub game_objects: Vec<EntityRecord>,
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub destroyed_ships: usize,
    #[serde(default)]
    pub graceful_end_timer_ms: f64,
}

/// Top-level shape with entries left undecoded so bad ones can be skipped
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWorldState {
    status: Status,
    seed: u64,
    size: Size,
    #[serde(default)]
    game_objects: Vec<Value>,
    #[serde(default)]
    logs: Vec<Value>,
    #[serde(default)]
    destroyed_ships: usize,
    #[serde(default)]
    graceful_end_timer_ms: f64,
}

impl WorldState {
    /// Decode JSON, skipping entities and log entries that do not parse
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let raw: RawWorldState = serde_json::from_str(json)?;

        let game_objects = raw
            .game_objects
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<EntityRecord>(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping game object #{index}: {e}");
                    None
                }
            })
            .collect();

        let logs = raw
            .logs
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<LogEntry>(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping log entry #{index}: {e}");
                    None
                }
            })
            .collect();

        Ok(Self {
            status: raw.status,
            seed: raw.seed,
            size: raw.size,
            game_objects,
            logs,
            destroyed_ships: raw.destroyed_ships,
            graceful_end_timer_ms: raw.graceful_end_timer_ms,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Game {
    pub fn serialize(&self) -> WorldState {
        WorldState {
            status: self.status,
            seed: self.seed,
            size: self.size,
            game_objects: self.entities().iter().map(EntityRecord::from).collect(),
            logs: self.log().entries().to_vec(),
            destroyed_ships: self.registry.destroyed_ships(),
            graceful_end_timer_ms: self.registry.graceful_end_timer_ms(),
        }
    }

    /// Rebuild a game from a snapshot
    ///
    /// Projectiles whose owner is missing and ships with a name already taken
    /// are skipped with a warning. Future ids continue above every id seen.
    pub fn deserialize(state: WorldState) -> Result<Game, DecodeError> {
        let Size { width, height } = state.size;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(DecodeError::InvalidArena { width, height });
        }

        let mut game = Game::new(state.size, state.seed);
        game.status = state.status;

        let ship_ids: BTreeSet<EntityId> = state
            .game_objects
            .iter()
            .filter_map(|record| match record {
                EntityRecord::Spaceship(ship) => Some(ship.id),
                _ => None,
            })
            .collect();

        let mut max_id = 0;
        for record in state.game_objects {
            max_id = max_id.max(record.id());
            match record {
                EntityRecord::Asteroid(r) => game.registry.add(Entity::Asteroid(asteroid_from(r))),
                EntityRecord::Spaceship(r) => {
                    let name = r.name.clone();
                    if let Err(e) = game.registry.add_ship(ship_from(r)) {
                        log::warn!("Skipping ship {name:?}: {e}");
                    }
                }
                EntityRecord::Laser(r) | EntityRecord::Rocket(r) if !ship_ids.contains(&r.owner) => {
                    log::warn!("Skipping projectile {}: owner {} not found", r.id, r.owner);
                }
                EntityRecord::Laser(r) => {
                    game.registry.add(Entity::Projectile(projectile_from(ProjectileKind::Laser, r)));
                }
                EntityRecord::Rocket(r) => {
                    game.registry.add(Entity::Projectile(projectile_from(ProjectileKind::Rocket, r)));
                }
                EntityRecord::Explosion(r) => game.registry.add(Entity::Explosion(explosion_from(r))),
            }
        }

        for entry in state.logs {
            max_id = max_id.max(entry.id);
            game.registry.log_mut().push(entry);
        }

        game.registry
            .set_round_counters(state.destroyed_ships, state.graceful_end_timer_ms);
        game.registry.ids_mut().set_floor(max_id);
        Ok(game)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.serialize().to_json()
    }

    pub fn from_json(json: &str) -> Result<Game, DecodeError> {
        Game::deserialize(WorldState::from_json(json)?)
    }
}

fn asteroid_from(r: AsteroidRecord) -> Asteroid {
    let mut asteroid = Asteroid::new(r.id, r.position.into(), r.radius);
    asteroid.enabled = r.enabled;
    if let Some(collider) = &r.collider {
        asteroid.collider.set_enabled(collider.enabled());
    }
    asteroid
}

fn ship_from(r: SpaceshipRecord) -> Spaceship {
    let position: DVec2 = r.position.into();
    let start_position = r.start_position.map(DVec2::from).unwrap_or(position);
    let start_rotation = r.start_rotation.unwrap_or(r.rotation);

    let mut ship = Spaceship::new(r.id, r.name, start_position, start_rotation);
    ship.enabled = r.enabled;
    ship.set_position(position);
    ship.rotation = r.rotation;
    ship.velocity = r.velocity.into();
    ship.health = r.health;
    ship.energy = r.energy;
    ship.engine = Engine {
        main_thrust: r.engine.main_thrust,
        left_thrust: r.engine.left_thrust,
        right_thrust: r.engine.right_thrust,
    };
    ship.rockets = r.rockets;
    ship.kills = r.kills;
    ship.score = r.score;
    ship.laser_reload_sec = r.laser_reload_timer_sec;
    ship.rocket_reload_sec = r.rocket_reload_timer_sec;
    if let Some(collider) = &r.collider {
        ship.collider.set_enabled(collider.enabled());
    }
    ship
}

fn projectile_from(kind: ProjectileKind, r: ProjectileRecord) -> Projectile {
    let mut projectile = Projectile::new(r.id, kind, r.position.into(), r.rotation, r.owner);
    projectile.enabled = r.enabled;
    projectile.velocity = r.velocity.into();
    projectile.lifespan_sec = r.lifespan_sec;
    projectile.damage = r.damage;
    if let Some(collider) = &r.collider {
        projectile.collider.set_enabled(collider.enabled());
    }
    projectile
}

fn explosion_from(r: ExplosionRecord) -> Explosion {
    let mut explosion = Explosion::new(r.id, r.position.into(), r.radius, r.duration_sec);
    explosion.enabled = r.enabled;
    explosion.lifespan_sec = r.lifespan_sec;
    explosion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::FixedClock;
    use serde_json::json;

    fn battle() -> Game {
        let mut game = Game::with_clock(Size::new(1920.0, 1080.0), 77, FixedClock(5_000));
        let id = game.next_id();
        game.add_entity(Entity::Asteroid(Asteroid::new(id, DVec2::new(960.0, 100.0), 25.0)))
            .unwrap();
        game.add_ship("alpha", DVec2::new(100.0, 540.0), 0.0).unwrap();
        game.add_ship("bravo", DVec2::new(1800.0, 540.0), std::f64::consts::PI)
            .unwrap();
        game.start();
        game.with_ship("alpha", |ship, ctx| {
            ship.set_engine_thrust(60.0, 10.0, 0.0).unwrap();
            ship.fire_laser(ctx).unwrap();
        })
        .unwrap();
        game.update(16.0);
        // Fired after the tick so it does not meet the laser at the muzzle
        game.with_ship("alpha", |ship, ctx| ship.fire_rocket(ctx))
            .unwrap()
            .unwrap();
        game.pause();
        game
    }

    #[test]
    fn test_round_trip_is_exact() {
        let game = battle();
        let restored = Game::deserialize(game.serialize()).unwrap();

        assert_eq!(restored.seed(), game.seed());
        assert_eq!(restored.size(), game.size());
        assert_eq!(restored.status(), Status::Paused);
        assert_eq!(restored.entities(), game.entities());
        assert_eq!(restored.log().entries(), game.log().entries());
    }

    #[test]
    fn test_json_round_trip_counts() {
        let game = battle();
        let json = game.to_json().unwrap();
        let restored = Game::from_json(&json).unwrap();

        assert_eq!(restored.seed(), 77);
        assert_eq!(restored.size(), Size::new(1920.0, 1080.0));
        assert_eq!(restored.status(), game.status());
        assert_eq!(restored.entities().len(), game.entities().len());
        assert_eq!(restored.log().len(), game.log().len());
        assert_eq!(restored.ship("bravo").unwrap().name(), "bravo");
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(battle().serialize()).unwrap();
        assert_eq!(value["status"], "paused");
        assert_eq!(value["size"]["width"], 1920.0);

        let objects = value["gameObjects"].as_array().unwrap();
        let ship = objects.iter().find(|o| o["type"] == "spaceship").unwrap();
        assert_eq!(ship["name"], "alpha");
        assert_eq!(ship["startPosition"]["x"], 100.0);
        assert_eq!(ship["collider"]["type"], "circle");
        assert!(ship["engine"]["mainThrust"].is_number());
        assert!(objects.iter().any(|o| o["type"] == "laser" && o["collider"]["type"] == "square"));
        assert!(objects.iter().any(|o| o["type"] == "rocket"));
        assert!(objects.iter().any(|o| o["type"] == "asteroid"));
        assert_eq!(value["logs"][0]["logType"], "game_state");
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let game = battle();
        let mut value = serde_json::to_value(game.serialize()).unwrap();
        let objects = value["gameObjects"].as_array_mut().unwrap();
        let duplicate = objects.iter().find(|o| o["type"] == "spaceship").unwrap().clone();
        objects.push(json!({ "type": "blackhole", "id": 900 }));
        objects.push(json!({ "type": "asteroid", "id": 901 }));
        objects.push(json!({
            "type": "laser", "id": 902, "enabled": true,
            "position": { "x": 1.0, "y": 1.0 }, "rotation": 0.0,
            "velocity": { "x": 1.0, "y": 0.0 }, "lifespanSec": 1.0,
            "damage": 20.0, "owner": 4242
        }));
        objects.push(duplicate);
        value["logs"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "id": "not a number" }));

        let restored = Game::from_json(&value.to_string()).unwrap();
        assert_eq!(restored.entities().len(), game.entities().len());
        assert_eq!(restored.log().len(), game.log().len());
        assert_eq!(restored.registry().ship_count(), 2);
    }

    #[test]
    fn test_ids_continue_above_snapshot() {
        let game = battle();
        let highest = game
            .entities()
            .iter()
            .map(Entity::id)
            .chain(game.log().entries().iter().map(|e| e.id))
            .max()
            .unwrap();

        let mut restored = Game::deserialize(game.serialize()).unwrap();
        assert!(restored.next_id() > highest);
    }

    #[test]
    fn test_missing_start_pose_defaults_to_current() {
        let mut state = battle().serialize();
        for record in &mut state.game_objects {
            if let EntityRecord::Spaceship(ship) = record {
                ship.start_position = None;
                ship.start_rotation = None;
            }
        }
        let restored = Game::deserialize(state).unwrap();
        let alpha = restored.ship("alpha").unwrap();
        assert_eq!(alpha.start_position(), alpha.position());
        assert_eq!(alpha.start_rotation(), alpha.rotation());
    }

    #[test]
    fn test_rejects_non_json_and_bad_shape() {
        assert!(matches!(Game::from_json("not json"), Err(DecodeError::Json(_))));
        assert!(matches!(Game::from_json("[1, 2, 3]"), Err(DecodeError::Json(_))));
        assert!(matches!(
            Game::from_json(r#"{"status":"running","seed":1}"#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_rejects_empty_arena() {
        let mut state = battle().serialize();
        state.size = Size::new(0.0, 1080.0);
        assert!(matches!(
            Game::deserialize(state),
            Err(DecodeError::InvalidArena { .. })
        ));
    }
}
