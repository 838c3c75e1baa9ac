//! Game facade and lifecycle
//!
//! `Game` owns the arena, the registry and the wall clock used to stamp log
//! entries. Everything else reaches the simulation through it.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::context::Context;
use super::entity::{Entity, EntityId};
use super::events::{Clock, EventLog, LogEntry, SystemClock};
use super::registry::Registry;
use super::ship::Spaceship;
use crate::error::GameError;
use crate::geometry::Size;

/// Lifecycle of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Initialized,
    Running,
    Paused,
    /// One ship (or none) left standing
    Ended,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialized => write!(f, "initialized"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

#[derive(Debug)]
pub struct Game {
    /// Seed for the asteroid field
    pub(crate) seed: u64,
    pub(crate) status: Status,
    pub(crate) size: Size,
    pub(crate) registry: Registry,
    clock: Box<dyn Clock>,
}

impl Game {
    /// New game stamped with wall-clock time
    pub fn new(size: Size, seed: u64) -> Self {
        Self::with_clock(size, seed, SystemClock)
    }

    pub fn with_clock(size: Size, seed: u64, clock: impl Clock + 'static) -> Self {
        Self {
            seed,
            status: Status::Initialized,
            size,
            registry: Registry::new(),
            clock: Box::new(clock),
        }
    }

    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn entities(&self) -> &[Entity] {
        self.registry.entities()
    }

    #[inline]
    pub fn log(&self) -> &EventLog {
        self.registry.log()
    }

    #[inline]
    pub(crate) fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Allocate an id from this game's allocator
    pub fn next_id(&mut self) -> EntityId {
        self.registry.ids_mut().next()
    }

    /// Move to `status` and log the transition
    pub(crate) fn change_status(&mut self, status: Status) {
        self.status = status;
        let id = self.registry.ids_mut().next();
        let entry = LogEntry::game_state(id, self.now_ms(), status);
        log::info!("{}", entry.message);
        self.registry.log_mut().push(entry);
    }

    /// Running and Ended games ignore this
    pub fn start(&mut self) {
        if matches!(self.status, Status::Running | Status::Ended) {
            return;
        }
        self.change_status(Status::Running);
    }

    /// Only a running game can be paused
    pub fn pause(&mut self) {
        if self.status != Status::Running {
            return;
        }
        self.change_status(Status::Paused);
    }

    /// Reset ships to their start pose and clear the battlefield
    ///
    /// Asteroids stay where they are. An ended round goes back to
    /// `Initialized`; any other status is kept.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.registry.log_mut().clear();
        if self.status == Status::Ended {
            self.status = Status::Initialized;
        }
    }

    /// Add a ship at `position` facing `rotation` radians
    pub fn add_ship(&mut self, name: &str, position: DVec2, rotation: f64) -> Result<EntityId, GameError> {
        if self.registry.ship(name).is_ok() {
            return Err(GameError::ShipAlreadyExists(name.to_string()));
        }
        let id = self.next_id();
        self.registry.add_ship(Spaceship::new(id, name, position, rotation))?;
        Ok(id)
    }

    pub fn remove_ship(&mut self, name: &str) -> Result<Spaceship, GameError> {
        self.registry.remove_ship(name)
    }

    pub fn ship(&self, name: &str) -> Result<&Spaceship, GameError> {
        self.registry.ship(name)
    }

    /// Drive a named ship, e.g. set thrust or fire
    ///
    /// Anything the action spawns is added to the registry before this returns.
    pub fn with_ship<R>(
        &mut self,
        name: &str,
        action: impl FnOnce(&mut Spaceship, &mut Context) -> R,
    ) -> Result<R, GameError> {
        let now_ms = self.now_ms();
        self.registry.with_ship(name, now_ms, action)
    }

    /// Add a pre-built entity
    ///
    /// Ships go through the same name check as [`Game::add_ship`].
    pub fn add_entity(&mut self, entity: Entity) -> Result<(), GameError> {
        match entity {
            Entity::Spaceship(ship) => self.registry.add_ship(ship),
            other => {
                self.registry.add(other);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::{FixedClock, LogKind};
    use crate::sim::entity::Asteroid;

    fn game() -> Game {
        Game::with_clock(Size::new(1000.0, 1000.0), 7, FixedClock(1_000))
    }

    #[test]
    fn test_new_game() {
        let game = game();
        assert_eq!(game.status(), Status::Initialized);
        assert_eq!(game.seed(), 7);
        assert_eq!(game.size(), Size::new(1000.0, 1000.0));
        assert!(game.entities().is_empty());
        assert!(game.log().is_empty());
    }

    #[test]
    fn test_start_and_pause() {
        let mut game = game();
        game.pause();
        assert_eq!(game.status(), Status::Initialized);

        game.start();
        game.start();
        assert_eq!(game.status(), Status::Running);
        assert_eq!(game.log().len(), 1);
        assert_eq!(game.log().entries()[0].message, "Game state changed to: running");
        assert_eq!(game.log().entries()[0].timestamp_ms, 1_000);

        game.pause();
        assert_eq!(game.status(), Status::Paused);
        game.start();
        assert_eq!(game.status(), Status::Running);
        assert_eq!(game.log().of_kind(LogKind::GameState).count(), 3);
    }

    #[test]
    fn test_ended_game_cannot_restart_until_reset() {
        let mut game = game();
        game.status = Status::Ended;
        game.start();
        assert_eq!(game.status(), Status::Ended);

        game.reset();
        assert_eq!(game.status(), Status::Initialized);
        game.start();
        assert_eq!(game.status(), Status::Running);
    }

    #[test]
    fn test_add_ship_rejects_duplicates() {
        let mut game = game();
        let id = game.add_ship("alpha", DVec2::new(10.0, 10.0), 0.0).unwrap();
        assert_eq!(game.ship("alpha").unwrap().id(), id);
        assert_eq!(
            game.add_ship("alpha", DVec2::ZERO, 0.0),
            Err(GameError::ShipAlreadyExists("alpha".into()))
        );
        assert_eq!(game.entities().len(), 1);
    }

    #[test]
    fn test_add_entity_checks_ship_names() {
        let mut game = game();
        game.add_ship("alpha", DVec2::new(10.0, 10.0), 0.0).unwrap();
        let first = game.ship("alpha").unwrap().id();

        let id = game.next_id();
        let twin = Spaceship::new(id, "alpha", DVec2::new(50.0, 50.0), 0.0);
        assert_eq!(
            game.add_entity(Entity::Spaceship(twin)),
            Err(GameError::ShipAlreadyExists("alpha".into()))
        );
        assert_eq!(game.registry().ship_count(), 1);
        assert_eq!(game.entities().len(), 1);
        assert_eq!(game.ship("alpha").unwrap().id(), first);

        let id = game.next_id();
        game.add_entity(Entity::Spaceship(Spaceship::new(id, "bravo", DVec2::ZERO, 0.0)))
            .unwrap();
        assert_eq!(game.registry().ship_count(), 2);
    }

    #[test]
    fn test_with_ship() {
        let mut game = game();
        game.add_ship("alpha", DVec2::new(10.0, 10.0), 0.0).unwrap();

        game.with_ship("alpha", |ship, _| ship.set_engine_thrust(100.0, 0.0, 0.0))
            .unwrap()
            .unwrap();
        assert_eq!(game.ship("alpha").unwrap().engine().main_thrust, 100.0);

        assert_eq!(
            game.with_ship("bravo", |_, _| ()),
            Err(GameError::ShipNotFound("bravo".into()))
        );
    }

    #[test]
    fn test_reset_clears_log_and_projectiles() {
        let mut game = game();
        game.add_ship("alpha", DVec2::new(10.0, 10.0), 0.0).unwrap();
        let id = game.next_id();
        game.add_entity(Entity::Asteroid(Asteroid::new(id, DVec2::new(500.0, 500.0), 20.0)))
            .unwrap();
        game.start();
        game.with_ship("alpha", |ship, ctx| ship.fire_laser(ctx)).unwrap().unwrap();
        assert_eq!(game.entities().len(), 3);

        game.reset();
        assert_eq!(game.entities().len(), 2);
        assert!(game.log().is_empty());
        assert_eq!(game.status(), Status::Running);
    }

    #[test]
    fn test_remove_ship() {
        let mut game = game();
        game.add_ship("alpha", DVec2::ZERO, 0.0).unwrap();
        assert_eq!(game.remove_ship("alpha").unwrap().name(), "alpha");
        assert!(game.ship("alpha").is_err());
    }
}
