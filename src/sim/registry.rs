//! Entity registry and round bookkeeping
//!
//! Owns every entity in insertion order, the ship name index, the event log
//! and the id allocator. Entity callbacks hand their side effects back as
//! [`Effect`]s, which are applied here in the order they were raised.

use std::collections::BTreeMap;

use super::context::{CollisionPartner, Context, Effect};
use super::entity::{CollisionOrder, Entity, EntityId};
use super::events::{EventLog, LogEntry};
use super::ship::Spaceship;
use crate::consts::{GRACEFUL_END_MS, SCORE_PER_SURVIVOR};
use crate::error::GameError;

/// Monotonic id source shared by entities and log entries
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: EntityId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> EntityId {
        self.last += 1;
        self.last
    }

    /// Last id handed out
    #[inline]
    pub fn current(&self) -> EntityId {
        self.last
    }

    /// Make sure future ids are greater than `id`
    pub fn set_floor(&mut self, id: EntityId) {
        self.last = self.last.max(id);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: Vec<Entity>,
    ships: BTreeMap<String, EntityId>,
    destroyed_ships: usize,
    graceful_end_timer_ms: f64,
    despawned: Vec<EntityId>,
    log: EventLog,
    ids: IdAllocator,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    #[inline]
    pub(crate) fn entity_at_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    #[inline]
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    #[inline]
    pub fn log_mut(&mut self) -> &mut EventLog {
        &mut self.log
    }

    #[inline]
    pub fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    #[inline]
    pub fn destroyed_ships(&self) -> usize {
        self.destroyed_ships
    }

    #[inline]
    pub fn graceful_end_timer_ms(&self) -> f64 {
        self.graceful_end_timer_ms
    }

    /// Restore round counters from a snapshot
    pub(crate) fn set_round_counters(&mut self, destroyed_ships: usize, graceful_end_timer_ms: f64) {
        self.destroyed_ships = destroyed_ships;
        self.graceful_end_timer_ms = graceful_end_timer_ms;
    }

    /// Append an entity; ships must come through [`Registry::add_ship`]
    pub(crate) fn add(&mut self, entity: Entity) {
        if let Entity::Spaceship(ship) = &entity {
            self.ships.insert(ship.name().to_string(), ship.id());
        }
        self.entities.push(entity);
    }

    /// Register a ship under its unique name
    pub fn add_ship(&mut self, ship: Spaceship) -> Result<(), GameError> {
        if self.ships.contains_key(ship.name()) {
            return Err(GameError::ShipAlreadyExists(ship.name().to_string()));
        }
        log::debug!("Adding ship {:?} with id {}", ship.name(), ship.id());
        self.add(Entity::Spaceship(ship));
        Ok(())
    }

    pub fn remove_ship(&mut self, name: &str) -> Result<Spaceship, GameError> {
        let id = self
            .ships
            .remove(name)
            .ok_or_else(|| GameError::ShipNotFound(name.to_string()))?;
        let index = self
            .entities
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| GameError::ShipNotFound(name.to_string()))?;
        match self.entities.remove(index) {
            Entity::Spaceship(ship) => Ok(ship),
            _ => Err(GameError::ShipNotFound(name.to_string())),
        }
    }

    pub fn ship(&self, name: &str) -> Result<&Spaceship, GameError> {
        self.ships
            .get(name)
            .and_then(|id| self.ship_by_id(*id))
            .ok_or_else(|| GameError::ShipNotFound(name.to_string()))
    }

    pub fn ship_by_id(&self, id: EntityId) -> Option<&Spaceship> {
        self.get(id).and_then(Entity::as_ship)
    }

    pub fn ship_by_id_mut(&mut self, id: EntityId) -> Option<&mut Spaceship> {
        self.get_mut(id).and_then(Entity::as_ship_mut)
    }

    /// Registered ships in insertion order
    pub fn ships(&self) -> impl Iterator<Item = &Spaceship> {
        self.entities.iter().filter_map(Entity::as_ship)
    }

    /// Registered ship names in name order
    pub fn ship_names(&self) -> impl Iterator<Item = &str> {
        self.ships.keys().map(String::as_str)
    }

    #[inline]
    pub fn ship_count(&self) -> usize {
        self.ships.len()
    }

    /// Run `action` against a named ship, then apply whatever it raised
    pub fn with_ship<R>(
        &mut self,
        name: &str,
        now_ms: u64,
        action: impl FnOnce(&mut Spaceship, &mut Context) -> R,
    ) -> Result<R, GameError> {
        let id = *self
            .ships
            .get(name)
            .ok_or_else(|| GameError::ShipNotFound(name.to_string()))?;

        let Registry { entities, ids, .. } = &mut *self;
        let ship = entities
            .iter_mut()
            .find_map(|e| match e {
                Entity::Spaceship(ship) if ship.id() == id => Some(ship),
                _ => None,
            })
            .ok_or_else(|| GameError::ShipNotFound(name.to_string()))?;

        let mut ctx = Context::new(ids);
        let result = action(ship, &mut ctx);
        let effects = ctx.into_effects();

        self.apply(effects, now_ms);
        self.flush_despawned();
        Ok(result)
    }

    /// Update the entity at `index` and apply its effects
    pub(crate) fn update_at(&mut self, index: usize, dt_ms: f64, now_ms: u64) {
        let Registry { entities, ids, .. } = &mut *self;
        let Some(entity) = entities.get_mut(index) else {
            return;
        };

        let mut ctx = Context::new(ids);
        entity.update(dt_ms, &mut ctx);
        let effects = ctx.into_effects();
        self.apply(effects, now_ms);
    }

    /// Test the pair `(i, j)` with `i < j` and notify both on contact
    pub(crate) fn collide_at(&mut self, i: usize, j: usize, now_ms: u64) -> bool {
        let Registry { entities, ids, .. } = &mut *self;
        let Some((a, b)) = pair_mut(entities, i, j) else {
            return false;
        };
        if !a.enabled() || !b.enabled() {
            return false;
        }
        let (Some(first), Some(second)) = (a.collider(), b.collider()) else {
            return false;
        };
        if !first.enabled() || !second.enabled() || !first.collides_with(second) {
            return false;
        }

        let mut ctx = Context::new(ids);
        a.on_collision(b, CollisionOrder::First, &mut ctx);
        let effects = ctx.into_effects();
        self.apply(effects, now_ms);

        // The second callback runs after the first one's effects landed.
        // Spawns only append, so both indices still point at the pair.
        let Registry { entities, ids, .. } = &mut *self;
        let Some((a, b)) = pair_mut(entities, i, j) else {
            return true;
        };
        let mut ctx = Context::new(ids);
        b.on_collision(a, CollisionOrder::Second, &mut ctx);
        let effects = ctx.into_effects();
        self.apply(effects, now_ms);
        true
    }

    /// Remove everything despawned since the last flush
    pub(crate) fn flush_despawned(&mut self) {
        if self.despawned.is_empty() {
            return;
        }
        let despawned = std::mem::take(&mut self.despawned);
        self.entities.retain(|e| {
            let keep = !despawned.contains(&e.id());
            if !keep {
                log::trace!("Removing {} {}", e.kind_name(), e.id());
            }
            keep
        });
    }

    pub(crate) fn apply(&mut self, effects: Vec<Effect>, now_ms: u64) {
        for effect in effects {
            match effect {
                Effect::Spawn(entity) => self.add(entity),
                Effect::Despawn(id) => self.despawned.push(id),
                Effect::ShipDestroyed(id) => {
                    log::debug!("Ship {:?} destroyed", self.ship_name(id));
                    self.on_ship_destroyed();
                }
                Effect::Score { ship, amount } => {
                    if let Some(ship) = self.ship_by_id_mut(ship) {
                        ship.add_score(amount);
                    }
                }
                Effect::Kill { victim, killer } => {
                    let entry_id = self.ids.next();
                    let entry = LogEntry::kill(entry_id, now_ms, &self.ship_name(victim), &self.ship_name(killer));
                    self.log.push(entry);
                    if let Some(ship) = self.ship_by_id_mut(killer) {
                        ship.record_kill();
                    }
                }
                Effect::Damage {
                    dealer,
                    target,
                    amount,
                    damage_type,
                } => {
                    let entry_id = self.ids.next();
                    let entry = LogEntry::damage(
                        entry_id,
                        now_ms,
                        amount,
                        &self.ship_name(dealer),
                        &self.ship_name(target),
                        damage_type,
                    );
                    self.log.push(entry);
                }
                Effect::Collision { ship, with } => {
                    let with = match with {
                        CollisionPartner::Asteroid => "an asteroid".to_string(),
                        CollisionPartner::Ship(id) => self.ship_name(id),
                    };
                    let entry_id = self.ids.next();
                    let entry = LogEntry::collision(entry_id, now_ms, &self.ship_name(ship), &with);
                    self.log.push(entry);
                }
            }
        }
    }

    fn ship_name(&self, id: EntityId) -> String {
        self.ship_by_id(id)
            .map(|ship| ship.name().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Count a destruction, pay the survivors and arm the end-of-round timer
    pub fn on_ship_destroyed(&mut self) {
        self.destroyed_ships += 1;

        let total = self.ships.len();
        let ships_to_score = total.min(3);
        if self.destroyed_ships >= total - ships_to_score {
            for ship in self.entities.iter_mut().filter_map(Entity::as_ship_mut) {
                if ship.enabled() {
                    ship.add_score(SCORE_PER_SURVIVOR);
                }
            }
        }

        if self.destroyed_ships + 1 >= total {
            log::debug!("Last ship standing, ending in {GRACEFUL_END_MS} ms");
            self.graceful_end_timer_ms = GRACEFUL_END_MS;
        }
    }

    /// Whether the round is over, counting down the end timer by `dt_ms`
    pub fn has_ended(&mut self, dt_ms: f64) -> bool {
        if self.graceful_end_timer_ms > 0.0 {
            self.graceful_end_timer_ms -= dt_ms;
            return false;
        }
        self.destroyed_ships + 1 >= self.ships.len()
    }

    /// Reset ships, keep asteroids and drop everything else
    pub fn reset(&mut self) {
        self.entities.retain_mut(|entity| match entity {
            Entity::Spaceship(ship) => {
                ship.reset();
                true
            }
            Entity::Asteroid(_) => true,
            Entity::Projectile(_) | Entity::Explosion(_) => false,
        });
        self.destroyed_ships = 0;
        self.graceful_end_timer_ms = 0.0;
        self.despawned.clear();
    }
}

/// Two distinct mutable entities, `i` before `j`
fn pair_mut(entities: &mut [Entity], i: usize, j: usize) -> Option<(&mut Entity, &mut Entity)> {
    if i >= j || j >= entities.len() {
        return None;
    }
    let (head, tail) = entities.split_at_mut(j);
    Some((&mut head[i], &mut tail[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::entity::Asteroid;
    use crate::sim::events::LogKind;
    use glam::DVec2;

    fn ship(registry: &mut Registry, name: &str, x: f64) -> EntityId {
        let id = registry.ids_mut().next();
        registry
            .add_ship(Spaceship::new(id, name, DVec2::new(x, 100.0), 0.0))
            .unwrap();
        id
    }

    #[test]
    fn test_id_allocator() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next(), 1);
        assert_eq!(ids.next(), 2);
        ids.set_floor(10);
        assert_eq!(ids.next(), 11);
        ids.set_floor(3);
        assert_eq!(ids.current(), 11);
    }

    #[test]
    fn test_ship_names_are_unique() {
        let mut registry = Registry::new();
        ship(&mut registry, "alpha", 100.0);
        let err = registry
            .add_ship(Spaceship::new(99, "alpha", DVec2::ZERO, 0.0))
            .unwrap_err();
        assert_eq!(err, GameError::ShipAlreadyExists("alpha".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_ship() {
        let mut registry = Registry::new();
        ship(&mut registry, "alpha", 100.0);
        ship(&mut registry, "bravo", 200.0);

        let removed = registry.remove_ship("alpha").unwrap();
        assert_eq!(removed.name(), "alpha");
        assert_eq!(registry.ship_count(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.remove_ship("alpha").unwrap_err(),
            GameError::ShipNotFound("alpha".into())
        );
    }

    #[test]
    fn test_pair_mut_rejects_bad_indices() {
        let mut entities = vec![
            Entity::Asteroid(Asteroid::new(1, DVec2::ZERO, 10.0)),
            Entity::Asteroid(Asteroid::new(2, DVec2::ZERO, 10.0)),
        ];
        assert!(pair_mut(&mut entities, 1, 1).is_none());
        assert!(pair_mut(&mut entities, 1, 0).is_none());
        assert!(pair_mut(&mut entities, 0, 2).is_none());
        let (a, b) = pair_mut(&mut entities, 0, 1).unwrap();
        assert_eq!((a.id(), b.id()), (1, 2));
    }

    #[test]
    fn test_has_ended_waits_for_timer() {
        let mut registry = Registry::new();
        for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
            ship(&mut registry, name, 100.0 * i as f64);
        }
        assert!(!registry.has_ended(10.0));

        registry.on_ship_destroyed();
        assert!(!registry.has_ended(10.0));

        registry.on_ship_destroyed();
        assert_eq!(registry.graceful_end_timer_ms(), GRACEFUL_END_MS);
        assert!(!registry.has_ended(1000.0));
        assert!(!registry.has_ended(100.0));
        assert!(registry.has_ended(16.0));
    }

    #[test]
    fn test_empty_registry_has_ended() {
        assert!(Registry::new().has_ended(16.0));
    }

    #[test]
    fn test_survivors_are_paid() {
        let mut registry = Registry::new();
        let a = ship(&mut registry, "a", 0.0);
        let b = ship(&mut registry, "b", 100.0);
        let c = ship(&mut registry, "c", 200.0);
        if let Some(ship) = registry.ship_by_id_mut(a) {
            ship.enabled = false;
        }

        registry.on_ship_destroyed();
        let scores: Vec<_> = [a, b, c]
            .iter()
            .map(|id| registry.ship_by_id(*id).map(Spaceship::score))
            .collect();
        assert_eq!(scores, vec![Some(0.0), Some(SCORE_PER_SURVIVOR), Some(SCORE_PER_SURVIVOR)]);
    }

    #[test]
    fn test_survivor_bonus_waits_for_the_last_three() {
        let mut registry = Registry::new();
        let ids: Vec<_> = (0..5).map(|i| ship(&mut registry, &format!("s{i}"), 50.0 * i as f64)).collect();

        registry.on_ship_destroyed();
        assert!(registry.ships().all(|s| s.score() == 0.0));

        registry.on_ship_destroyed();
        assert_eq!(
            registry.ship_by_id(ids[4]).map(Spaceship::score),
            Some(SCORE_PER_SURVIVOR)
        );
    }

    #[test]
    fn test_kill_effect_logs_and_credits() {
        let mut registry = Registry::new();
        let a = ship(&mut registry, "alpha", 0.0);
        let b = ship(&mut registry, "bravo", 100.0);

        registry.apply(
            vec![
                Effect::Kill { victim: b, killer: a },
                Effect::Collision {
                    ship: a,
                    with: CollisionPartner::Ship(404),
                },
            ],
            5,
        );

        let alpha = registry.ship("alpha").unwrap();
        assert_eq!(alpha.kills(), 1);
        assert_eq!(alpha.score(), SCORE_PER_KILL);

        let entries = registry.log().entries();
        assert_eq!(entries[0].kind, LogKind::Kill);
        assert_eq!(entries[0].message, "\"bravo\" was killed by \"alpha\"");
        assert_eq!(entries[1].message, "\"alpha\" collided with \"unknown\"");
        assert!(entries[1].id > entries[0].id);
        assert!(entries[0].id > b);
    }

    #[test]
    fn test_despawn_is_deferred_until_flush() {
        let mut registry = Registry::new();
        registry.add(Entity::Asteroid(Asteroid::new(1, DVec2::ZERO, 10.0)));
        registry.apply(vec![Effect::Despawn(1)], 0);
        assert_eq!(registry.len(), 1);
        registry.flush_despawned();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_with_ship_applies_spawns() {
        let mut registry = Registry::new();
        ship(&mut registry, "alpha", 0.0);

        let fired = registry.with_ship("alpha", 0, |ship, ctx| ship.fire_laser(ctx)).unwrap();
        assert!(fired.is_ok());
        assert_eq!(registry.len(), 2);
        assert!(matches!(registry.entities()[1], Entity::Projectile(_)));

        assert_eq!(
            registry.with_ship("ghost", 0, |_, _| ()).unwrap_err(),
            GameError::ShipNotFound("ghost".into())
        );
    }

    #[test]
    fn test_reset_keeps_ships_and_asteroids() {
        let mut registry = Registry::new();
        ship(&mut registry, "alpha", 0.0);
        registry.add(Entity::Asteroid(Asteroid::new(50, DVec2::new(500.0, 500.0), 10.0)));
        registry.with_ship("alpha", 0, |ship, ctx| ship.fire_rocket(ctx)).unwrap().unwrap();
        registry.on_ship_destroyed();

        registry.reset();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.destroyed_ships(), 0);
        assert_eq!(registry.graceful_end_timer_ms(), 0.0);
        assert_eq!(registry.ship("alpha").unwrap().rockets(), MAX_ROCKETS);
    }
}
