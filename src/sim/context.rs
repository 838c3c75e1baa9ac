//! Deferred side effects raised by entity callbacks
//!
//! Entities never reach into the registry while they are being updated or
//! collided. They record what should happen here instead, and the registry
//! applies the effects in order once the callback returns.

use super::entity::{Entity, EntityId};
use super::events::DamageType;
use super::registry::IdAllocator;

/// What a ship collided with, for the collision log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPartner {
    Asteroid,
    Ship(EntityId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a new entity to the registry
    Spawn(Entity),
    /// Remove an entity at the end of the current phase
    Despawn(EntityId),
    ShipDestroyed(EntityId),
    Score { ship: EntityId, amount: f64 },
    /// Credit `killer` with a kill and log it
    Kill { victim: EntityId, killer: EntityId },
    Damage {
        dealer: EntityId,
        target: EntityId,
        amount: f64,
        damage_type: DamageType,
    },
    Collision { ship: EntityId, with: CollisionPartner },
}

pub struct Context<'a> {
    ids: &'a mut IdAllocator,
    effects: Vec<Effect>,
}

impl<'a> Context<'a> {
    pub fn new(ids: &'a mut IdAllocator) -> Self {
        Self {
            ids,
            effects: Vec::new(),
        }
    }

    /// Allocate an id for an entity about to be spawned
    #[inline]
    pub fn next_id(&mut self) -> EntityId {
        self.ids.next()
    }

    pub fn spawn(&mut self, entity: Entity) {
        self.effects.push(Effect::Spawn(entity));
    }

    pub fn despawn(&mut self, id: EntityId) {
        self.effects.push(Effect::Despawn(id));
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    #[inline]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}
