//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Entities are a closed enum, dispatched with `match`
//! - Side effects raised by entities are applied by the registry in order
//! - Iteration order is registry insertion order
//! - Randomness only comes from a seeded RNG

pub mod collision;
pub mod context;
pub mod entity;
pub mod events;
pub mod projectile;
pub mod registry;
pub mod seeding;
pub mod ship;
pub mod state;
pub mod tick;

pub use collision::{CircleCollider, Collider, PolygonCollider, SquareCollider};
pub use context::{CollisionPartner, Context, Effect};
pub use entity::{Asteroid, CollisionOrder, Entity, EntityId, Explosion};
pub use events::{Clock, DamageType, EventLog, FixedClock, LogEntry, LogKind, SystemClock};
pub use projectile::{Projectile, ProjectileKind};
pub use registry::{IdAllocator, Registry};
pub use seeding::seed_field;
pub use ship::{Engine, Spaceship};
pub use state::{Game, Status};
pub use tick::wrap;
