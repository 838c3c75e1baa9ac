//! Variable timestep simulation tick
//!
//! One call advances every entity, wraps the arena edges, resolves
//! collisions in registry order and checks whether the round is over.

use glam::DVec2;

use super::state::{Game, Status};
use crate::geometry::Size;

impl Game {
    /// Advance the world by `dt_ms` milliseconds
    ///
    /// The simulation runs regardless of status; pausing is up to the host.
    /// Negative steps are applied as given.
    pub fn update(&mut self, dt_ms: f64) {
        let now_ms = self.now_ms();

        // Move everything that is alive, then wrap it back into the arena
        let count = self.registry.len();
        for index in 0..count {
            let enabled = self
                .registry
                .entities()
                .get(index)
                .is_some_and(|entity| entity.enabled());
            if !enabled {
                continue;
            }

            self.registry.update_at(index, dt_ms, now_ms);
            if let Some(entity) = self.registry.entity_at_mut(index) {
                let position = entity.position();
                let wrapped = wrap(position, self.size);
                if wrapped != position {
                    entity.set_position(wrapped);
                }
            }
        }
        self.registry.flush_despawned();

        // Pairwise sweep over the entities present when it started
        let count = self.registry.len();
        for i in 0..count {
            for j in i + 1..count {
                self.registry.collide_at(i, j, now_ms);
            }
        }
        self.registry.flush_despawned();

        // The countdown follows simulated time; only a running round can end
        let ended = self.registry.has_ended(dt_ms);
        if ended && self.status == Status::Running {
            self.change_status(Status::Ended);
        }
    }
}

/// Bring a position that left the arena back in from the opposite edge
///
/// Each axis is wrapped on its own and keeps the distance travelled past the
/// edge. A coordinate exactly on the far edge maps to zero.
pub fn wrap(position: DVec2, size: Size) -> DVec2 {
    DVec2::new(wrap_axis(position.x, size.width), wrap_axis(position.y, size.height))
}

#[inline]
fn wrap_axis(value: f64, extent: f64) -> f64 {
    if value < 0.0 {
        extent - value
    } else if value >= extent {
        value - extent
    } else {
        value
    }
}
