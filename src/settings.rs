//! Headless runner settings
//!
//! Loaded from an optional JSON file; every field falls back to its default.

use std::f64::consts::PI;
use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, SettingsError};
use crate::geometry::Size;
use crate::sim::Game;
use crate::{deg_to_rad, rad_to_deg};

/// A ship to add at the start of the round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipSpawn {
    pub name: String,
    /// Start position; ships without one are spread around the arena centre
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    /// Heading in degrees; defaults to facing the arena centre
    #[serde(default)]
    pub rotation_deg: Option<f64>,
}

impl ShipSpawn {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            x: None,
            y: None,
            rotation_deg: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub width: f64,
    pub height: f64,
    /// Asteroid field seed; drawn from the clock when absent
    pub seed: Option<u64>,
    /// Fixed simulation step
    pub step_ms: f64,
    /// Stop after this many ticks even if the round is still going
    pub max_ticks: u32,
    pub asteroids: bool,
    pub ships: Vec<ShipSpawn>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            seed: None,
            step_ms: 1000.0 / 60.0,
            // Two minutes of simulated time
            max_ticks: 60 * 120,
            asteroids: true,
            ships: ["alpha", "bravo", "charlie", "delta"]
                .into_iter()
                .map(ShipSpawn::named)
                .collect(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "arena must be larger than zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.step_ms > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "step must be positive, got {} ms",
                self.step_ms
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Build a game with the asteroid field and every ship in the roster
    pub fn build_game(&self, seed: u64) -> Result<Game, GameError> {
        let size = self.size();
        let mut game = Game::new(size, seed);
        if self.asteroids {
            game.seed_asteroids();
        }

        let centre = DVec2::new(size.width / 2.0, size.height / 2.0);
        let slots = start_locations(size, self.ships.len());
        for (spawn, slot) in self.ships.iter().zip(slots) {
            let position = DVec2::new(spawn.x.unwrap_or(slot.x), spawn.y.unwrap_or(slot.y));
            let rotation = match spawn.rotation_deg {
                Some(degrees) => deg_to_rad(degrees),
                None => facing(position, centre),
            };
            log::debug!(
                "Placing {:?} at ({:.0}, {:.0}) heading {:.0} deg",
                spawn.name,
                position.x,
                position.y,
                rad_to_deg(rotation)
            );
            game.add_ship(&spawn.name, position, rotation)?;
        }
        Ok(game)
    }
}

/// Evenly spaced slots on a circle around the arena centre
pub fn start_locations(size: Size, slots: usize) -> Vec<DVec2> {
    let centre = DVec2::new(size.width / 2.0, size.height / 2.0);
    let radius = size.width.min(size.height) / 3.0;
    (0..slots)
        .map(|i| {
            let angle = i as f64 / slots as f64 * 2.0 * PI;
            centre + DVec2::from_angle(angle) * radius
        })
        .collect()
}

fn facing(from: DVec2, to: DVec2) -> f64 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}
