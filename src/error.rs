//! Error types returned by the simulation kernel

use std::fmt;

use thiserror::Error;

/// Registry lookups by ship name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("space ship already exists: {0}")]
    ShipAlreadyExists(String),

    #[error("space ship not found: {0}")]
    ShipNotFound(String),
}

/// Engine channel named in a thrust validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrustChannel {
    Main,
    Left,
    Right,
}

impl fmt::Display for ThrustChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ThrustError {
    #[error("{channel} thrust must be between 0 and 100")]
    OutOfRange { channel: ThrustChannel },
}

/// Weapon firing failures; a failed fire call leaves the ship untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("not enough energy")]
    NotEnoughEnergy,

    #[error("not enough rockets")]
    NotEnoughRockets,

    #[error("laser is still cooling down")]
    LaserCoolingDown,

    #[error("rocket is not ready to be fired")]
    RocketCoolingDown,
}

/// Snapshot decoding failures that reject the whole snapshot
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid world state: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid arena size {width}x{height}")]
    InvalidArena { width: f64, height: f64 },
}

/// Runner settings that could not be loaded
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}
