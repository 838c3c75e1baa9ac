//! Game event log and wall clock
//!
//! Every entry carries a unique id, a millisecond timestamp, a human-readable
//! message and string metadata naming the participants.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::state::Status;

/// Source of log timestamps, in milliseconds since the Unix epoch
pub trait Clock: fmt::Debug {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Damage,
    Kill,
    Collision,
    GameState,
}

/// Weapon that dealt a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    #[default]
    Unknown,
    Laser,
    Rocket,
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Laser => write!(f, "laser"),
            Self::Rocket => write!(f, "rocket"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntityId,
    #[serde(rename = "logType")]
    pub kind: LogKind,
    #[serde(rename = "time")]
    pub timestamp_ms: u64,
    pub message: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl LogEntry {
    pub fn damage(
        id: EntityId,
        timestamp_ms: u64,
        amount: f64,
        who: &str,
        whom: &str,
        damage_type: DamageType,
    ) -> Self {
        Self {
            id,
            kind: LogKind::Damage,
            timestamp_ms,
            message: format!("\"{who}\" did {amount:.2} damage to \"{whom}\" with {damage_type}"),
            meta: meta([
                ("who", who.to_string()),
                ("whom", whom.to_string()),
                ("damage", amount.to_string()),
                ("damageType", damage_type.to_string()),
            ]),
        }
    }

    /// `victim` was destroyed by a hit from `killer`
    pub fn kill(id: EntityId, timestamp_ms: u64, victim: &str, killer: &str) -> Self {
        Self {
            id,
            kind: LogKind::Kill,
            timestamp_ms,
            message: format!("\"{victim}\" was killed by \"{killer}\""),
            meta: meta([("who", victim.to_string()), ("whom", killer.to_string())]),
        }
    }

    pub fn collision(id: EntityId, timestamp_ms: u64, who: &str, with: &str) -> Self {
        Self {
            id,
            kind: LogKind::Collision,
            timestamp_ms,
            message: format!("\"{who}\" collided with \"{with}\""),
            meta: meta([("who", who.to_string()), ("whom", with.to_string())]),
        }
    }

    pub fn game_state(id: EntityId, timestamp_ms: u64, status: Status) -> Self {
        Self {
            id,
            kind: LogKind::GameState,
            timestamp_ms,
            message: format!("Game state changed to: {status}"),
            meta: meta([("state", status.to_string())]),
        }
    }
}

fn meta<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Append-only, insertion-ordered log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        log::debug!("{}", entry.message);
        self.entries.push(entry);
    }

    #[inline]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries of one kind, oldest first
    pub fn of_kind(&self, kind: LogKind) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }
}
