//! Round standings
//!
//! Survivors rank above destroyed ships, then by score, then by kills.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::sim::{EntityId, Game};

/// One ship's line on the scoreboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub id: EntityId,
    pub name: String,
    pub score: f64,
    pub kills: u32,
    pub alive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub entries: Vec<Standing>,
}

impl Scoreboard {
    pub fn from_game(game: &Game) -> Self {
        let mut entries: Vec<Standing> = game
            .registry()
            .ships()
            .map(|ship| Standing {
                id: ship.id(),
                name: ship.name().to_string(),
                score: ship.score(),
                kills: ship.kills(),
                alive: !ship.is_destroyed(),
            })
            .collect();
        entries.sort_by(rank);
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top of the table, if anyone played
    pub fn leader(&self) -> Option<&Standing> {
        self.entries.first()
    }

    /// 1-indexed position of a ship by name
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name).map(|i| i + 1)
    }
}

fn rank(a: &Standing, b: &Standing) -> Ordering {
    b.alive
        .cmp(&a.alive)
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| b.kills.cmp(&a.kills))
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::sim::FixedClock;
    use glam::DVec2;

    fn standing(name: &str, score: f64, kills: u32, alive: bool) -> Standing {
        Standing {
            id: 0,
            name: name.to_string(),
            score,
            kills,
            alive,
        }
    }

    #[test]
    fn test_rank_order() {
        let mut entries = vec![
            standing("dead-champ", 500.0, 4, false),
            standing("low", 10.0, 0, true),
            standing("tied-fewer-kills", 100.0, 1, true),
            standing("tied-more-kills", 100.0, 2, true),
        ];
        entries.sort_by(rank);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["tied-more-kills", "tied-fewer-kills", "low", "dead-champ"]);
    }

    #[test]
    fn test_from_game() {
        let mut game = Game::with_clock(Size::new(800.0, 600.0), 1, FixedClock(0));
        assert!(Scoreboard::from_game(&game).is_empty());

        game.add_ship("alpha", DVec2::new(100.0, 100.0), 0.0).unwrap();
        game.add_ship("bravo", DVec2::new(400.0, 300.0), 0.0).unwrap();
        game.with_ship("bravo", |ship, _| ship.add_score(25.0)).unwrap();

        let board = Scoreboard::from_game(&game);
        assert_eq!(board.leader().map(|s| s.name.as_str()), Some("bravo"));
        assert_eq!(board.rank_of("alpha"), Some(2));
        assert_eq!(board.rank_of("charlie"), None);
        assert!(board.entries.iter().all(|s| s.alive));
    }
}
