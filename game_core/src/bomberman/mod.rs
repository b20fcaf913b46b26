//! Bomberman: a tile grid, bombs with fuses and three wandering enemies.
//!
//! Positions are grid coordinates, times are milliseconds of simulation time.

pub mod game;
pub mod grid;

pub use game::*;
pub use grid::*;

use serde::{Deserialize, Serialize};

use crate::stats::RecentHistory;

/// Counters for one round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombermanStats {
    pub bombs_placed: u32,
    pub blocks_destroyed: u32,
    pub enemies_killed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombermanRecord {
    pub won: bool,
    pub duration_secs: f32,
    pub stats: BombermanStats,
}

/// Results across rounds in this browser session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BombermanHistory {
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub last_games: RecentHistory<BombermanRecord>,
}

impl BombermanHistory {
    pub fn record(&mut self, outcome: Outcome, duration_secs: f32, stats: BombermanStats) {
        let won = outcome == Outcome::Won;
        self.total_games += 1;
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.last_games.push(BombermanRecord {
            won,
            duration_secs,
            stats,
        });
    }

    pub fn win_ratio(&self) -> f32 {
        if self.total_games == 0 {
            return 0.0;
        }
        self.wins as f32 / self.total_games as f32 * 100.0
    }
}
