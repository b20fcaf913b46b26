use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{Difficulty, GameMode};
use crate::session::MatchSummary;
use crate::{Params, Side};

/// Bounded history, most recent entry first
///
/// Deserializing from a longer list keeps only the newest entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<T>", into = "Vec<T>")]
#[serde(bound(serialize = "T: Clone + Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct RecentHistory<T> {
    items: VecDeque<T>,
}

impl<T> RecentHistory<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(Params::HISTORY_LEN),
        }
    }

    /// Insert at the front, dropping the oldest entry beyond the cap
    pub fn push(&mut self, item: T) {
        self.items.push_front(item);
        self.items.truncate(Params::HISTORY_LEN);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T> Default for RecentHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for RecentHistory<T> {
    fn from(mut items: Vec<T>) -> Self {
        items.truncate(Params::HISTORY_LEN);
        Self {
            items: items.into(),
        }
    }
}

impl<T> From<RecentHistory<T>> for Vec<T> {
    fn from(history: RecentHistory<T>) -> Self {
        history.items.into()
    }
}

/// A pair of counters, one per side
///
/// Serialized with the player/computer names the browser stats panel uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTally {
    #[serde(rename = "player")]
    pub left: u32,
    #[serde(rename = "computer")]
    pub right: u32,
}

impl SideTally {
    pub fn bump(&mut self, side: Side, by: u32) {
        match side {
            Side::Left => self.left += by,
            Side::Right => self.right += by,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLoss {
    pub wins: u32,
    pub losses: u32,
}

/// One finished match as shown in the recent games list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub winner: String,
    pub winner_side: Side,
    pub score: SideTally,
    pub duration_secs: f32,
    pub is_perfect: bool,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

/// Cumulative Pong statistics for the browser session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameStats {
    pub total_games: u32,
    pub total_score: SideTally,
    pub win_loss: WinLoss,
    pub perfect_games: SideTally,
    pub last_games: RecentHistory<GameRecord>,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished match into the totals
    ///
    /// A win is counted when the left side ("player 1") wins. A perfect game
    /// is one where the winner's opponent did not score.
    pub fn record(&mut self, summary: &MatchSummary) {
        let winner = summary.winner;
        let loser_points = summary.score.get(winner.opponent());
        let perfect = loser_points == 0;

        self.total_games += 1;
        self.total_score.left += u32::from(summary.score.left);
        self.total_score.right += u32::from(summary.score.right);

        match winner {
            Side::Left => self.win_loss.wins += 1,
            Side::Right => self.win_loss.losses += 1,
        }

        if perfect {
            self.perfect_games.bump(winner, 1);
        }

        self.last_games.push(GameRecord {
            winner: winner_label(winner, summary.mode).to_string(),
            winner_side: winner,
            score: SideTally {
                left: u32::from(summary.score.left),
                right: u32::from(summary.score.right),
            },
            duration_secs: summary.duration_secs,
            is_perfect: perfect,
            difficulty: Some(summary.difficulty),
        });
    }

    /// Percentage of games won by the left side, 0 when nothing was played
    pub fn win_ratio(&self) -> f32 {
        if self.total_games == 0 {
            return 0.0;
        }
        self.win_loss.wins as f32 / self.total_games as f32 * 100.0
    }
}

/// Display name of a match winner
pub fn winner_label(side: Side, mode: GameMode) -> &'static str {
    match (mode, side) {
        (GameMode::Single, Side::Left) => "Player",
        (GameMode::Single, Side::Right) => "Computer",
        (GameMode::Multi, Side::Left) => "Player 1",
        (GameMode::Multi, Side::Right) => "Player 2",
    }
}
