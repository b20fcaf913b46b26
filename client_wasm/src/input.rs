//! Keyboard input handling

use std::collections::HashSet;

use game_core::bomberman::Direction;
use game_core::{GameMode, Side};

/// Key layout for the Pong paddles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddleKeys {
    /// Player 1 on w/s, player 2 on the arrow keys
    Arcade,
    /// Player 1 on w/s or the arrows, player 2 on o/l
    Embedded,
}

const UP_LETTER: &[&str] = &["w", "W"];
const DOWN_LETTER: &[&str] = &["s", "S"];
const UP_ARROW: &[&str] = &["ArrowUp"];
const DOWN_ARROW: &[&str] = &["ArrowDown"];
const UP_ANY: &[&str] = &["w", "W", "ArrowUp"];
const DOWN_ANY: &[&str] = &["s", "S", "ArrowDown"];
const UP_SECOND: &[&str] = &["o", "O"];
const DOWN_SECOND: &[&str] = &["l", "L"];

impl PaddleKeys {
    fn bindings(self, side: Side, mode: GameMode) -> (&'static [&'static str], &'static [&'static str]) {
        match (self, side, mode) {
            (PaddleKeys::Arcade, Side::Left, GameMode::Multi) => (UP_LETTER, DOWN_LETTER),
            (PaddleKeys::Arcade, Side::Right, _) => (UP_ARROW, DOWN_ARROW),
            (PaddleKeys::Embedded, Side::Right, _) => (UP_SECOND, DOWN_SECOND),
            (_, Side::Left, _) => (UP_ANY, DOWN_ANY),
        }
    }

    /// Whether `key` steers a paddle in this layout
    pub fn is_paddle_key(self, key: &str, mode: GameMode) -> bool {
        [Side::Left, Side::Right].into_iter().any(|side| {
            let (up, down) = self.bindings(side, mode);
            up.contains(&key) || down.contains(&key)
        })
    }
}

/// Keys currently held down
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<String>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: &str) {
        self.held.insert(key.to_string());
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(key);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    /// Direction for `side`: -1 up, 1 down, 0 when both or neither are held
    pub fn paddle_dir(&self, keys: PaddleKeys, side: Side, mode: GameMode) -> i8 {
        let (up, down) = keys.bindings(side, mode);
        let up = up.iter().any(|k| self.is_held(k));
        let down = down.iter().any(|k| self.is_held(k));
        match (up, down) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

/// Keys accepted on a game-over screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverKey {
    Replay,
    Menu,
}

pub fn pong_game_over_key(key: &str) -> Option<GameOverKey> {
    match key {
        "b" | "B" | "r" | "R" => Some(GameOverKey::Replay),
        "q" | "Q" | "Escape" => Some(GameOverKey::Menu),
        _ => None,
    }
}

pub fn bomberman_game_over_key(key: &str) -> Option<GameOverKey> {
    match key {
        " " => Some(GameOverKey::Replay),
        "q" | "Q" => Some(GameOverKey::Menu),
        _ => None,
    }
}

/// Bomberman moves one tile per key press
pub fn bomberman_direction(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" => Some(Direction::Up),
        "ArrowDown" => Some(Direction::Down),
        "ArrowLeft" => Some(Direction::Left),
        "ArrowRight" => Some(Direction::Right),
        _ => None,
    }
}
