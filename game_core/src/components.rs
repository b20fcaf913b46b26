use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which half of the court a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Paddle component - represents a player's paddle
#[derive(Debug, Clone, Copy)]
pub struct Paddle {
    pub side: Side,
    pub y: f32,      // Centre Y (clamped to arena)
    pub height: f32, // Current height, changed by power-ups
}

impl Paddle {
    pub fn new(side: Side, y: f32, height: f32) -> Self {
        Self { side, y, height }
    }
}

/// Ball component
#[derive(Debug, Clone, Copy)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub visible: bool,
    pub last_hit: Option<Side>,
    pub extra: bool, // spawned by multi-ball, removed on revert
    pub speed_scale: f32, // speed power-up factor still applied to `vel`
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            visible: true,
            last_hit: None,
            extra: false,
            speed_scale: 1.0,
        }
    }

    /// Reset ball to centre with a random diagonal direction
    pub fn reset(&mut self, center: Vec2, speed: f32, rng: &mut crate::GameRng) {
        self.pos = center;
        self.vel = random_serve(speed, rng);
        self.speed_scale = 1.0;
    }
}

/// Velocity of a fresh serve: `speed` on both axes with random signs
pub fn random_serve(speed: f32, rng: &mut crate::GameRng) -> Vec2 {
    let sx = if rng.0.gen_bool(0.5) { 1.0 } else { -1.0 };
    let sy = if rng.0.gen_bool(0.5) { 1.0 } else { -1.0 };
    Vec2::new(sx * speed, sy * speed)
}

/// Movement intent for paddle
#[derive(Debug, Clone, Copy, Default)]
pub struct PaddleIntent {
    pub dir: i8, // -1 = up, 0 = stop, 1 = down
}

impl PaddleIntent {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Marks the paddle steered by the computer
#[derive(Debug, Clone, Copy, Default)]
pub struct AiControlled;

/// Power-up kinds, a closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    BigPaddle,
    SmallPaddle,
    SlowBall,
    FastBall,
    InvertControls,
    GhostBall,
    MultiBall,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 7] = [
        PowerUpKind::BigPaddle,
        PowerUpKind::SmallPaddle,
        PowerUpKind::SlowBall,
        PowerUpKind::FastBall,
        PowerUpKind::InvertControls,
        PowerUpKind::GhostBall,
        PowerUpKind::MultiBall,
    ];

    /// HUD label
    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::BigPaddle => "Giant paddle",
            PowerUpKind::SmallPaddle => "Shrunken paddle",
            PowerUpKind::SlowBall => "Slow ball",
            PowerUpKind::FastBall => "Fast ball",
            PowerUpKind::InvertControls => "Inverted controls",
            PowerUpKind::GhostBall => "Ghost ball",
            PowerUpKind::MultiBall => "Multi-ball",
        }
    }
}

/// Power-up waiting on the field
#[derive(Debug, Clone, Copy)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn new(pos: Vec2, kind: PowerUpKind) -> Self {
        Self { pos, kind }
    }
}
