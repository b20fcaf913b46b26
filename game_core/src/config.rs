use serde::{Deserialize, Serialize};
use std::fmt;

use crate::params::Params;

/// Which Pong demo is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Plain Pong with DOM menus
    #[default]
    Classic,
    /// Pong with timed power-ups
    Enhanced,
    /// SPA-embedded Pong with canvas menus, pause and backend stats
    Embedded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    fn index(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    /// Wire name expected by the stats endpoint
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Left paddle is human, right paddle is the computer
    #[default]
    Single,
    /// Two humans on one keyboard
    Multi,
}

/// Computer opponent strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiPolicy {
    /// Follow the ball's y coordinate
    Tracking,
    /// Aim at the predicted intercept, unwrapping wall bounces
    Predictive,
    /// Chase only while the ball approaches, otherwise drift to centre
    DeadZone,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositive(&'static str),
    ZeroWinScore,
    PaddleTallerThanArena,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive(field) => write!(f, "{} must be positive", field),
            ConfigError::ZeroWinScore => write!(f, "win_score must be at least 1"),
            ConfigError::PaddleTallerThanArena => {
                write!(f, "paddle_height must not exceed arena_height")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub variant: Variant,
    pub arena_width: f32,
    pub arena_height: f32,
    pub paddle_width: f32,
    pub paddle_margin: f32,
    pub paddle_height: f32,
    pub paddle_speed: f32,
    pub ball_radius: f32,
    pub ball_speed_initial: f32,
    pub ball_speed_max: f32,
    pub ball_speed_min_axis: f32,
    pub ball_speed_increase: f32,
    pub ball_bounce_speed: f32,
    pub max_bounce_angle: f32,
    pub win_score: u8,
    pub ai_policy: AiPolicy,
    pub ai_speed: f32,
    pub ai_multiplier: f32,
    pub ai_error_margin: f32,
    pub powerups_enabled: bool,
    pub powerup_radius: f32,
    pub powerup_duration: f32,
    pub powerup_interval: f32,
    pub powerup_spawn_chance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: Variant::Classic,
            arena_width: Params::ARENA_WIDTH,
            arena_height: Params::ARENA_HEIGHT,
            paddle_width: Params::PADDLE_WIDTH,
            paddle_margin: Params::PADDLE_MARGIN,
            paddle_height: Params::PADDLE_HEIGHT,
            paddle_speed: Params::PADDLE_SPEED,
            ball_radius: Params::BALL_RADIUS,
            ball_speed_initial: Params::BALL_SPEED_INITIAL,
            ball_speed_max: Params::BALL_SPEED_MAX,
            ball_speed_min_axis: Params::BALL_SPEED_MIN_AXIS,
            ball_speed_increase: Params::BALL_SPEED_INCREASE,
            ball_bounce_speed: Params::BALL_BOUNCE_SPEED,
            max_bounce_angle: Params::MAX_BOUNCE_ANGLE,
            win_score: Params::WIN_SCORE,
            ai_policy: AiPolicy::Tracking,
            ai_speed: Params::AI_TRACKING_SPEED,
            ai_multiplier: 1.0,
            ai_error_margin: 0.0,
            powerups_enabled: false,
            powerup_radius: Params::POWERUP_RADIUS,
            powerup_duration: Params::POWERUP_DURATION,
            powerup_interval: Params::POWERUP_INTERVAL,
            powerup_spawn_chance: Params::POWERUP_SPAWN_CHANCE,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the tuning used by a demo at a given difficulty
    pub fn for_variant(variant: Variant, difficulty: Difficulty) -> Self {
        let mut config = Self {
            variant,
            ..Self::default()
        };

        match variant {
            Variant::Classic | Variant::Enhanced => {
                config.powerups_enabled = variant == Variant::Enhanced;
                match difficulty {
                    Difficulty::Easy => {
                        config.ai_multiplier = Params::AI_EASY_MULTIPLIER;
                    }
                    Difficulty::Medium => {}
                    Difficulty::Hard => {
                        config.ai_policy = AiPolicy::Predictive;
                        config.ai_speed = Params::AI_PREDICTIVE_SPEED;
                    }
                }
            }
            Variant::Embedded => {
                let i = difficulty.index();
                config.paddle_width = 10.0;
                config.win_score = Params::WIN_SCORE_EMBEDDED;
                config.ball_speed_initial = Params::EMBEDDED_BALL_SPEED[i];
                config.ball_bounce_speed = Params::EMBEDDED_BALL_SPEED[i];
                config.ball_speed_increase = 1.0;
                config.ai_policy = AiPolicy::DeadZone;
                config.ai_speed = Params::EMBEDDED_AI_SPEED[i];
                config.ai_error_margin = Params::EMBEDDED_AI_ERROR[i];
            }
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("paddle_speed", self.paddle_speed),
            ("ball_radius", self.ball_radius),
            ("ball_speed_initial", self.ball_speed_initial),
            ("ball_speed_max", self.ball_speed_max),
            ("powerup_duration", self.powerup_duration),
            ("powerup_interval", self.powerup_interval),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive(field));
            }
        }
        if self.win_score == 0 {
            return Err(ConfigError::ZeroWinScore);
        }
        if self.paddle_height > self.arena_height {
            return Err(ConfigError::PaddleTallerThanArena);
        }
        Ok(())
    }

    /// Get X position of a paddle centre
    pub fn paddle_x(&self, side: crate::Side) -> f32 {
        let offset = self.paddle_margin + self.paddle_width / 2.0;
        match side {
            crate::Side::Left => offset,
            crate::Side::Right => self.arena_width - offset,
        }
    }

    /// Clamp paddle Y to arena bounds
    pub fn clamp_paddle_y(&self, y: f32, height: f32) -> f32 {
        let half_height = height / 2.0;
        y.clamp(half_height, self.arena_height - half_height)
    }
}
