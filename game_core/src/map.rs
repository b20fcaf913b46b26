use glam::Vec2;

use crate::{Config, Side};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Check if circle intersects AABB
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = Vec2::new(
            center.x.clamp(self.min.x, self.max.x),
            center.y.clamp(self.min.y, self.max.y),
        );
        (center - closest).length_squared() <= radius * radius
    }
}

/// The Pong court
#[derive(Debug, Clone, Copy)]
pub struct GameMap {
    pub width: f32,
    pub height: f32,
}

impl GameMap {
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.arena_width,
            height: config.arena_height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Where a ball is served from
    pub fn ball_spawn(&self) -> Vec2 {
        self.center()
    }

    /// Centre position of a freshly placed paddle
    pub fn paddle_spawn(&self, side: Side, config: &Config) -> Vec2 {
        Vec2::new(config.paddle_x(side), self.height / 2.0)
    }

    /// Clamp a centre Y so that an object of `half_extent` stays inside
    pub fn clamp_y(&self, y: f32, half_extent: f32) -> f32 {
        y.clamp(half_extent, (self.height - half_extent).max(half_extent))
    }

    /// Hit box of a paddle centred at `(x, y)`
    pub fn paddle_box(&self, config: &Config, side: Side, y: f32, height: f32) -> Aabb {
        Aabb::from_center_size(
            Vec2::new(config.paddle_x(side), y),
            Vec2::new(config.paddle_width, height),
        )
    }
}

impl Default for GameMap {
    fn default() -> Self {
        Self::new()
    }
}
