use crate::components::{PowerUpKind, Side};

/// Time resource for tracking simulation time
#[derive(Debug, Clone, Copy)]
pub struct Time {
    pub dt: f32,  // Delta time for this step
    pub now: f32, // Total elapsed time
}

impl Time {
    pub fn new(dt: f32, now: f32) -> Self {
        Self { dt, now }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self {
            dt: 0.016,
            now: 0.0,
        }
    }
}

/// Game score tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub left: u8,
    pub right: u8,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, side: Side) {
        match side {
            Side::Left => self.left += 1,
            Side::Right => self.right += 1,
        }
    }

    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn has_winner(&self, win_score: u8) -> Option<Side> {
        if self.left >= win_score {
            Some(Side::Left)
        } else if self.right >= win_score {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// Random number generator
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Events that occurred during this frame
#[derive(Debug, Clone, Default)]
pub struct Events {
    pub left_scored: bool,
    pub right_scored: bool,
    pub ball_hit_paddle: bool,
    pub ball_hit_wall: bool,
    pub powerup_spawned: Option<PowerUpKind>,
    pub powerup_taken: Option<PowerUpKind>,
    pub powerup_expired: bool,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Fold the events of one micro-step into a frame summary
    pub fn merge(&mut self, other: &Events) {
        self.left_scored |= other.left_scored;
        self.right_scored |= other.right_scored;
        self.ball_hit_paddle |= other.ball_hit_paddle;
        self.ball_hit_wall |= other.ball_hit_wall;
        self.powerup_expired |= other.powerup_expired;
        if other.powerup_spawned.is_some() {
            self.powerup_spawned = other.powerup_spawned;
        }
        if other.powerup_taken.is_some() {
            self.powerup_taken = other.powerup_taken;
        }
    }
}

/// Paddle input queue filled by keyboard handlers
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pub inputs: Vec<(Side, i8)>, // (side, direction)
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    pub fn push_input(&mut self, side: Side, dir: i8) {
        self.inputs.push((side, dir.signum()));
    }

    pub fn pop_inputs(&mut self) -> Vec<(Side, i8)> {
        std::mem::take(&mut self.inputs)
    }
}

/// Active power-up effect and the timers driving the engine
#[derive(Debug, Clone, Default)]
pub struct PowerUpState {
    pub spawn_timer: f32,
    pub active: Option<ActiveEffect>,
    pub controls_inverted: bool,
}

/// Effect currently applied, with what is needed to undo it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub remaining: f32,
    pub speed_scale: f32, // 1.0 unless a ball speed effect is applied
}

impl PowerUpState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_label(&self) -> Option<&'static str> {
        self.active.map(|effect| effect.kind.label())
    }
}
