/// Game tuning parameters for the arcade demos.
///
/// Distances are canvas pixels, speeds are pixels per second, durations are
/// seconds unless the name says otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Arena
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 400.0;

    // Paddle
    pub const PADDLE_WIDTH: f32 = 4.0;
    pub const PADDLE_MARGIN: f32 = 10.0; // gap between paddle and side edge
    pub const PADDLE_HEIGHT: f32 = 80.0;
    pub const PADDLE_SPEED: f32 = 300.0; // 5 px per frame at 60 Hz

    // Ball
    pub const BALL_RADIUS: f32 = 5.0;
    pub const BALL_SPEED_INITIAL: f32 = 120.0;
    pub const BALL_SPEED_MAX: f32 = 480.0;
    pub const BALL_SPEED_MIN_AXIS: f32 = 60.0;
    pub const BALL_SPEED_INCREASE: f32 = 1.2; // horizontal multiplier on paddle hit
    pub const BALL_BOUNCE_SPEED: f32 = 300.0; // vertical speed at full deflection
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

    // Score
    pub const WIN_SCORE: u8 = 3;
    pub const WIN_SCORE_EMBEDDED: u8 = 5;

    // Computer opponent
    pub const AI_TRACKING_SPEED: f32 = 300.0;
    pub const AI_PREDICTIVE_SPEED: f32 = 240.0;
    pub const AI_EASY_MULTIPLIER: f32 = 0.5;
    pub const AI_RETURN_MARGIN: f32 = 30.0;

    // Embedded variant, indexed easy / medium / hard
    pub const EMBEDDED_BALL_SPEED: [f32; 3] = [180.0, 240.0, 300.0];
    pub const EMBEDDED_AI_SPEED: [f32; 3] = [120.0, 180.0, 240.0];
    pub const EMBEDDED_AI_ERROR: [f32; 3] = [30.0, 20.0, 10.0];

    // Power-ups
    pub const POWERUP_RADIUS: f32 = 20.0;
    pub const POWERUP_DURATION: f32 = 5.0;
    pub const POWERUP_INTERVAL: f32 = 10.0;
    pub const POWERUP_SPAWN_CHANCE: f64 = 0.5;
    pub const BIG_PADDLE_FACTOR: f32 = 1.5;
    pub const SMALL_PADDLE_FACTOR: f32 = 0.5;
    pub const SLOW_BALL_FACTOR: f32 = 0.5;
    pub const FAST_BALL_FACTOR: f32 = 2.0;

    // Physics
    pub const FIXED_DT: f32 = 1.0 / 60.0;
    pub const MAX_DT: f32 = 0.1; // Clamp to prevent large jumps

    // Stats
    pub const HISTORY_LEN: usize = 5;

    // Bomberman, times in milliseconds
    pub const GRID_SIZE: i32 = 15;
    pub const CELL_SIZE: f32 = 40.0;
    pub const BLOCK_CHANCE: f64 = 0.3;
    pub const BOMB_FUSE_MS: f32 = 3000.0;
    pub const EXPLOSION_MS: f32 = 500.0;
    pub const PLAYER_BOMBS: u32 = 1;
    pub const PLAYER_BLAST_RADIUS: i32 = 3;
    pub const PLAYER_BLAST_RADIUS_HARD: i32 = 4;
    pub const ENEMY_COUNT: usize = 3;
    pub const ENEMY_STEP_MS: f32 = 1000.0;
    pub const ENEMY_STEP_MS_EASY: f32 = 1500.0;
    pub const ENEMY_BOMB_CHANCE: f64 = 0.15;
    pub const ENEMY_BLAST_RADIUS: i32 = 2;
}
