pub mod bomberman;
pub mod components;
pub mod config;
pub mod map;
pub mod params;
pub mod resources;
pub mod session;
pub mod stats;
pub mod systems;

pub use components::*;
pub use config::*;
pub use map::*;
pub use params::*;
pub use resources::*;

use hecs::World;
use systems::*;

/// Run one frame of the Pong simulation
///
/// `time.dt` is clamped to `MAX_DT` and consumed in `FIXED_DT` micro-steps.
/// `events` is cleared first and then holds everything that happened during
/// the frame. Stepping stops early once a side reaches the winning score.
#[allow(clippy::too_many_arguments)]
pub fn step(
    world: &mut World,
    time: &mut Time,
    map: &GameMap,
    config: &Config,
    score: &mut Score,
    events: &mut Events,
    input_queue: &mut InputQueue,
    powerups: &mut PowerUpState,
    rng: &mut GameRng,
) {
    // Clamp dt to prevent large jumps
    let clamped_dt = time.dt.min(Params::MAX_DT);

    events.clear();

    // 1. Ingest inputs (apply to paddle intents)
    ingest_inputs(world, input_queue, powerups);

    // Fixed micro-steps for stable physics
    let mut remaining_dt = clamped_dt;
    let mut step_events = Events::new();
    while remaining_dt > 0.0 && score.has_winner(config.win_score).is_none() {
        let step_dt = remaining_dt.min(Params::FIXED_DT);
        remaining_dt -= step_dt;

        let step_time = Time {
            dt: step_dt,
            now: time.now + (clamped_dt - remaining_dt),
        };

        step_events.clear();

        // 2. Computer paddle
        drive_ai(world, &step_time, map, config);

        // 3. Move paddles based on intents
        move_paddles(world, &step_time, map, config);

        // 4. Move balls
        move_balls(world, &step_time);

        // 5. Check collisions (ball vs paddles, walls)
        check_collisions(world, map, config, &mut step_events);

        // 6. Power-up timers and pickups
        update_powerups(world, &step_time, map, config, powerups, rng, &mut step_events);

        // 7. Check scoring (ball exited arena)
        check_scoring(world, map, score, &mut step_events, rng, config);

        events.merge(&step_events);
    }

    // Update time
    time.now += clamped_dt - remaining_dt;
}

/// Helper to create a paddle entity centred vertically
pub fn create_paddle(world: &mut World, map: &GameMap, config: &Config, side: Side) -> hecs::Entity {
    let y = map.paddle_spawn(side, config).y;
    world.spawn((Paddle::new(side, y, config.paddle_height), PaddleIntent::new()))
}

/// Helper to create a ball entity
pub fn create_ball(
    world: &mut World,
    config: &Config,
    pos: glam::Vec2,
    vel: glam::Vec2,
) -> hecs::Entity {
    world.spawn((Ball::new(pos, vel, config.ball_radius),))
}
