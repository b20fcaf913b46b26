use crate::{Ball, Config, GameMap, Paddle, PaddleIntent, Time};
use hecs::World;

/// Apply paddle movement based on intents
pub fn move_paddles(world: &mut World, time: &Time, map: &GameMap, config: &Config) {
    for (_entity, (paddle, intent)) in world.query_mut::<(&mut Paddle, &PaddleIntent)>() {
        if intent.dir != 0 {
            paddle.y += intent.dir as f32 * config.paddle_speed * time.dt;
        }
        // Height may have changed under a power-up, so clamp every step
        paddle.y = map.clamp_y(paddle.y, paddle.height / 2.0);
    }
}

/// Move every ball based on its velocity
pub fn move_balls(world: &mut World, time: &Time) {
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        ball.pos += ball.vel * time.dt;
    }
}
