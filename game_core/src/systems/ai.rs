use glam::Vec2;
use hecs::World;

use crate::config::AiPolicy;
use crate::{AiControlled, Ball, Config, GameMap, Paddle, Params, Side, Time};

/// Steer every computer paddle toward its policy target
pub fn drive_ai(world: &mut World, time: &Time, map: &GameMap, config: &Config) {
    let Some((ball_pos, ball_vel)) = primary_ball(world) else {
        return;
    };

    let max_step = config.ai_speed * config.ai_multiplier * time.dt;

    for (_entity, (paddle, _ai)) in world.query_mut::<(&mut Paddle, &AiControlled)>() {
        let paddle_x = config.paddle_x(paddle.side);
        let delta = match config.ai_policy {
            AiPolicy::Tracking => approach(paddle.y, ball_pos.y, max_step),
            AiPolicy::Predictive => {
                let target = predict_intercept_y(ball_pos, ball_vel, paddle_x, map.height);
                approach(paddle.y, target, max_step)
            }
            AiPolicy::DeadZone => dead_zone_step(paddle, ball_pos, ball_vel, map, config, max_step),
        };
        paddle.y = map.clamp_y(paddle.y + delta, paddle.height / 2.0);
    }
}

/// The first ball that was not added by multi-ball
fn primary_ball(world: &World) -> Option<(Vec2, Vec2)> {
    let mut query = world.query::<&Ball>();
    let mut fallback = None;
    for (_e, ball) in query.iter() {
        if !ball.extra {
            return Some((ball.pos, ball.vel));
        }
        fallback.get_or_insert((ball.pos, ball.vel));
    }
    fallback
}

/// Signed move toward `target`, never overshooting and never above `max_step`
fn approach(current: f32, target: f32, max_step: f32) -> f32 {
    (target - current).clamp(-max_step, max_step)
}

/// Where the ball crosses `target_x`, with wall bounces unwrapped
///
/// Falls back to the ball's current height when it has no horizontal speed.
pub fn predict_intercept_y(ball_pos: Vec2, ball_vel: Vec2, target_x: f32, height: f32) -> f32 {
    if ball_vel.x == 0.0 {
        return ball_pos.y;
    }
    let raw = ball_pos.y + ball_vel.y * (target_x - ball_pos.x) / ball_vel.x;
    fold_into_court(raw, height)
}

/// Mirror-fold `y` into `[0, height]`; the pattern repeats every `2 * height`
pub fn fold_into_court(y: f32, height: f32) -> f32 {
    if height <= 0.0 {
        return 0.0;
    }
    let period = 2.0 * height;
    let m = y.rem_euclid(period);
    if m > height {
        period - m
    } else {
        m
    }
}

fn dead_zone_step(
    paddle: &Paddle,
    ball_pos: Vec2,
    ball_vel: Vec2,
    map: &GameMap,
    config: &Config,
    max_step: f32,
) -> f32 {
    let approaching = match paddle.side {
        Side::Left => ball_vel.x < 0.0,
        Side::Right => ball_vel.x > 0.0,
    };

    if approaching {
        let offset = ball_pos.y - paddle.y;
        if offset.abs() <= config.ai_error_margin {
            0.0
        } else {
            max_step.copysign(offset)
        }
    } else {
        let to_centre = map.height / 2.0 - paddle.y;
        if to_centre.abs() <= Params::AI_RETURN_MARGIN {
            0.0
        } else {
            approach(paddle.y, map.height / 2.0, max_step / 2.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Variant};
    use crate::{create_ball, create_paddle};

    fn ai_world(config: &Config, paddle_y: f32, ball_pos: Vec2, ball_vel: Vec2) -> (World, hecs::Entity) {
        let mut world = World::new();
        let map = GameMap::from_config(config);
        let paddle = create_paddle(&mut world, &map, config, Side::Right);
        world.insert_one(paddle, AiControlled).unwrap();
        world.get::<&mut Paddle>(paddle).unwrap().y = paddle_y;
        create_ball(&mut world, config, ball_pos, ball_vel);
        (world, paddle)
    }

    fn paddle_y(world: &World, paddle: hecs::Entity) -> f32 {
        world.get::<&Paddle>(paddle).unwrap().y
    }

    #[test]
    fn test_fold_into_court() {
        assert_eq!(fold_into_court(150.0, 400.0), 150.0);
        assert_eq!(fold_into_court(-50.0, 400.0), 50.0);
        assert_eq!(fold_into_court(450.0, 400.0), 350.0);
        assert_eq!(fold_into_court(850.0, 400.0), 50.0);
        assert_eq!(fold_into_court(-850.0, 400.0), 50.0);
    }

    #[test]
    fn test_prediction_unwraps_wall_bounce() {
        // 400px to travel horizontally at 45 degrees from y=300 heading down
        let y = predict_intercept_y(Vec2::new(388.0, 300.0), Vec2::new(100.0, 100.0), 788.0, 400.0);
        assert!((y - 100.0).abs() < 0.001, "Bounce off the bottom lands at 100, got {}", y);
    }

    #[test]
    fn test_prediction_without_horizontal_speed_tracks() {
        let y = predict_intercept_y(Vec2::new(400.0, 123.0), Vec2::new(0.0, 50.0), 788.0, 400.0);
        assert_eq!(y, 123.0);
    }

    #[test]
    fn test_tracking_moves_at_most_speed_times_dt() {
        let config = Config::for_variant(Variant::Classic, Difficulty::Medium);
        let (mut world, paddle) =
            ai_world(&config, 200.0, Vec2::new(400.0, 50.0), Vec2::new(120.0, 0.0));

        drive_ai(&mut world, &Time::new(0.1, 0.0), &GameMap::new(), &config);

        let moved = 200.0 - paddle_y(&world, paddle);
        assert!((moved - 30.0).abs() < 0.001, "Medium AI moves 30px in 0.1s, got {}", moved);
    }

    #[test]
    fn test_easy_ai_is_slower() {
        let config = Config::for_variant(Variant::Classic, Difficulty::Easy);
        let (mut world, paddle) =
            ai_world(&config, 200.0, Vec2::new(400.0, 50.0), Vec2::new(120.0, 0.0));

        drive_ai(&mut world, &Time::new(0.1, 0.0), &GameMap::new(), &config);

        assert!((200.0 - paddle_y(&world, paddle) - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_tracking_does_not_overshoot() {
        let config = Config::new();
        let (mut world, paddle) =
            ai_world(&config, 200.0, Vec2::new(400.0, 195.0), Vec2::new(120.0, 0.0));

        drive_ai(&mut world, &Time::new(0.1, 0.0), &GameMap::new(), &config);

        assert_eq!(paddle_y(&world, paddle), 195.0);
    }

    #[test]
    fn test_ai_stays_inside_court() {
        let config = Config::new();
        let (mut world, paddle) =
            ai_world(&config, 45.0, Vec2::new(400.0, 0.0), Vec2::new(120.0, 0.0));

        drive_ai(&mut world, &Time::new(0.1, 0.0), &GameMap::new(), &config);

        assert_eq!(paddle_y(&world, paddle), config.paddle_height / 2.0);
    }

    #[test]
    fn test_dead_zone_ignores_small_offsets() {
        let config = Config::for_variant(Variant::Embedded, Difficulty::Easy);
        let (mut world, paddle) =
            ai_world(&config, 200.0, Vec2::new(400.0, 225.0), Vec2::new(180.0, 0.0));

        drive_ai(&mut world, &Time::new(0.1, 0.0), &GameMap::new(), &config);

        assert_eq!(paddle_y(&world, paddle), 200.0, "25px is inside the 30px margin");
    }

    #[test]
    fn test_dead_zone_returns_to_centre_at_half_speed() {
        let config = Config::for_variant(Variant::Embedded, Difficulty::Medium);
        let (mut world, paddle) =
            ai_world(&config, 100.0, Vec2::new(400.0, 50.0), Vec2::new(-240.0, 0.0));

        drive_ai(&mut world, &Time::new(0.1, 0.0), &GameMap::new(), &config);

        // ai_speed 180 -> 18px per 0.1s, half of it while drifting home
        assert!((paddle_y(&world, paddle) - 109.0).abs() < 0.001);
    }

    #[test]
    fn test_ai_follows_primary_ball() {
        let config = Config::new();
        let (mut world, paddle) =
            ai_world(&config, 200.0, Vec2::new(400.0, 300.0), Vec2::new(120.0, 0.0));
        let mut decoy = Ball::new(Vec2::new(400.0, 50.0), Vec2::new(120.0, 0.0), 5.0);
        decoy.extra = true;
        world.spawn((decoy,));

        drive_ai(&mut world, &Time::new(0.1, 0.0), &GameMap::new(), &config);

        assert!(paddle_y(&world, paddle) > 200.0, "AI should ignore the extra ball");
    }
}
