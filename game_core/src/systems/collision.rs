use crate::{Ball, Config, Events, GameMap, Paddle, Side};
use hecs::World;

/// Check ball collisions with walls and paddles
pub fn check_collisions(world: &mut World, map: &GameMap, config: &Config, events: &mut Events) {
    // Collect paddle data first so balls can be borrowed mutably
    let paddles: Vec<(Side, f32, f32)> = world
        .query::<&Paddle>()
        .iter()
        .map(|(_e, p)| (p.side, p.y, p.height))
        .collect();

    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        // Top/bottom walls: point the vertical speed back into the court
        if ball.pos.y - ball.radius <= 0.0 {
            ball.pos.y = ball.radius;
            ball.vel.y = ball.vel.y.abs();
            events.ball_hit_wall = true;
        } else if ball.pos.y + ball.radius >= map.height {
            ball.pos.y = map.height - ball.radius;
            ball.vel.y = -ball.vel.y.abs();
            events.ball_hit_wall = true;
        }

        for &(side, paddle_y, height) in &paddles {
            let hit_box = map.paddle_box(config, side, paddle_y, height);
            if !hit_box.intersects_circle(ball.pos, ball.radius) {
                continue;
            }

            let toward = match side {
                Side::Left => ball.vel.x < 0.0,
                Side::Right => ball.vel.x > 0.0,
            };
            if !toward {
                continue;
            }

            bounce_off_paddle(ball, side, paddle_y, height, config);

            // Push ball out of paddle
            let paddle_x = config.paddle_x(side);
            let half_width = config.paddle_width / 2.0;
            ball.pos.x = match side {
                Side::Left => paddle_x + half_width + ball.radius,
                Side::Right => paddle_x - half_width - ball.radius,
            };

            ball.last_hit = Some(side);
            events.ball_hit_paddle = true;
            break;
        }
    }
}

/// Reflect and speed up the ball; the impact offset sets the vertical speed
fn bounce_off_paddle(ball: &mut Ball, side: Side, paddle_y: f32, height: f32, config: &Config) {
    // Relative position from -1 (top) to 1 (bottom)
    let offset = ((ball.pos.y - paddle_y) / (height / 2.0)).clamp(-1.0, 1.0);

    let speed_x = (ball.vel.x.abs() * config.ball_speed_increase).min(config.ball_speed_max);
    ball.vel.x = match side {
        Side::Left => speed_x,
        Side::Right => -speed_x,
    };

    let vy = (offset * config.max_bounce_angle).sin() * config.ball_bounce_speed;
    ball.vel.y = vy.clamp(-config.ball_speed_max, config.ball_speed_max);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_ball, create_paddle};
    use glam::Vec2;

    fn setup_world() -> (hecs::World, Config, GameMap, Events) {
        let world = hecs::World::new();
        let config = Config::new();
        let map = GameMap::new();
        let events = Events::new();
        (world, config, map, events)
    }

    fn only_ball(world: &hecs::World) -> Ball {
        let mut query = world.query::<&Ball>();
        let (_e, ball) = query.iter().next().expect("one ball");
        *ball
    }

    #[test]
    fn test_ball_bounces_off_top_wall() {
        let (mut world, config, map, mut events) = setup_world();
        let ball_vel = Vec2::new(120.0, -120.0);
        create_ball(&mut world, &config, Vec2::new(400.0, config.ball_radius - 0.1), ball_vel);

        check_collisions(&mut world, &map, &config, &mut events);

        let ball = only_ball(&world);
        assert!(ball.vel.y > 0.0, "Ball should bounce down after hitting top wall");
        assert_eq!(ball.vel.x, ball_vel.x, "X velocity should be unchanged");
        assert!(ball.pos.y >= config.ball_radius, "Ball should be pushed out of wall");
        assert!(events.ball_hit_wall, "Should trigger ball_hit_wall event");
    }

    #[test]
    fn test_ball_bounces_off_bottom_wall() {
        let (mut world, config, map, mut events) = setup_world();
        let ball_vel = Vec2::new(120.0, 120.0);
        create_ball(
            &mut world,
            &config,
            Vec2::new(400.0, map.height - config.ball_radius + 0.1),
            ball_vel,
        );

        check_collisions(&mut world, &map, &config, &mut events);

        let ball = only_ball(&world);
        assert!(ball.vel.y < 0.0, "Ball should bounce up after hitting bottom wall");
        assert!(
            ball.pos.y <= map.height - config.ball_radius,
            "Ball should be pushed out of wall"
        );
        assert!(events.ball_hit_wall, "Should trigger ball_hit_wall event");
    }

    #[test]
    fn test_wall_bounce_never_points_outward() {
        // Already moving back in: the sign must not flip again
        let (mut world, config, map, mut events) = setup_world();
        create_ball(&mut world, &config, Vec2::new(400.0, 2.0), Vec2::new(120.0, 50.0));

        check_collisions(&mut world, &map, &config, &mut events);

        assert!(only_ball(&world).vel.y > 0.0);
    }

    #[test]
    fn test_ball_collides_with_left_paddle() {
        let (mut world, config, map, mut events) = setup_world();
        create_paddle(&mut world, &map, &config, Side::Left);
        let paddle_x = config.paddle_x(Side::Left);
        create_ball(&mut world, &config, Vec2::new(paddle_x + 5.0, 200.0), Vec2::new(-120.0, 0.0));

        check_collisions(&mut world, &map, &config, &mut events);

        let ball = only_ball(&world);
        assert!(ball.vel.x > 0.0, "Ball should bounce right after hitting left paddle");
        assert!(
            (ball.vel.x - 144.0).abs() < 0.001,
            "Horizontal speed grows by 1.2x, got {}",
            ball.vel.x
        );
        assert!(ball.pos.x > paddle_x, "Ball should be pushed out of paddle");
        assert_eq!(ball.last_hit, Some(Side::Left));
        assert!(events.ball_hit_paddle, "Should trigger ball_hit_paddle event");
    }

    #[test]
    fn test_ball_collides_with_right_paddle() {
        let (mut world, config, map, mut events) = setup_world();
        create_paddle(&mut world, &map, &config, Side::Right);
        let paddle_x = config.paddle_x(Side::Right);
        create_ball(&mut world, &config, Vec2::new(paddle_x - 5.0, 200.0), Vec2::new(120.0, 0.0));

        check_collisions(&mut world, &map, &config, &mut events);

        let ball = only_ball(&world);
        assert!(ball.vel.x < 0.0, "Ball should bounce left after hitting right paddle");
        assert!(ball.pos.x < paddle_x, "Ball should be pushed out of paddle");
        assert_eq!(ball.last_hit, Some(Side::Right));
    }

    #[test]
    fn test_ball_speed_caps_at_max() {
        let (mut world, config, map, mut events) = setup_world();
        create_paddle(&mut world, &map, &config, Side::Left);
        let paddle_x = config.paddle_x(Side::Left);
        let initial_speed = config.ball_speed_max - 1.0;
        create_ball(
            &mut world,
            &config,
            Vec2::new(paddle_x + 5.0, 200.0),
            Vec2::new(-initial_speed, 0.0),
        );

        check_collisions(&mut world, &map, &config, &mut events);

        let ball = only_ball(&world);
        assert!(
            ball.vel.x <= config.ball_speed_max,
            "Ball speed should not exceed max {}",
            config.ball_speed_max
        );
    }

    #[test]
    fn test_ball_trajectory_affected_by_hit_position() {
        let (mut world, config, map, mut events) = setup_world();
        create_paddle(&mut world, &map, &config, Side::Left);
        let paddle_x = config.paddle_x(Side::Left);
        let half = config.paddle_height / 2.0;

        create_ball(&mut world, &config, Vec2::new(paddle_x + 5.0, 200.0 - half + 1.0), Vec2::new(-120.0, 0.0));
        check_collisions(&mut world, &map, &config, &mut events);
        let top = only_ball(&world);
        assert!(top.vel.y < 0.0, "Ball should deflect upward when hitting top of paddle");

        world.clear();
        create_paddle(&mut world, &map, &config, Side::Left);
        create_ball(&mut world, &config, Vec2::new(paddle_x + 5.0, 200.0 + half - 1.0), Vec2::new(-120.0, 0.0));
        check_collisions(&mut world, &map, &config, &mut events);
        let bottom = only_ball(&world);
        assert!(bottom.vel.y > 0.0, "Ball should deflect downward when hitting bottom of paddle");

        let edge = (config.max_bounce_angle).sin() * config.ball_bounce_speed;
        assert!(bottom.vel.y <= edge + 0.001, "Deflection is bounded by the max angle");
    }

    #[test]
    fn test_ball_does_not_bounce_when_moving_away_from_paddle() {
        let (mut world, config, map, mut events) = setup_world();
        create_paddle(&mut world, &map, &config, Side::Left);
        let paddle_x = config.paddle_x(Side::Left);
        let ball_vel = Vec2::new(120.0, 0.0);
        create_ball(&mut world, &config, Vec2::new(paddle_x + 5.0, 200.0), ball_vel);

        check_collisions(&mut world, &map, &config, &mut events);

        assert_eq!(only_ball(&world).vel, ball_vel, "Ball should not bounce when moving away");
        assert!(!events.ball_hit_paddle, "Should not trigger collision when moving away");
    }

    #[test]
    fn test_taller_paddle_reaches_further() {
        let (mut world, config, map, mut events) = setup_world();
        let paddle = create_paddle(&mut world, &map, &config, Side::Left);
        world.get::<&mut Paddle>(paddle).unwrap().height = 120.0;
        let paddle_x = config.paddle_x(Side::Left);
        // 55px below centre misses an 80px paddle but hits a 120px one
        create_ball(&mut world, &config, Vec2::new(paddle_x + 5.0, 255.0), Vec2::new(-120.0, 0.0));

        check_collisions(&mut world, &map, &config, &mut events);

        assert!(events.ball_hit_paddle);
    }

    #[test]
    fn test_every_ball_collides() {
        let (mut world, config, map, mut events) = setup_world();
        create_ball(&mut world, &config, Vec2::new(300.0, 1.0), Vec2::new(60.0, -60.0));
        create_ball(&mut world, &config, Vec2::new(500.0, 399.0), Vec2::new(60.0, 60.0));

        check_collisions(&mut world, &map, &config, &mut events);

        for (_e, ball) in world.query::<&Ball>().iter() {
            assert!(ball.pos.y > 0.0 && ball.pos.y < map.height);
        }
        let ups = world.query::<&Ball>().iter().filter(|(_e, b)| b.vel.y < 0.0).count();
        assert_eq!(ups, 1, "Each ball bounces off its own wall");
    }
}
