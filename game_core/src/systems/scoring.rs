use crate::{random_serve, Ball, Config, Events, GameMap, GameRng, Score, Side};
use hecs::World;

/// Check if a ball left the arena (scoring)
///
/// Each exit awards exactly one point to the opposite side and serves the
/// ball again from the centre.
pub fn check_scoring(
    world: &mut World,
    map: &GameMap,
    score: &mut Score,
    events: &mut Events,
    rng: &mut GameRng,
    config: &Config,
) {
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        let scorer = if ball.pos.x < 0.0 {
            Side::Right
        } else if ball.pos.x > map.width {
            Side::Left
        } else {
            continue;
        };

        score.increment(scorer);
        match scorer {
            Side::Left => events.left_scored = true,
            Side::Right => events.right_scored = true,
        }

        ball.pos = map.ball_spawn();
        ball.vel = random_serve(config.ball_speed_initial, rng);
        ball.speed_scale = 1.0;
        ball.last_hit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_ball;
    use glam::Vec2;

    fn setup_world() -> (hecs::World, Config, GameMap, Score, Events, GameRng) {
        let world = hecs::World::new();
        let config = Config::new();
        let map = GameMap::new();
        let score = Score::new();
        let events = Events::new();
        let rng = GameRng::new(12345); // Fixed seed for deterministic tests
        (world, config, map, score, events, rng)
    }

    #[test]
    fn test_right_player_scores_when_ball_exits_left() {
        let (mut world, config, map, mut score, mut events, mut rng) = setup_world();
        create_ball(&mut world, &config, Vec2::new(-0.1, 120.0), Vec2::new(-120.0, 0.0));

        check_scoring(&mut world, &map, &mut score, &mut events, &mut rng, &config);

        assert_eq!(score.right, 1, "Right player should score");
        assert_eq!(score.left, 0, "Left player should not score");
        assert!(events.right_scored, "Should trigger right_scored event");
    }

    #[test]
    fn test_left_player_scores_when_ball_exits_right() {
        let (mut world, config, map, mut score, mut events, mut rng) = setup_world();
        create_ball(&mut world, &config, Vec2::new(map.width + 0.1, 120.0), Vec2::new(120.0, 0.0));

        check_scoring(&mut world, &map, &mut score, &mut events, &mut rng, &config);

        assert_eq!(score.left, 1, "Left player should score");
        assert_eq!(score.right, 0, "Right player should not score");
        assert!(events.left_scored, "Should trigger left_scored event");
    }

    #[test]
    fn test_ball_resets_after_scoring() {
        let (mut world, config, map, mut score, mut events, mut rng) = setup_world();
        create_ball(&mut world, &config, Vec2::new(-0.1, 120.0), Vec2::new(-120.0, 0.0));

        check_scoring(&mut world, &map, &mut score, &mut events, &mut rng, &config);

        for (_entity, ball) in world.query::<&Ball>().iter() {
            assert_eq!(ball.pos, map.ball_spawn(), "Ball should reset to center");
            assert_eq!(ball.vel.x.abs(), config.ball_speed_initial);
            assert_eq!(ball.vel.y.abs(), config.ball_speed_initial);
        }
    }

    #[test]
    fn test_point_is_awarded_once() {
        let (mut world, config, map, mut score, mut events, mut rng) = setup_world();
        create_ball(&mut world, &config, Vec2::new(-0.1, 120.0), Vec2::new(-120.0, 0.0));

        check_scoring(&mut world, &map, &mut score, &mut events, &mut rng, &config);
        events.clear();
        check_scoring(&mut world, &map, &mut score, &mut events, &mut rng, &config);

        assert_eq!(score.right, 1, "Reset ball must not score again");
        assert!(!events.right_scored);
    }

    #[test]
    fn test_serve_clears_speed_scale() {
        let (mut world, config, map, mut score, mut events, mut rng) = setup_world();
        let ball = create_ball(&mut world, &config, Vec2::new(-0.1, 120.0), Vec2::new(-240.0, 0.0));
        world.get::<&mut Ball>(ball).unwrap().speed_scale = 2.0;

        check_scoring(&mut world, &map, &mut score, &mut events, &mut rng, &config);

        assert_eq!(world.get::<&Ball>(ball).unwrap().speed_scale, 1.0);
    }

    #[test]
    fn test_no_scoring_when_ball_in_bounds() {
        let (mut world, config, map, mut score, mut events, mut rng) = setup_world();
        create_ball(&mut world, &config, Vec2::new(0.0, 120.0), Vec2::new(-120.0, 40.0));
        create_ball(&mut world, &config, Vec2::new(map.width, 120.0), Vec2::new(120.0, 40.0));

        check_scoring(&mut world, &map, &mut score, &mut events, &mut rng, &config);

        assert_eq!(score, Score::new(), "Edge contact is not an exit");
        assert!(!events.left_scored && !events.right_scored, "No scoring events");
    }
}
