use glam::Vec2;
use hecs::World;
use rand::Rng;

use crate::resources::ActiveEffect;
use crate::{
    random_serve, Ball, Config, Events, GameMap, GameRng, Paddle, Params, PowerUp, PowerUpKind,
    PowerUpState, Side, Time,
};

/// Advance power-up timers, spawn new power-ups and resolve pickups
#[allow(clippy::too_many_arguments)]
pub fn update_powerups(
    world: &mut World,
    time: &Time,
    map: &GameMap,
    config: &Config,
    state: &mut PowerUpState,
    rng: &mut GameRng,
    events: &mut Events,
) {
    if !config.powerups_enabled {
        return;
    }

    // 1. Expire the active effect
    if let Some(effect) = state.active.as_mut() {
        effect.remaining -= time.dt;
        if effect.remaining <= 0.0 {
            revert_powerup(world, config, state);
            events.powerup_expired = true;
        }
    }

    // 2. Spawn roll every interval, only onto an empty field
    state.spawn_timer += time.dt;
    if state.spawn_timer >= config.powerup_interval {
        state.spawn_timer -= config.powerup_interval;
        let field_empty = world.query::<&PowerUp>().iter().next().is_none();
        if field_empty && rng.0.gen_bool(config.powerup_spawn_chance.clamp(0.0, 1.0)) {
            let kind = spawn_powerup(world, map, config, rng);
            log::debug!("power-up spawned: {}", kind.label());
            events.powerup_spawned = Some(kind);
        }
    }

    // 3. Pickups
    let balls: Vec<(Vec2, f32, Option<Side>)> = world
        .query::<&Ball>()
        .iter()
        .map(|(_e, b)| (b.pos, b.radius, b.last_hit))
        .collect();
    let powerups: Vec<(hecs::Entity, PowerUp)> = world
        .query::<&PowerUp>()
        .iter()
        .map(|(e, p)| (e, *p))
        .collect();

    for (entity, powerup) in powerups {
        let collector = balls
            .iter()
            .find(|(pos, radius, _)| pos.distance(powerup.pos) < config.powerup_radius + radius);
        if let Some(&(_, _, last_hit)) = collector {
            let _ = world.despawn(entity);
            apply_powerup(world, map, config, state, rng, powerup.kind, last_hit);
            events.powerup_taken = Some(powerup.kind);
        }
    }
}

/// Place a power-up of random kind at least its radius away from the edges
pub fn spawn_powerup(
    world: &mut World,
    map: &GameMap,
    config: &Config,
    rng: &mut GameRng,
) -> PowerUpKind {
    let r = config.powerup_radius;
    let x = random_between(rng, r, map.width - r);
    let y = random_between(rng, r, map.height - r);
    let kind = PowerUpKind::ALL[rng.0.gen_range(0..PowerUpKind::ALL.len())];
    world.spawn((PowerUp::new(Vec2::new(x, y), kind),));
    kind
}

fn random_between(rng: &mut GameRng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.0.gen_range(lo..hi)
    } else {
        (lo + hi) / 2.0
    }
}

/// Apply an effect for a fresh duration, reverting any active one first
///
/// `last_hit` is the side that last touched the collecting ball. The giant
/// paddle goes to that side (the computer when nobody has hit yet) and the
/// shrunken paddle to its opponent.
#[allow(clippy::too_many_arguments)]
pub fn apply_powerup(
    world: &mut World,
    map: &GameMap,
    config: &Config,
    state: &mut PowerUpState,
    rng: &mut GameRng,
    kind: PowerUpKind,
    last_hit: Option<Side>,
) {
    if state.active.is_some() {
        revert_powerup(world, config, state);
    }

    let mut speed_scale = 1.0;
    match kind {
        PowerUpKind::BigPaddle => {
            let side = last_hit.unwrap_or(Side::Right);
            resize_paddle(world, side, config.paddle_height * Params::BIG_PADDLE_FACTOR);
        }
        PowerUpKind::SmallPaddle => {
            let side = last_hit.map(Side::opponent).unwrap_or(Side::Left);
            resize_paddle(world, side, config.paddle_height * Params::SMALL_PADDLE_FACTOR);
        }
        PowerUpKind::SlowBall => {
            speed_scale = Params::SLOW_BALL_FACTOR;
            scale_ball_speeds(world, config, speed_scale);
        }
        PowerUpKind::FastBall => {
            speed_scale = Params::FAST_BALL_FACTOR;
            scale_ball_speeds(world, config, speed_scale);
        }
        PowerUpKind::InvertControls => {
            state.controls_inverted = true;
        }
        PowerUpKind::GhostBall => {
            for (_e, ball) in world.query_mut::<&mut Ball>() {
                ball.visible = false;
            }
        }
        PowerUpKind::MultiBall => {
            let vel = random_serve(config.ball_speed_initial, rng);
            let mut ball = Ball::new(map.ball_spawn(), vel, config.ball_radius);
            ball.extra = true;
            world.spawn((ball,));
        }
    }

    log::debug!("power-up applied: {}", kind.label());
    state.active = Some(ActiveEffect {
        kind,
        remaining: config.powerup_duration,
        speed_scale,
    });
}

/// Undo every power-up effect and clear the active slot
pub fn revert_powerup(world: &mut World, config: &Config, state: &mut PowerUpState) {
    for (_e, paddle) in world.query_mut::<&mut Paddle>() {
        paddle.height = config.paddle_height;
    }

    state.controls_inverted = false;

    // Balls served since the effect started carry a scale of 1.0
    for (_e, ball) in world.query_mut::<&mut Ball>() {
        if ball.speed_scale != 1.0 {
            ball.vel = scale_velocity(ball.vel, config, 1.0 / ball.speed_scale);
            ball.speed_scale = 1.0;
        }
    }

    if let Some(effect) = state.active {
        log::debug!("power-up reverted: {}", effect.kind.label());
    }

    let extras: Vec<hecs::Entity> = world
        .query::<&Ball>()
        .iter()
        .filter(|(_e, b)| b.extra)
        .map(|(e, _)| e)
        .collect();
    for entity in extras {
        let _ = world.despawn(entity);
    }

    for (_e, ball) in world.query_mut::<&mut Ball>() {
        ball.visible = true;
    }

    state.active = None;
}

fn resize_paddle(world: &mut World, side: Side, height: f32) {
    for (_e, paddle) in world.query_mut::<&mut Paddle>() {
        if paddle.side == side {
            paddle.height = height;
        }
    }
}

fn scale_ball_speeds(world: &mut World, config: &Config, factor: f32) {
    for (_e, ball) in world.query_mut::<&mut Ball>() {
        ball.vel = scale_velocity(ball.vel, config, factor);
        ball.speed_scale = factor;
    }
}

/// Scale each velocity axis, keeping it between the per-axis floor and the cap
fn scale_velocity(vel: Vec2, config: &Config, factor: f32) -> Vec2 {
    let scale_axis = |v: f32| {
        if v == 0.0 {
            return 0.0;
        }
        let magnitude = (v.abs() * factor).clamp(config.ball_speed_min_axis, config.ball_speed_max);
        magnitude.copysign(v)
    };
    Vec2::new(scale_axis(vel.x), scale_axis(vel.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Variant};
    use crate::{create_ball, create_paddle};

    struct Fixture {
        world: World,
        config: Config,
        map: GameMap,
        state: PowerUpState,
        rng: GameRng,
        events: Events,
    }

    fn setup() -> Fixture {
        let config = Config::for_variant(Variant::Enhanced, Difficulty::Medium);
        let map = GameMap::from_config(&config);
        let mut world = World::new();
        create_paddle(&mut world, &map, &config, Side::Left);
        create_paddle(&mut world, &map, &config, Side::Right);
        create_ball(&mut world, &config, map.ball_spawn(), Vec2::new(120.0, 120.0));
        Fixture {
            world,
            config,
            map,
            state: PowerUpState::new(),
            rng: GameRng::new(42),
            events: Events::new(),
        }
    }

    impl Fixture {
        fn apply(&mut self, kind: PowerUpKind, last_hit: Option<Side>) {
            apply_powerup(
                &mut self.world,
                &self.map,
                &self.config,
                &mut self.state,
                &mut self.rng,
                kind,
                last_hit,
            );
        }

        fn tick(&mut self, dt: f32) {
            update_powerups(
                &mut self.world,
                &Time::new(dt, 0.0),
                &self.map,
                &self.config,
                &mut self.state,
                &mut self.rng,
                &mut self.events,
            );
        }

        fn height(&self, side: Side) -> f32 {
            self.world
                .query::<&Paddle>()
                .iter()
                .find(|(_e, p)| p.side == side)
                .map(|(_e, p)| p.height)
                .unwrap()
        }

        fn ball_count(&self) -> usize {
            self.world.query::<&Ball>().iter().count()
        }

        fn first_ball(&self) -> Ball {
            *self.world.query::<&Ball>().iter().next().unwrap().1
        }
    }

    #[test]
    fn test_big_paddle_goes_to_hitter() {
        let mut f = setup();
        f.apply(PowerUpKind::BigPaddle, Some(Side::Left));
        assert_eq!(f.height(Side::Left), 120.0);
        assert_eq!(f.height(Side::Right), 80.0);
    }

    #[test]
    fn test_big_paddle_defaults_to_computer() {
        let mut f = setup();
        f.apply(PowerUpKind::BigPaddle, None);
        assert_eq!(f.height(Side::Right), 120.0);
    }

    #[test]
    fn test_small_paddle_goes_to_opponent() {
        let mut f = setup();
        f.apply(PowerUpKind::SmallPaddle, Some(Side::Left));
        assert_eq!(f.height(Side::Right), 40.0);
        assert_eq!(f.height(Side::Left), 80.0);
    }

    #[test]
    fn test_slow_ball_respects_floor() {
        let mut f = setup();
        f.apply(PowerUpKind::SlowBall, None);
        let ball = f.first_ball();
        assert_eq!(ball.vel, Vec2::new(60.0, 60.0));
    }

    #[test]
    fn test_fast_ball_is_capped() {
        let mut f = setup();
        for (_e, ball) in f.world.query_mut::<&mut Ball>() {
            ball.vel = Vec2::new(300.0, -100.0);
        }
        f.apply(PowerUpKind::FastBall, None);
        assert_eq!(f.first_ball().vel, Vec2::new(480.0, -200.0));
    }

    #[test]
    fn test_multi_ball_adds_centre_ball() {
        let mut f = setup();
        f.apply(PowerUpKind::MultiBall, None);
        assert_eq!(f.ball_count(), 2);
        let extra = f
            .world
            .query::<&Ball>()
            .iter()
            .find(|(_e, b)| b.extra)
            .map(|(_e, b)| *b)
            .unwrap();
        assert_eq!(extra.pos, f.map.ball_spawn());
    }

    #[test]
    fn test_every_effect_reverts_after_duration() {
        for kind in PowerUpKind::ALL {
            let mut f = setup();
            f.apply(kind, Some(Side::Left));
            assert!(f.state.active.is_some());

            for _ in 0..(5 * 60 + 1) {
                f.tick(Params::FIXED_DT);
            }

            assert!(f.state.active.is_none(), "{:?} should expire", kind);
            assert_eq!(f.height(Side::Left), 80.0, "{:?} left height", kind);
            assert_eq!(f.height(Side::Right), 80.0, "{:?} right height", kind);
            assert_eq!(f.ball_count(), 1, "{:?} ball count", kind);
            assert!(f.first_ball().visible, "{:?} visibility", kind);
            assert!(!f.state.controls_inverted, "{:?} controls", kind);
            assert!(f.events.powerup_expired);
        }
    }

    #[test]
    fn test_effect_still_active_before_duration() {
        let mut f = setup();
        f.apply(PowerUpKind::GhostBall, None);
        for _ in 0..(4 * 60) {
            f.tick(Params::FIXED_DT);
        }
        assert!(!f.first_ball().visible);
        assert_eq!(f.state.active_label(), Some("Ghost ball"));
    }

    #[test]
    fn test_speed_effect_is_undone() {
        let mut f = setup();
        f.apply(PowerUpKind::FastBall, None);
        assert_eq!(f.first_ball().vel, Vec2::new(240.0, 240.0));
        revert_powerup(&mut f.world, &f.config, &mut f.state);
        assert_eq!(f.first_ball().vel, Vec2::new(120.0, 120.0));
    }

    #[test]
    fn test_ball_served_during_speed_effect_keeps_serve_speed() {
        for kind in [PowerUpKind::FastBall, PowerUpKind::SlowBall] {
            let mut f = setup();
            f.apply(kind, None);
            for (_e, ball) in f.world.query_mut::<&mut Ball>() {
                ball.pos.x = -1.0;
            }
            let mut score = crate::Score::new();
            crate::systems::scoring::check_scoring(
                &mut f.world,
                &f.map,
                &mut score,
                &mut f.events,
                &mut f.rng,
                &f.config,
            );
            let served = f.first_ball().vel;

            revert_powerup(&mut f.world, &f.config, &mut f.state);

            assert_eq!(f.first_ball().vel, served, "{:?} must leave a fresh serve alone", kind);
            assert_eq!(served.x.abs(), f.config.ball_speed_initial);
        }
    }

    #[test]
    fn test_new_pickup_replaces_active_effect() {
        let mut f = setup();
        f.apply(PowerUpKind::BigPaddle, Some(Side::Left));
        f.apply(PowerUpKind::InvertControls, None);

        assert_eq!(f.height(Side::Left), 80.0, "Previous effect reverted");
        assert!(f.state.controls_inverted);
        let effect = f.state.active.unwrap();
        assert_eq!(effect.kind, PowerUpKind::InvertControls);
        assert_eq!(effect.remaining, f.config.powerup_duration);
    }

    #[test]
    fn test_ball_collects_powerup() {
        let mut f = setup();
        let pos = f.first_ball().pos + Vec2::new(10.0, 0.0);
        f.world.spawn((PowerUp::new(pos, PowerUpKind::GhostBall),));

        f.tick(Params::FIXED_DT);

        assert_eq!(f.world.query::<&PowerUp>().iter().count(), 0);
        assert_eq!(f.events.powerup_taken, Some(PowerUpKind::GhostBall));
        assert!(!f.first_ball().visible);
    }

    #[test]
    fn test_spawn_only_on_interval_and_empty_field() {
        let mut f = setup();
        f.config.powerup_spawn_chance = 1.0;
        // Keep the ball far from anything that could be spawned
        for (_e, ball) in f.world.query_mut::<&mut Ball>() {
            ball.pos = Vec2::new(-1000.0, -1000.0);
        }

        f.tick(5.0);
        assert_eq!(f.world.query::<&PowerUp>().iter().count(), 0);

        f.tick(5.0);
        assert_eq!(f.world.query::<&PowerUp>().iter().count(), 1);
        assert!(f.events.powerup_spawned.is_some());

        f.tick(10.0);
        assert_eq!(f.world.query::<&PowerUp>().iter().count(), 1, "Field already occupied");
    }

    #[test]
    fn test_spawned_powerup_stays_off_edges() {
        let mut f = setup();
        for _ in 0..50 {
            spawn_powerup(&mut f.world, &f.map, &f.config, &mut f.rng);
        }
        for (_e, p) in f.world.query::<&PowerUp>().iter() {
            assert!(p.pos.x >= 20.0 && p.pos.x <= 780.0);
            assert!(p.pos.y >= 20.0 && p.pos.y <= 380.0);
        }
    }

    #[test]
    fn test_disabled_in_classic() {
        let mut f = setup();
        f.config.powerups_enabled = false;
        f.config.powerup_spawn_chance = 1.0;
        f.tick(20.0);
        assert_eq!(f.world.query::<&PowerUp>().iter().count(), 0);
    }
}
