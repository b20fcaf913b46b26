use hecs::World;

use crate::config::{ConfigError, Difficulty, GameMode};
use crate::systems::revert_powerup;
use crate::{
    create_ball, create_paddle, random_serve, AiControlled, Ball, Config, Events, GameMap,
    GameRng, InputQueue, Paddle, Params, PowerUp, PowerUpState, Score, Side, Time,
};

/// Where a Pong session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Paused,
    Over,
}

/// Identifies a tournament match being played on this canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentContext {
    pub match_id: u64,
    pub tournament_id: u64,
    pub player1_id: u64,
    pub player2_id: u64,
}

impl TournamentContext {
    /// Backend id of the player on `side`
    pub fn player_id(&self, side: Side) -> u64 {
        match side {
            Side::Left => self.player1_id,
            Side::Right => self.player2_id,
        }
    }
}

/// Result of a finished match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSummary {
    pub winner: Side,
    pub score: Score,
    pub duration_secs: f32,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub tournament: Option<TournamentContext>,
}

/// Paddle geometry ready for drawing; `x`/`y` are the centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleView {
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One Pong match: world, resources and the clock driving them
pub struct PongSession {
    world: World,
    config: Config,
    map: GameMap,
    mode: GameMode,
    difficulty: Difficulty,
    score: Score,
    time: Time,
    events: Events,
    input_queue: InputQueue,
    powerups: PowerUpState,
    rng: GameRng,
    phase: Phase,
    summary: Option<MatchSummary>,
    tournament: Option<TournamentContext>,
}

impl PongSession {
    pub fn new(
        config: Config,
        mode: GameMode,
        difficulty: Difficulty,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let map = GameMap::from_config(&config);
        let mut session = Self {
            world: World::new(),
            config,
            map,
            mode,
            difficulty,
            score: Score::new(),
            time: Time::new(0.0, 0.0),
            events: Events::new(),
            input_queue: InputQueue::new(),
            powerups: PowerUpState::new(),
            rng: GameRng::new(seed),
            phase: Phase::Playing,
            summary: None,
            tournament: None,
        };
        session.populate();
        log::info!(
            "match started: {:?} {:?} {:?}, first to {}",
            session.config.variant,
            mode,
            difficulty,
            session.config.win_score
        );
        Ok(session)
    }

    /// Attach a tournament match; both paddles become human controlled
    pub fn with_tournament(mut self, context: TournamentContext) -> Self {
        self.tournament = Some(context);
        if self.mode != GameMode::Multi {
            self.mode = GameMode::Multi;
            self.populate();
        }
        self
    }

    fn populate(&mut self) {
        self.world.clear();
        create_paddle(&mut self.world, &self.map, &self.config, Side::Left);
        let right = create_paddle(&mut self.world, &self.map, &self.config, Side::Right);
        if self.mode == GameMode::Single {
            // Entity was spawned just above, insertion cannot fail
            let _ = self.world.insert_one(right, AiControlled);
        }
        let vel = random_serve(self.config.ball_speed_initial, &mut self.rng);
        create_ball(&mut self.world, &self.config, self.map.ball_spawn(), vel);
    }

    /// Advance the match by `dt` seconds
    ///
    /// Returns the summary exactly once, on the frame the match ends.
    pub fn update(&mut self, dt: f32) -> Option<MatchSummary> {
        if self.phase != Phase::Playing {
            self.events.clear();
            return None;
        }

        self.time.dt = dt.max(0.0);
        crate::step(
            &mut self.world,
            &mut self.time,
            &self.map,
            &self.config,
            &mut self.score,
            &mut self.events,
            &mut self.input_queue,
            &mut self.powerups,
            &mut self.rng,
        );

        let winner = self.score.has_winner(self.config.win_score)?;
        self.phase = Phase::Over;
        let summary = MatchSummary {
            winner,
            score: self.score,
            duration_secs: self.time.now,
            mode: self.mode,
            difficulty: self.difficulty,
            tournament: self.tournament.clone(),
        };
        log::info!(
            "match over: {:?} wins {}-{} after {:.1}s",
            winner,
            self.score.left,
            self.score.right,
            self.time.now
        );
        self.summary = Some(summary.clone());
        Some(summary)
    }

    /// Queue a held direction for a human paddle (-1 up, 0 stop, 1 down)
    pub fn input(&mut self, side: Side, dir: i8) {
        self.input_queue.push_input(side, dir);
    }

    pub fn toggle_pause(&mut self) -> Phase {
        self.phase = match self.phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            Phase::Over => Phase::Over,
        };
        self.phase
    }

    /// Start a fresh match with the same settings
    pub fn restart(&mut self) {
        revert_powerup(&mut self.world, &self.config, &mut self.powerups);
        self.powerups = PowerUpState::new();
        self.score = Score::new();
        self.time = Time::new(0.0, 0.0);
        self.events.clear();
        self.input_queue.clear();
        self.summary = None;
        self.phase = Phase::Playing;
        self.populate();
        log::info!("match restarted");
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn summary(&self) -> Option<&MatchSummary> {
        self.summary.as_ref()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn events(&self) -> &Events {
        &self.events
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn tournament(&self) -> Option<&TournamentContext> {
        self.tournament.as_ref()
    }

    pub fn elapsed(&self) -> f32 {
        self.time.now
    }

    pub fn balls(&self) -> Vec<Ball> {
        self.world.query::<&Ball>().iter().map(|(_e, b)| *b).collect()
    }

    pub fn paddles(&self) -> Vec<PaddleView> {
        let mut views: Vec<PaddleView> = self
            .world
            .query::<&Paddle>()
            .iter()
            .map(|(_e, p)| PaddleView {
                side: p.side,
                x: self.config.paddle_x(p.side),
                y: p.y,
                width: self.config.paddle_width,
                height: p.height,
            })
            .collect();
        views.sort_by_key(|v| v.side == Side::Right);
        views
    }

    pub fn powerups(&self) -> Vec<PowerUp> {
        self.world.query::<&PowerUp>().iter().map(|(_e, p)| *p).collect()
    }

    /// HUD label of the running power-up effect
    pub fn active_powerup(&self) -> Option<&'static str> {
        self.powerups.active_label()
    }

    pub fn controls_inverted(&self) -> bool {
        self.powerups.controls_inverted
    }

    /// One fixed simulation step
    pub const FRAME: f32 = Params::FIXED_DT;
}
