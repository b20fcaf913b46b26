//! Pong canvas controller
//!
//! Owns the screen state machine, the menu, the held keys and the running
//! session for one canvas. The browser layer forwards events and frames and
//! carries out the returned [`Effect`]s; everything here runs natively too.

use rand::Rng;

use game_core::session::{MatchSummary, Phase, PongSession, TournamentContext};
use game_core::stats::GameStats;
use game_core::{Config, ConfigError, Difficulty, GameMode, GameRng, Side, Variant};

use crate::fsm::{Screen, ScreenAction, ScreenFsm};
use crate::input::{pong_game_over_key, GameOverKey, KeyState, PaddleKeys};
use crate::menu::{Menu, MenuCommand, MenuKind, Page};

/// Work the browser layer has to do after an event
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    OpenUrl(&'static str),
    /// Stats panel opened; refresh it from the backend if there is one
    RefreshStats,
    MatchFinished(MatchSummary),
}

/// Variant from its page name, as passed by the host page
pub fn parse_variant(name: &str) -> Option<Variant> {
    serde_json::from_value(serde_json::Value::String(name.to_ascii_lowercase())).ok()
}

pub struct PongController {
    variant: Variant,
    fsm: ScreenFsm,
    menu: Menu,
    keys: KeyState,
    session: Option<PongSession>,
    stats: GameStats,
    stats_visible: bool,
    rng: GameRng,
}

impl PongController {
    pub fn new(variant: Variant, canvas_width: f32, seed: u64) -> Self {
        let kind = match variant {
            Variant::Embedded => MenuKind::Embedded,
            Variant::Classic | Variant::Enhanced => MenuKind::Pong,
        };
        Self {
            variant,
            fsm: ScreenFsm::new(),
            menu: Menu::new(kind, canvas_width),
            keys: KeyState::new(),
            session: None,
            stats: GameStats::new(),
            stats_visible: false,
            rng: GameRng::new(seed),
        }
    }

    /// Skip the menus and play a tournament match between two humans
    pub fn tournament(variant: Variant, canvas_width: f32, seed: u64, context: TournamentContext) -> Result<Self, ConfigError> {
        let mut controller = Self::new(variant, canvas_width, seed);
        let session = controller.new_session(GameMode::Multi, Difficulty::Medium)?;
        controller.session = Some(session.with_tournament(context));
        controller.fsm = ScreenFsm::playing();
        Ok(controller)
    }

    fn new_session(&mut self, mode: GameMode, difficulty: Difficulty) -> Result<PongSession, ConfigError> {
        let config = Config::for_variant(self.variant, difficulty);
        PongSession::new(config, mode, difficulty, self.rng.0.gen())
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn screen(&self) -> Screen {
        self.fsm.screen()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn session(&self) -> Option<&PongSession> {
        self.session.as_ref()
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn stats_visible(&self) -> bool {
        self.stats_visible
    }

    /// Replace the stats, e.g. with what the backend or storage returned
    pub fn set_stats(&mut self, stats: GameStats) {
        self.stats = stats;
    }

    fn paddle_keys(&self) -> PaddleKeys {
        match self.variant {
            Variant::Embedded => PaddleKeys::Embedded,
            Variant::Classic | Variant::Enhanced => PaddleKeys::Arcade,
        }
    }

    /// Whether the page should not also act on this key (scrolling)
    pub fn captures_key(&self, key: &str) -> bool {
        match self.fsm.screen() {
            Screen::Menu => matches!(key, "ArrowUp" | "ArrowDown" | " " | "Enter" | "Escape"),
            Screen::Playing | Screen::Paused => {
                let mode = self.session.as_ref().map(|s| s.mode()).unwrap_or_default();
                self.paddle_keys().is_paddle_key(key, mode)
            }
            Screen::Attract | Screen::GameOver => false,
        }
    }

    pub fn key_down(&mut self, key: &str) -> Vec<Effect> {
        match self.fsm.screen() {
            Screen::Attract => {
                self.open_menu();
                Vec::new()
            }
            Screen::Menu => {
                let command = self.menu.key(key);
                self.apply(command)
            }
            Screen::Playing | Screen::Paused => {
                self.keys.key_down(key);
                let embedded = self.variant == Variant::Embedded;
                match key {
                    "p" | "P" if embedded => self.toggle_pause(),
                    "Escape" if embedded => self.back_to_menu(),
                    _ => {}
                }
                Vec::new()
            }
            Screen::GameOver => {
                match pong_game_over_key(key) {
                    Some(GameOverKey::Replay) => self.replay(),
                    Some(GameOverKey::Menu) => self.back_to_menu(),
                    None => {}
                }
                Vec::new()
            }
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.key_up(key);
    }

    /// Click in canvas coordinates
    pub fn click(&mut self, x: f32, y: f32) -> Vec<Effect> {
        match self.fsm.screen() {
            Screen::Attract => {
                self.open_menu();
                Vec::new()
            }
            Screen::Menu => {
                let command = self.menu.click(x, y);
                self.apply(command)
            }
            _ => Vec::new(),
        }
    }

    fn open_menu(&mut self) {
        self.menu.reset();
        self.fsm.transition(ScreenAction::OpenMenu);
    }

    fn apply(&mut self, command: MenuCommand) -> Vec<Effect> {
        let mut effects = Vec::new();
        match command {
            MenuCommand::None => {}
            MenuCommand::Start { mode, difficulty } => self.start(mode, difficulty),
            MenuCommand::OpenUrl(url) => effects.push(Effect::OpenUrl(url)),
            MenuCommand::ShowStats => {
                self.stats_visible = true;
                effects.push(Effect::RefreshStats);
            }
            MenuCommand::ToAttract => {
                self.fsm.transition(ScreenAction::ToAttract);
            }
        }
        if self.menu.page() != Page::Info {
            self.stats_visible = false;
        }
        effects
    }

    fn start(&mut self, mode: GameMode, difficulty: Difficulty) {
        match self.new_session(mode, difficulty) {
            Ok(session) => {
                self.session = Some(session);
                self.keys.clear();
                self.fsm.transition(ScreenAction::Start);
            }
            Err(e) => log::error!("Cannot start match: {}", e),
        }
    }

    fn toggle_pause(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.toggle_pause() {
            Phase::Paused => {
                self.fsm.transition(ScreenAction::Pause);
            }
            Phase::Playing => {
                self.fsm.transition(ScreenAction::Resume);
            }
            Phase::Over => {}
        }
    }

    fn replay(&mut self) {
        // A tournament match is played once; the page redirects after posting the score
        if let Some(session) = self.session.as_mut().filter(|s| s.tournament().is_none()) {
            session.restart();
            self.keys.clear();
            self.fsm.transition(ScreenAction::Replay);
        }
    }

    fn back_to_menu(&mut self) {
        if self.fsm.transition(ScreenAction::BackToMenu).success {
            self.session = None;
            self.keys.clear();
            self.menu.reset();
        }
    }

    /// Advance one animation frame of `dt` seconds
    pub fn frame(&mut self, dt: f32) -> Vec<Effect> {
        if !self.fsm.is_running() {
            return Vec::new();
        }
        let keys = self.paddle_keys();
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let mode = session.mode();
        session.input(Side::Left, self.keys.paddle_dir(keys, Side::Left, mode));
        if mode == GameMode::Multi {
            session.input(Side::Right, self.keys.paddle_dir(keys, Side::Right, mode));
        }

        match session.update(dt) {
            Some(summary) => {
                self.stats.record(&summary);
                self.fsm.transition(ScreenAction::MatchOver);
                vec![Effect::MatchFinished(summary)]
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_single(controller: &mut PongController) {
        // Attract -> menu, then Play, Single, Easy
        controller.key_down("Enter");
        for key in [" ", " ", " "] {
            controller.key_down(key);
        }
    }

    fn finish(controller: &mut PongController) -> Option<MatchSummary> {
        for _ in 0..100_000 {
            for effect in controller.frame(PongSession::FRAME) {
                if let Effect::MatchFinished(summary) = effect {
                    return Some(summary);
                }
            }
        }
        None
    }

    #[test]
    fn test_menu_starts_match() {
        let mut controller = PongController::new(Variant::Classic, 800.0, 1);
        assert_eq!(controller.screen(), Screen::Attract);
        play_single(&mut controller);
        assert_eq!(controller.screen(), Screen::Playing);
        let session = controller.session().unwrap();
        assert_eq!(session.mode(), GameMode::Single);
        assert_eq!(session.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_held_keys_move_left_paddle() {
        let mut controller = PongController::new(Variant::Classic, 800.0, 1);
        play_single(&mut controller);
        let start = controller.session().unwrap().paddles()[0].y;

        controller.key_down("s");
        for _ in 0..10 {
            controller.frame(PongSession::FRAME);
        }
        controller.key_up("s");

        let moved = controller.session().unwrap().paddles()[0].y;
        assert!(moved > start, "Left paddle should move down: {} -> {}", start, moved);
    }

    #[test]
    fn test_pause_only_in_embedded() {
        let mut classic = PongController::new(Variant::Classic, 800.0, 1);
        play_single(&mut classic);
        classic.key_down("p");
        assert_eq!(classic.screen(), Screen::Playing);

        let mut embedded = PongController::new(Variant::Embedded, 800.0, 1);
        embedded.key_down(" ");
        embedded.key_down("Enter"); // Play
        embedded.key_down("Enter"); // Solo
        assert_eq!(embedded.screen(), Screen::Playing);
        embedded.key_down("p");
        assert_eq!(embedded.screen(), Screen::Paused);
        assert!(embedded.frame(PongSession::FRAME).is_empty());
        embedded.key_down("p");
        assert_eq!(embedded.screen(), Screen::Playing);
        embedded.key_down("Escape");
        assert_eq!(embedded.screen(), Screen::Menu);
        assert!(embedded.session().is_none());
    }

    #[test]
    fn test_match_end_records_stats_and_accepts_replay() {
        let mut controller = PongController::new(Variant::Classic, 800.0, 5);
        play_single(&mut controller);

        let Some(summary) = finish(&mut controller) else {
            // The computer and an idle player can rally forever; nothing to check then
            return;
        };
        assert_eq!(controller.screen(), Screen::GameOver);
        assert_eq!(controller.stats().total_games, 1);
        assert_eq!(summary.score.get(summary.winner), 3);

        controller.key_down("x");
        assert_eq!(controller.screen(), Screen::GameOver);
        controller.key_down("r");
        assert_eq!(controller.screen(), Screen::Playing);
        assert_eq!(controller.session().unwrap().score().left, 0);
    }

    #[test]
    fn test_embedded_info_shows_stats() {
        let mut controller = PongController::new(Variant::Embedded, 800.0, 1);
        controller.click(10.0, 10.0);
        assert_eq!(controller.screen(), Screen::Menu);
        // Main page: Play, Difficulty, Info, Quit
        controller.key_down("ArrowDown");
        controller.key_down("ArrowDown");
        controller.key_down(" ");
        assert_eq!(controller.key_down(" "), vec![Effect::RefreshStats]);
        assert!(controller.stats_visible());
        controller.key_down("Escape");
        assert!(!controller.stats_visible());
    }

    #[test]
    fn test_tournament_starts_playing_two_humans() {
        let context = TournamentContext {
            match_id: 3,
            tournament_id: 1,
            player1_id: 7,
            player2_id: 8,
        };
        let controller = PongController::tournament(Variant::Classic, 800.0, 1, context.clone()).unwrap();
        assert_eq!(controller.screen(), Screen::Playing);
        let session = controller.session().unwrap();
        assert_eq!(session.mode(), GameMode::Multi);
        assert_eq!(session.tournament(), Some(&context));
    }

    #[test]
    fn test_tournament_match_cannot_be_replayed() {
        let context = TournamentContext {
            match_id: 4,
            tournament_id: 2,
            player1_id: 7,
            player2_id: 8,
        };
        let mut controller = PongController::tournament(Variant::Classic, 800.0, 9, context).unwrap();
        // Both paddles parked at the top so the ball gets through
        controller.key_down("w");
        controller.key_down("ArrowUp");
        finish(&mut controller).expect("match should end");
        assert_eq!(controller.screen(), Screen::GameOver);

        controller.key_down("r");
        controller.key_down("b");

        assert_eq!(controller.screen(), Screen::GameOver);
        for _ in 0..600 {
            assert!(controller.frame(PongSession::FRAME).is_empty(), "Score is posted once");
        }
    }

    #[test]
    fn test_parse_variant() {
        assert_eq!(parse_variant("enhanced"), Some(Variant::Enhanced));
        assert_eq!(parse_variant("Embedded"), Some(Variant::Embedded));
        assert_eq!(parse_variant("tennis"), None);
    }

    #[test]
    fn test_captures_navigation_keys() {
        let mut controller = PongController::new(Variant::Classic, 800.0, 1);
        assert!(!controller.captures_key("ArrowDown"));
        controller.key_down(" ");
        assert!(controller.captures_key("ArrowDown"));
        assert!(!controller.captures_key("a"));
    }
}
