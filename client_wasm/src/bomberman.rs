//! Bomberman canvas controller

use rand::Rng;

use game_core::bomberman::{BombermanGame, BombermanHistory, Outcome};
use game_core::{Difficulty, GameRng};

use crate::fsm::{Screen, ScreenAction, ScreenFsm};
use crate::input::{bomberman_direction, bomberman_game_over_key, GameOverKey};
use crate::menu::{Menu, MenuCommand, MenuKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    OpenUrl(&'static str),
    /// Round ended and the history changed; persist it
    RoundFinished(Outcome),
}

pub struct BombermanController {
    fsm: ScreenFsm,
    menu: Menu,
    game: Option<BombermanGame>,
    difficulty: Difficulty,
    history: BombermanHistory,
    rng: GameRng,
}

impl BombermanController {
    pub fn new(canvas_width: f32, seed: u64) -> Self {
        Self {
            fsm: ScreenFsm::at_menu(),
            menu: Menu::new(MenuKind::Bomberman, canvas_width),
            game: None,
            difficulty: Difficulty::default(),
            history: BombermanHistory::default(),
            rng: GameRng::new(seed),
        }
    }

    pub fn screen(&self) -> Screen {
        self.fsm.screen()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn game(&self) -> Option<&BombermanGame> {
        self.game.as_ref()
    }

    pub fn history(&self) -> &BombermanHistory {
        &self.history
    }

    pub fn set_history(&mut self, history: BombermanHistory) {
        self.history = history;
    }

    pub fn captures_key(&self, key: &str) -> bool {
        matches!(key, "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" | " ")
    }

    pub fn key_down(&mut self, key: &str) -> Vec<Effect> {
        match self.fsm.screen() {
            Screen::Menu => {
                let command = self.menu.key(key);
                self.apply(command)
            }
            Screen::Playing => {
                if let Some(game) = self.game.as_mut() {
                    if let Some(direction) = bomberman_direction(key) {
                        game.move_player(direction);
                    } else if key == " " {
                        game.place_bomb();
                    }
                }
                Vec::new()
            }
            Screen::GameOver => {
                match bomberman_game_over_key(key) {
                    Some(GameOverKey::Replay) => {
                        self.new_round();
                        self.fsm.transition(ScreenAction::Replay);
                    }
                    Some(GameOverKey::Menu) => {
                        self.game = None;
                        self.menu.reset();
                        self.fsm.transition(ScreenAction::BackToMenu);
                    }
                    None => {}
                }
                Vec::new()
            }
            Screen::Attract | Screen::Paused => Vec::new(),
        }
    }

    pub fn click(&mut self, x: f32, y: f32) -> Vec<Effect> {
        if self.fsm.screen() != Screen::Menu {
            return Vec::new();
        }
        let command = self.menu.click(x, y);
        self.apply(command)
    }

    fn apply(&mut self, command: MenuCommand) -> Vec<Effect> {
        match command {
            MenuCommand::Start { difficulty, .. } => {
                self.difficulty = difficulty;
                self.new_round();
                self.fsm.transition(ScreenAction::Start);
                Vec::new()
            }
            MenuCommand::OpenUrl(url) => vec![Effect::OpenUrl(url)],
            // Bomberman has no attract screen; Quit leaves the menu where it is
            MenuCommand::ToAttract | MenuCommand::ShowStats | MenuCommand::None => Vec::new(),
        }
    }

    fn new_round(&mut self) {
        self.game = Some(BombermanGame::new(self.difficulty, self.rng.0.gen()));
    }

    /// Advance one animation frame of `dt` seconds
    pub fn frame(&mut self, dt: f32) -> Vec<Effect> {
        if self.fsm.screen() != Screen::Playing {
            return Vec::new();
        }
        let Some(game) = self.game.as_mut() else {
            return Vec::new();
        };
        match game.update(dt * 1000.0) {
            Some(outcome) => {
                self.history.record(outcome, game.elapsed_secs(), *game.stats());
                self.fsm.transition(ScreenAction::MatchOver);
                vec![Effect::RoundFinished(outcome)]
            }
            None => Vec::new(),
        }
    }
}
