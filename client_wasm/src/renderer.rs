//! Canvas 2D drawing for the Pong and Bomberman screens

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use game_core::bomberman::{BombermanGame, Owner, Tile};
use game_core::session::PongSession;
use game_core::stats::{winner_label, GameStats};
use game_core::{Params, PowerUpKind, Variant};

use crate::bomberman::BombermanController;
use crate::fsm::Screen;
use crate::menu::{Menu, MenuKind, Page};
use crate::pong::PongController;

const BACKGROUND: &str = "#000000";
const FOREGROUND: &str = "#ffffff";
const ACCENT: &str = "#00ff99";
const DIM: &str = "rgba(0,0,0,0.7)";
const FONT: &str = "'Press Start 2P', monospace";

pub struct Canvas {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl Canvas {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            ctx,
            width: f64::from(canvas.width()),
            height: f64::from(canvas.height()),
        })
    }

    fn clear(&self) {
        self.ctx.set_fill_style_str(BACKGROUND);
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
    }

    fn text(&self, text: &str, x: f64, y: f64, size: u32, color: &str) {
        self.ctx.set_font(&format!("{}px {}", size, FONT));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_text(text, x, y).ok();
    }

    fn circle(&self, x: f64, y: f64, r: f64, color: &str) {
        self.ctx.begin_path();
        self.ctx.arc(x, y, r, 0.0, TAU).ok();
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
    }

    fn dim(&self) {
        self.ctx.set_fill_style_str(DIM);
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
    }

    pub fn draw_pong(&self, controller: &PongController) {
        self.clear();
        match controller.screen() {
            Screen::Attract => self.attract(controller.variant()),
            Screen::Menu => {
                self.menu(controller.menu());
                if controller.stats_visible() {
                    self.stats_panel(controller.stats());
                }
            }
            Screen::Playing => {
                if let Some(session) = controller.session() {
                    self.field(session);
                }
            }
            Screen::Paused => {
                if let Some(session) = controller.session() {
                    self.field(session);
                }
                self.dim();
                self.text("PAUSED", self.width / 2.0, self.height / 2.0 - 20.0, 32, FOREGROUND);
                self.text("P to resume, Esc for menu", self.width / 2.0, self.height / 2.0 + 30.0, 12, FOREGROUND);
            }
            Screen::GameOver => {
                if let Some(session) = controller.session() {
                    self.field(session);
                    self.pong_game_over(session);
                }
            }
        }
    }

    fn attract(&self, variant: Variant) {
        let title = match variant {
            Variant::Enhanced => "PONG+",
            _ => "PONG",
        };
        self.text(title, self.width / 2.0, self.height / 2.0 - 40.0, 48, FOREGROUND);
        self.text("Press any key", self.width / 2.0, self.height / 2.0 + 40.0, 14, ACCENT);
    }

    fn field(&self, session: &PongSession) {
        let config = session.config();
        let centre = self.width / 2.0;

        self.ctx.set_fill_style_str(FOREGROUND);
        let mut y = 0.0;
        while y < self.height {
            self.ctx.fill_rect(centre - 1.0, y, 2.0, 10.0);
            y += 20.0;
        }

        for paddle in session.paddles() {
            self.ctx.set_fill_style_str(FOREGROUND);
            self.ctx.fill_rect(
                f64::from(paddle.x - paddle.width / 2.0),
                f64::from(paddle.y - paddle.height / 2.0),
                f64::from(paddle.width),
                f64::from(paddle.height),
            );
        }

        for powerup in session.powerups() {
            self.circle(
                f64::from(powerup.pos.x),
                f64::from(powerup.pos.y),
                f64::from(config.powerup_radius),
                powerup_color(powerup.kind),
            );
        }

        for ball in session.balls().iter().filter(|b| b.visible) {
            self.circle(f64::from(ball.pos.x), f64::from(ball.pos.y), f64::from(ball.radius), FOREGROUND);
        }

        let score = session.score();
        self.text(&score.left.to_string(), centre - 60.0, 40.0, 32, FOREGROUND);
        self.text(&score.right.to_string(), centre + 60.0, 40.0, 32, FOREGROUND);

        if let Some(label) = session.active_powerup() {
            self.text(label, centre, self.height - 20.0, 12, ACCENT);
        }
    }

    fn pong_game_over(&self, session: &PongSession) {
        let Some(summary) = session.summary() else {
            return;
        };
        self.dim();
        let mid = self.height / 2.0;
        let winner = winner_label(summary.winner, summary.mode);
        self.text(&format!("{} wins!", winner), self.width / 2.0, mid - 40.0, 28, FOREGROUND);
        self.text(
            &format!("{} - {}", summary.score.left, summary.score.right),
            self.width / 2.0,
            mid,
            20,
            FOREGROUND,
        );
        let hint = if summary.tournament.is_some() {
            "Returning to the tournament..."
        } else {
            "B to replay, Q for menu"
        };
        self.text(hint, self.width / 2.0, mid + 50.0, 12, ACCENT);
    }

    fn menu(&self, menu: &Menu) {
        let heading = match menu.kind() {
            MenuKind::Bomberman => "BOMBERMAN",
            _ => "PONG",
        };
        self.text(heading, self.width / 2.0, 60.0, 36, FOREGROUND);
        self.text(menu.title(), self.width / 2.0, 115.0, 14, ACCENT);

        if menu.page() == Page::Info {
            self.info_bubble(menu);
            return;
        }

        for (index, button) in menu.buttons().iter().enumerate() {
            let rect = menu.button_rect(index);
            let focused = index == menu.focus();
            self.ctx.set_fill_style_str(if focused { ACCENT } else { "#222222" });
            self.ctx.fill_rect(
                f64::from(rect.x),
                f64::from(rect.y),
                f64::from(rect.width),
                f64::from(rect.height),
            );
            self.text(
                button.label(menu.kind()),
                f64::from(rect.x + rect.width / 2.0),
                f64::from(rect.y + rect.height / 2.0),
                14,
                if focused { BACKGROUND } else { FOREGROUND },
            );
        }

        if menu.page() == Page::Difficulty || menu.kind() == MenuKind::Embedded {
            self.text(
                &format!("Difficulty: {}", menu.difficulty().as_str()),
                self.width / 2.0,
                self.height - 20.0,
                10,
                FOREGROUND,
            );
        }
    }

    fn info_bubble(&self, menu: &Menu) {
        let bubble = menu.info_bubble();
        let (x, y) = (f64::from(bubble.x), f64::from(bubble.y));
        self.ctx.set_fill_style_str("#222222");
        self.ctx.fill_rect(x, y, f64::from(bubble.width), f64::from(bubble.height));

        let lines: &[&str] = match menu.kind() {
            MenuKind::Bomberman => &["Arrows move", "Space drops a bomb", "Clear all enemies"],
            MenuKind::Embedded => &["W/S or arrows", "O/L for player 2", "P pauses, Esc quits"],
            MenuKind::Pong => &["W/S for player 1", "Arrows for player 2", "First to 3 wins"],
        };
        let centre = x + f64::from(bubble.width) / 2.0;
        for (i, line) in lines.iter().enumerate() {
            self.text(line, centre, y + 50.0 + 30.0 * i as f64, 10, FOREGROUND);
        }

        for (index, button) in menu.buttons().iter().enumerate() {
            let rect = menu.button_rect(index);
            let focused = index == menu.focus();
            self.ctx.set_fill_style_str(if focused { ACCENT } else { "#444444" });
            self.ctx.fill_rect(
                f64::from(rect.x),
                f64::from(rect.y),
                f64::from(rect.width),
                f64::from(rect.height),
            );
            self.text(
                button.label(menu.kind()),
                f64::from(rect.x + rect.width / 2.0),
                f64::from(rect.y + rect.height / 2.0),
                10,
                if focused { BACKGROUND } else { FOREGROUND },
            );
        }
    }

    fn stats_panel(&self, stats: &GameStats) {
        self.dim();
        let x = self.width / 2.0;
        self.text("STATISTICS", x, 60.0, 20, ACCENT);
        let rows = [
            format!("Games: {}", stats.total_games),
            format!("Wins: {}  Losses: {}", stats.win_loss.wins, stats.win_loss.losses),
            format!("Win ratio: {:.0}%", stats.win_ratio()),
            format!("Points: {} - {}", stats.total_score.left, stats.total_score.right),
            format!("Perfect games: {}", stats.perfect_games.left),
        ];
        for (i, row) in rows.iter().enumerate() {
            self.text(row, x, 110.0 + 28.0 * i as f64, 12, FOREGROUND);
        }
        for (i, game) in stats.last_games.iter().enumerate() {
            let line = format!("{} {}-{} ({:.0}s)", game.winner, game.score.left, game.score.right, game.duration_secs);
            self.text(&line, x, 270.0 + 20.0 * i as f64, 10, FOREGROUND);
        }
    }

    pub fn draw_bomberman(&self, controller: &BombermanController) {
        self.clear();
        match controller.screen() {
            Screen::Menu => self.menu(controller.menu()),
            Screen::Playing => {
                if let Some(game) = controller.game() {
                    self.grid(game);
                }
            }
            Screen::GameOver => {
                if let Some(game) = controller.game() {
                    self.grid(game);
                    self.dim();
                    let history = controller.history();
                    let mid = self.height / 2.0;
                    let won = game.outcome() == Some(game_core::bomberman::Outcome::Won);
                    self.text(if won { "YOU WIN!" } else { "GAME OVER" }, self.width / 2.0, mid - 40.0, 28, FOREGROUND);
                    self.text(
                        &format!("{} won of {} ({:.0}%)", history.wins, history.total_games, history.win_ratio()),
                        self.width / 2.0,
                        mid,
                        12,
                        FOREGROUND,
                    );
                    self.text("Space to replay, Q for menu", self.width / 2.0, mid + 40.0, 12, ACCENT);
                }
            }
            Screen::Attract | Screen::Paused => {}
        }
    }

    fn grid(&self, game: &BombermanGame) {
        let cell = f64::from(Params::CELL_SIZE);
        let grid = game.grid();
        for y in 0..grid.size() {
            for x in 0..grid.size() {
                let color = match grid.get(glam::IVec2::new(x, y)) {
                    Tile::Wall => "#555555",
                    Tile::Block => "#8b5a2b",
                    Tile::Empty => "#1f6f3f",
                };
                self.ctx.set_fill_style_str(color);
                self.ctx.fill_rect(f64::from(x) * cell, f64::from(y) * cell, cell, cell);
            }
        }

        let centre = |pos: glam::IVec2| (f64::from(pos.x) * cell + cell / 2.0, f64::from(pos.y) * cell + cell / 2.0);

        for bomb in game.bombs() {
            let (cx, cy) = centre(bomb.pos);
            self.circle(cx, cy, cell * 0.35, "#111111");
        }

        for explosion in game.explosions() {
            let color = match explosion.owner {
                Owner::Player => format!("rgba(255,140,0,{:.2})", explosion.strength()),
                Owner::Enemy => format!("rgba(255,40,40,{:.2})", explosion.strength()),
            };
            self.ctx.set_fill_style_str(&color);
            self.ctx.fill_rect(
                f64::from(explosion.pos.x) * cell,
                f64::from(explosion.pos.y) * cell,
                cell,
                cell,
            );
        }

        for enemy in game.enemies() {
            let (cx, cy) = centre(enemy.pos);
            self.circle(cx, cy, cell * 0.4, "#d22");
        }

        let (px, py) = centre(game.player().pos);
        self.circle(px, py, cell * 0.4, "#39f");
    }
}

fn powerup_color(kind: PowerUpKind) -> &'static str {
    match kind {
        PowerUpKind::BigPaddle => "#4caf50",
        PowerUpKind::SmallPaddle => "#f44336",
        PowerUpKind::SlowBall => "#2196f3",
        PowerUpKind::FastBall => "#ff9800",
        PowerUpKind::InvertControls => "#9c27b0",
        PowerUpKind::GhostBall => "#9e9e9e",
        PowerUpKind::MultiBall => "#ffeb3b",
    }
}
