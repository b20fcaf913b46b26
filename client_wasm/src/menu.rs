//! Menu pages and keyboard focus
//!
//! The menus are plain data: a page, the focused button and the choices
//! made so far. Key presses and clicks produce a [`MenuCommand`] that the
//! app applies; drawing reads the same state.

use game_core::{Difficulty, GameMode};

/// Wikipedia page opened by the "More" button of the DOM menus
pub const PONG_INFO_URL: &str = "https://en.wikipedia.org/wiki/Pong";
pub const BOMBERMAN_INFO_URL: &str = "https://en.wikipedia.org/wiki/Bomberman";

/// Which menu layout a game uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    /// Classic and power-up Pong, DOM buttons
    Pong,
    /// Bomberman, DOM buttons, single player only
    Bomberman,
    /// SPA-embedded Pong, buttons drawn on the canvas
    Embedded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Main,
    Info,
    Mode,
    Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    Play,
    Settings,
    Info,
    Quit,
    More,
    Close,
    Single,
    Multi,
    Back,
    Easy,
    Medium,
    Hard,
}

impl ButtonId {
    pub fn label(self, kind: MenuKind) -> &'static str {
        match self {
            ButtonId::Play => "Play",
            ButtonId::Settings => "Difficulty",
            ButtonId::Info => "Info",
            ButtonId::Quit => "Quit",
            ButtonId::More => "More",
            ButtonId::Close => "Close",
            ButtonId::Single if kind == MenuKind::Embedded => "Solo",
            ButtonId::Single => "Single player",
            ButtonId::Multi => "Multiplayer",
            ButtonId::Back => "Back",
            ButtonId::Easy => "Easy",
            ButtonId::Medium => "Medium",
            ButtonId::Hard => "Hard",
        }
    }
}

/// What the app should do after a menu interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    None,
    Start {
        mode: GameMode,
        difficulty: Difficulty,
    },
    OpenUrl(&'static str),
    /// Show the stats panel (canvas menus)
    ShowStats,
    ToAttract,
}

/// Axis-aligned clickable area in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Menu pages for one game canvas
#[derive(Debug, Clone)]
pub struct Menu {
    kind: MenuKind,
    page: Page,
    focus: usize,
    mode: GameMode,
    difficulty: Difficulty,
    canvas_width: f32,
}

impl Menu {
    pub fn new(kind: MenuKind, canvas_width: f32) -> Self {
        Self {
            kind,
            page: Page::Main,
            focus: 0,
            mode: GameMode::Single,
            difficulty: Difficulty::Medium,
            canvas_width,
        }
    }

    pub fn kind(&self) -> MenuKind {
        self.kind
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Back to the main page with the first button focused
    pub fn reset(&mut self) {
        self.open(Page::Main);
    }

    pub fn buttons(&self) -> &'static [ButtonId] {
        use ButtonId::*;
        match (self.kind, self.page) {
            (MenuKind::Embedded, Page::Main) => &[Play, Settings, Info, Quit],
            (_, Page::Main) => &[Play, Info, Quit],
            (_, Page::Info) => &[More, Close],
            (MenuKind::Bomberman, Page::Mode) => &[Single, Back],
            (_, Page::Mode) => &[Single, Multi, Back],
            (_, Page::Difficulty) => &[Easy, Medium, Hard, Back],
        }
    }

    pub fn focused(&self) -> Option<ButtonId> {
        self.buttons().get(self.focus).copied()
    }

    /// Page title for canvas drawing
    pub fn title(&self) -> &'static str {
        match self.page {
            Page::Main => "Main menu",
            Page::Info => "About",
            Page::Mode => "Game mode",
            Page::Difficulty => "Difficulty",
        }
    }

    /// Handle a key press while a menu page is shown
    pub fn key(&mut self, key: &str) -> MenuCommand {
        let count = self.buttons().len();
        match key {
            "ArrowDown" => {
                self.focus = (self.focus + 1) % count;
                MenuCommand::None
            }
            "ArrowUp" => {
                self.focus = (self.focus + count - 1) % count;
                MenuCommand::None
            }
            " " => self.activate_focused(),
            "Enter" if self.kind == MenuKind::Embedded => self.activate_focused(),
            "Escape" if self.kind == MenuKind::Embedded => {
                if self.page == Page::Main {
                    MenuCommand::ToAttract
                } else {
                    self.open(Page::Main);
                    MenuCommand::None
                }
            }
            _ => MenuCommand::None,
        }
    }

    fn activate_focused(&mut self) -> MenuCommand {
        match self.focused() {
            Some(button) => self.activate(button),
            None => MenuCommand::None,
        }
    }

    /// Press a button, as by click or by Space on the focused one
    pub fn activate(&mut self, button: ButtonId) -> MenuCommand {
        let embedded = self.kind == MenuKind::Embedded;
        match button {
            ButtonId::Play => self.open(Page::Mode),
            ButtonId::Settings => self.open(Page::Difficulty),
            ButtonId::Info => self.open(Page::Info),
            ButtonId::Quit => {
                self.reset();
                return MenuCommand::ToAttract;
            }
            ButtonId::More if embedded => return MenuCommand::ShowStats,
            ButtonId::More => {
                let url = match self.kind {
                    MenuKind::Bomberman => BOMBERMAN_INFO_URL,
                    _ => PONG_INFO_URL,
                };
                return MenuCommand::OpenUrl(url);
            }
            ButtonId::Close => self.open(Page::Main),
            ButtonId::Single if embedded => {
                self.mode = GameMode::Single;
                return self.start();
            }
            ButtonId::Single => {
                self.mode = GameMode::Single;
                self.open(Page::Difficulty);
            }
            ButtonId::Multi => {
                self.mode = GameMode::Multi;
                if !embedded {
                    self.difficulty = Difficulty::Medium;
                }
                return self.start();
            }
            ButtonId::Back => match (self.page, embedded) {
                (Page::Difficulty, false) => self.open(Page::Mode),
                _ => self.open(Page::Main),
            },
            ButtonId::Easy | ButtonId::Medium | ButtonId::Hard => {
                self.difficulty = match button {
                    ButtonId::Easy => Difficulty::Easy,
                    ButtonId::Hard => Difficulty::Hard,
                    _ => Difficulty::Medium,
                };
                if embedded {
                    self.open(Page::Main);
                } else {
                    return self.start();
                }
            }
        }
        MenuCommand::None
    }

    fn start(&mut self) -> MenuCommand {
        let command = MenuCommand::Start {
            mode: self.mode,
            difficulty: self.difficulty,
        };
        self.reset();
        command
    }

    fn open(&mut self, page: Page) {
        self.page = page;
        self.focus = 0;
    }

    /// Clickable area of the button at `index` on the current page
    pub fn button_rect(&self, index: usize) -> Rect {
        if self.page == Page::Info {
            let bubble = self.info_bubble();
            return match index {
                0 => Rect {
                    x: bubble.x + bubble.width / 2.0 - 50.0,
                    y: bubble.y + bubble.height - 40.0,
                    width: 100.0,
                    height: 30.0,
                },
                _ => Rect {
                    x: bubble.x + bubble.width - 30.0,
                    y: bubble.y + 10.0,
                    width: 20.0,
                    height: 20.0,
                },
            };
        }
        Rect {
            x: self.canvas_width / 2.0 - 100.0,
            y: 160.0 + 50.0 * index as f32,
            width: 200.0,
            height: 40.0,
        }
    }

    /// Panel holding the info text and its two buttons
    pub fn info_bubble(&self) -> Rect {
        Rect {
            x: self.canvas_width / 2.0 - 150.0,
            y: 150.0,
            width: 300.0,
            height: 200.0,
        }
    }

    /// Hit-test a click in canvas coordinates
    pub fn click(&mut self, x: f32, y: f32) -> MenuCommand {
        let hit = (0..self.buttons().len()).find(|i| self.button_rect(*i).contains(x, y));
        match hit {
            Some(index) => {
                let button = self.buttons()[index];
                self.activate(button)
            }
            None => MenuCommand::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(menu: &mut Menu, keys: &[&str]) -> MenuCommand {
        let mut last = MenuCommand::None;
        for key in keys {
            last = menu.key(key);
        }
        last
    }

    #[test]
    fn test_focus_wraps_around() {
        let mut menu = Menu::new(MenuKind::Pong, 800.0);
        menu.key("ArrowUp");
        assert_eq!(menu.focused(), Some(ButtonId::Quit));
        menu.key("ArrowDown");
        assert_eq!(menu.focus(), 0);
    }

    #[test]
    fn test_dom_single_player_flow() {
        let mut menu = Menu::new(MenuKind::Pong, 800.0);
        // Play -> Single -> Hard
        let command = press(&mut menu, &[" ", " ", "ArrowDown", "ArrowDown", " "]);
        assert_eq!(
            command,
            MenuCommand::Start {
                mode: GameMode::Single,
                difficulty: Difficulty::Hard
            }
        );
        assert_eq!(menu.page(), Page::Main, "Menu resets once a game starts");
    }

    #[test]
    fn test_dom_multi_uses_medium() {
        let mut menu = Menu::new(MenuKind::Pong, 800.0);
        menu.activate(ButtonId::Play);
        assert_eq!(
            menu.activate(ButtonId::Multi),
            MenuCommand::Start {
                mode: GameMode::Multi,
                difficulty: Difficulty::Medium
            }
        );
    }

    #[test]
    fn test_page_switch_resets_focus() {
        let mut menu = Menu::new(MenuKind::Pong, 800.0);
        menu.key("ArrowDown");
        menu.key(" ");
        assert_eq!(menu.page(), Page::Info);
        assert_eq!(menu.focus(), 0);
        assert_eq!(menu.key(" "), MenuCommand::OpenUrl(PONG_INFO_URL));
    }

    #[test]
    fn test_difficulty_back_returns_to_mode() {
        let mut menu = Menu::new(MenuKind::Bomberman, 600.0);
        menu.activate(ButtonId::Play);
        assert_eq!(menu.buttons(), &[ButtonId::Single, ButtonId::Back]);
        menu.activate(ButtonId::Single);
        menu.activate(ButtonId::Back);
        assert_eq!(menu.page(), Page::Mode);
    }

    #[test]
    fn test_enter_and_escape_only_on_canvas_menus() {
        let mut dom = Menu::new(MenuKind::Pong, 800.0);
        assert_eq!(dom.key("Enter"), MenuCommand::None);
        assert_eq!(dom.page(), Page::Main);

        let mut canvas = Menu::new(MenuKind::Embedded, 800.0);
        canvas.key("Enter");
        assert_eq!(canvas.page(), Page::Mode);
        assert_eq!(canvas.key("Escape"), MenuCommand::None);
        assert_eq!(canvas.page(), Page::Main);
        assert_eq!(canvas.key("Escape"), MenuCommand::ToAttract);
    }

    #[test]
    fn test_embedded_difficulty_returns_to_main() {
        let mut menu = Menu::new(MenuKind::Embedded, 800.0);
        menu.activate(ButtonId::Settings);
        menu.activate(ButtonId::Easy);
        assert_eq!(menu.page(), Page::Main);
        assert_eq!(menu.difficulty(), Difficulty::Easy);

        menu.activate(ButtonId::Play);
        assert_eq!(
            menu.activate(ButtonId::Multi),
            MenuCommand::Start {
                mode: GameMode::Multi,
                difficulty: Difficulty::Easy
            }
        );
    }

    #[test]
    fn test_click_hit_testing() {
        let mut menu = Menu::new(MenuKind::Embedded, 800.0);
        // Second button is "Difficulty" at y 210..250
        assert_eq!(menu.click(400.0, 230.0), MenuCommand::None);
        assert_eq!(menu.page(), Page::Difficulty);
        // Gap between buttons
        menu.click(400.0, 255.0);
        assert_eq!(menu.page(), Page::Difficulty);
        // Fourth button is Back
        menu.click(310.0, 320.0);
        assert_eq!(menu.page(), Page::Main);
    }

    #[test]
    fn test_canvas_info_bubble_buttons() {
        let mut menu = Menu::new(MenuKind::Embedded, 800.0);
        menu.activate(ButtonId::Info);
        assert_eq!(menu.click(400.0, 325.0), MenuCommand::ShowStats);
        menu.click(525.0, 170.0);
        assert_eq!(menu.page(), Page::Main);
    }

    #[test]
    fn test_quit_goes_to_attract() {
        let mut menu = Menu::new(MenuKind::Bomberman, 600.0);
        menu.key("ArrowDown");
        assert_eq!(press(&mut menu, &["ArrowDown", " "]), MenuCommand::ToAttract);
    }
}
