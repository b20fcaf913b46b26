//! Screen state machine
//!
//! Every game canvas moves through the same lifecycle: an attract (splash)
//! screen, the menu pages, the running match, an optional pause and the
//! game-over screen. Rendering and input dispatch read the current screen;
//! only the actions listed in the transition table can change it.

/// Screens a game canvas can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Attract,
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Actions that trigger screen transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    OpenMenu,
    Start,
    Pause,
    Resume,
    MatchOver,
    Replay,
    BackToMenu,
    ToAttract,
}

/// Result of a screen transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionResult {
    pub success: bool,
    pub from: Screen,
    pub to: Screen,
    pub action: ScreenAction,
}

/// Screen lifecycle of one game canvas
#[derive(Debug, Clone)]
pub struct ScreenFsm {
    screen: Screen,
}

impl ScreenFsm {
    /// Start on the attract screen
    pub fn new() -> Self {
        Self {
            screen: Screen::Attract,
        }
    }

    /// Start directly on the menu (DOM-menu variants have no splash)
    pub fn at_menu() -> Self {
        Self {
            screen: Screen::Menu,
        }
    }

    /// Start in a running match (tournament games skip the menus)
    pub fn playing() -> Self {
        Self {
            screen: Screen::Playing,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn can_transition(&self, action: ScreenAction) -> bool {
        self.next_screen(action).is_some()
    }

    /// Attempt a transition; an invalid action leaves the screen unchanged
    pub fn transition(&mut self, action: ScreenAction) -> TransitionResult {
        let from = self.screen;
        match self.next_screen(action) {
            Some(to) => {
                self.screen = to;
                TransitionResult {
                    success: true,
                    from,
                    to,
                    action,
                }
            }
            None => {
                log::debug!("Rejected {:?} on {:?}", action, from);
                TransitionResult {
                    success: false,
                    from,
                    to: from,
                    action,
                }
            }
        }
    }

    fn next_screen(&self, action: ScreenAction) -> Option<Screen> {
        match (self.screen, action) {
            // From Attract
            (Screen::Attract, ScreenAction::OpenMenu) => Some(Screen::Menu),

            // From Menu
            (Screen::Menu, ScreenAction::Start) => Some(Screen::Playing),
            (Screen::Menu, ScreenAction::ToAttract) => Some(Screen::Attract),

            // From Playing
            (Screen::Playing, ScreenAction::Pause) => Some(Screen::Paused),
            (Screen::Playing, ScreenAction::MatchOver) => Some(Screen::GameOver),
            (Screen::Playing, ScreenAction::BackToMenu) => Some(Screen::Menu),

            // From Paused
            (Screen::Paused, ScreenAction::Resume) => Some(Screen::Playing),
            (Screen::Paused, ScreenAction::BackToMenu) => Some(Screen::Menu),

            // From GameOver
            (Screen::GameOver, ScreenAction::Replay) => Some(Screen::Playing),
            (Screen::GameOver, ScreenAction::BackToMenu) => Some(Screen::Menu),

            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.screen == Screen::Playing
    }

    /// Whether the match is on screen, running or paused
    pub fn shows_match(&self) -> bool {
        matches!(self.screen, Screen::Playing | Screen::Paused)
    }
}

impl Default for ScreenFsm {
    fn default() -> Self {
        Self::new()
    }
}
