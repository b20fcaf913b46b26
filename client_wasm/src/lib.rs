//! Browser client
//!
//! Pong and Bomberman drawn on a 2D canvas, plus the single-page shell with
//! chat and tournaments. Game and shell state is plain Rust and runs natively;
//! the DOM glue only builds for wasm32.

pub mod bomberman;
pub mod frame;
pub mod fsm;
pub mod input;
pub mod logger;
pub mod menu;
pub mod network;
pub mod pong;
pub mod reconnect;
pub mod router;
pub mod state;
pub mod storage;
pub mod views;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod games;
#[cfg(target_arch = "wasm32")]
mod renderer;

#[cfg(target_arch = "wasm32")]
pub use exports::*;

#[cfg(target_arch = "wasm32")]
mod exports {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    use crate::games::{self, Mounted};
    use crate::network::ApiClient;
    use crate::{logger, pong, router};

    // Game started by a standalone page, outside the shell
    thread_local! {
        static STANDALONE: RefCell<Option<Mounted>> = const { RefCell::new(None) };
    }

    fn init() {
        console_error_panic_hook::set_once();
        logger::init(log::LevelFilter::Info);
    }

    fn same_origin_api() -> Option<ApiClient> {
        let origin = web_sys::window()?.location().origin().ok()?;
        Some(ApiClient::new(&origin))
    }

    /// Start the single-page shell inside the element `root_id`
    #[wasm_bindgen]
    pub fn start_app(root_id: &str) -> Result<(), JsValue> {
        init();
        crate::app::start(root_id)
    }

    /// Run Pong on a canvas; `variant` is `classic`, `enhanced` or `embedded`
    #[wasm_bindgen]
    pub fn start_pong(canvas_id: &str, variant: &str) -> Result<(), JsValue> {
        init();
        let variant = pong::parse_variant(variant)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown Pong variant {}", variant)))?;
        let canvas = games::canvas_by_id(canvas_id)?;
        let hash = web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default();
        let mounted = games::mount_pong(canvas, variant, router::tournament_match(&hash), same_origin_api())?;
        STANDALONE.with(|slot| *slot.borrow_mut() = Some(mounted));
        Ok(())
    }

    #[wasm_bindgen]
    pub fn start_bomberman(canvas_id: &str) -> Result<(), JsValue> {
        init();
        let canvas = games::canvas_by_id(canvas_id)?;
        let mounted = games::mount_bomberman(canvas)?;
        STANDALONE.with(|slot| *slot.borrow_mut() = Some(mounted));
        Ok(())
    }

    /// Stop the standalone game and release its listeners
    #[wasm_bindgen]
    pub fn stop_game() {
        STANDALONE.with(|slot| slot.borrow_mut().take());
    }
}
