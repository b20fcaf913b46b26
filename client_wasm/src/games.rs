//! Running a game controller on a canvas: input listeners, the frame loop
//! and the side effects of finished matches

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

use game_core::bomberman::BombermanHistory;
use game_core::session::{MatchSummary, TournamentContext};
use game_core::stats::GameStats;
use game_core::{Params, Variant};
use proto::endpoints;

use crate::bomberman::{self, BombermanController};
use crate::frame::FrameLoop;
use crate::network::{
    match_score_request, save_stats_request, stats_from_backend, ApiClient, StatsSync,
    TOURNAMENT_REDIRECT_MS,
};
use crate::pong::{self, PongController};
use crate::renderer::Canvas;
use crate::storage::{self, LocalStorage, BOMBERMAN_STATS_KEY, PONG_STATS_KEY};

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Controller the canvas loop can drive
pub trait CanvasGame {
    type Effect;

    fn key_down(&mut self, key: &str) -> Vec<Self::Effect>;
    fn key_up(&mut self, _key: &str) {}
    fn click(&mut self, x: f32, y: f32) -> Vec<Self::Effect>;
    fn frame(&mut self, dt: f32) -> Vec<Self::Effect>;
    fn captures_key(&self, key: &str) -> bool;
    fn draw(&self, canvas: &Canvas);
}

impl CanvasGame for PongController {
    type Effect = pong::Effect;

    fn key_down(&mut self, key: &str) -> Vec<pong::Effect> {
        PongController::key_down(self, key)
    }

    fn key_up(&mut self, key: &str) {
        PongController::key_up(self, key)
    }

    fn click(&mut self, x: f32, y: f32) -> Vec<pong::Effect> {
        PongController::click(self, x, y)
    }

    fn frame(&mut self, dt: f32) -> Vec<pong::Effect> {
        PongController::frame(self, dt)
    }

    fn captures_key(&self, key: &str) -> bool {
        PongController::captures_key(self, key)
    }

    fn draw(&self, canvas: &Canvas) {
        canvas.draw_pong(self)
    }
}

impl CanvasGame for BombermanController {
    type Effect = bomberman::Effect;

    fn key_down(&mut self, key: &str) -> Vec<bomberman::Effect> {
        BombermanController::key_down(self, key)
    }

    fn click(&mut self, x: f32, y: f32) -> Vec<bomberman::Effect> {
        BombermanController::click(self, x, y)
    }

    fn frame(&mut self, dt: f32) -> Vec<bomberman::Effect> {
        BombermanController::frame(self, dt)
    }

    fn captures_key(&self, key: &str) -> bool {
        BombermanController::captures_key(self, key)
    }

    fn draw(&self, canvas: &Canvas) {
        canvas.draw_bomberman(self)
    }
}

/// A game attached to the page; dropping it detaches listeners and stops the loop
pub struct Mounted {
    frames: FrameLoop<FrameCallback>,
    document: Document,
    canvas: HtmlCanvasElement,
    key_down: Closure<dyn FnMut(KeyboardEvent)>,
    key_up: Closure<dyn FnMut(KeyboardEvent)>,
    click: Closure<dyn FnMut(MouseEvent)>,
}

impl Drop for Mounted {
    fn drop(&mut self) {
        if let (Some(handle), Some(window)) = (self.frames.stop(), web_sys::window()) {
            let _ = window.cancel_animation_frame(handle);
        }
        let _ = self
            .document
            .remove_event_listener_with_callback("keydown", self.key_down.as_ref().unchecked_ref());
        let _ = self
            .document
            .remove_event_listener_with_callback("keyup", self.key_up.as_ref().unchecked_ref());
        let _ = self
            .canvas
            .remove_event_listener_with_callback("click", self.click.as_ref().unchecked_ref());
        log::debug!("Game unmounted");
    }
}

pub fn canvas_by_id(canvas_id: &str) -> Result<HtmlCanvasElement, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{}", canvas_id)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str(&format!("#{} is not a canvas", canvas_id)))
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

/// Wire `game` to the canvas and start its animation frames
fn mount<G>(canvas: HtmlCanvasElement, game: Rc<RefCell<G>>, on_effect: Rc<dyn Fn(G::Effect)>) -> Result<Mounted, JsValue>
where
    G: CanvasGame + 'static,
{
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let frames: FrameLoop<FrameCallback> = FrameLoop::new();

    let key_down = {
        let game = game.clone();
        let on_effect = on_effect.clone();
        Closure::wrap(Box::new(move |evt: KeyboardEvent| {
            let key = evt.key();
            if game.borrow().captures_key(&key) {
                evt.prevent_default();
            }
            let effects = game.borrow_mut().key_down(&key);
            for effect in effects {
                on_effect(effect);
            }
        }) as Box<dyn FnMut(KeyboardEvent)>)
    };
    document.add_event_listener_with_callback("keydown", key_down.as_ref().unchecked_ref())?;

    let key_up = {
        let game = game.clone();
        Closure::wrap(Box::new(move |evt: KeyboardEvent| {
            game.borrow_mut().key_up(&evt.key());
        }) as Box<dyn FnMut(KeyboardEvent)>)
    };
    document.add_event_listener_with_callback("keyup", key_up.as_ref().unchecked_ref())?;

    let click = {
        let game = game.clone();
        let on_effect = on_effect.clone();
        let target = canvas.clone();
        Closure::wrap(Box::new(move |evt: MouseEvent| {
            // Map CSS pixels onto the canvas backing store
            let rect = target.get_bounding_client_rect();
            if rect.width() <= 0.0 || rect.height() <= 0.0 {
                return;
            }
            let x = (f64::from(evt.client_x()) - rect.left()) * f64::from(target.width()) / rect.width();
            let y = (f64::from(evt.client_y()) - rect.top()) * f64::from(target.height()) / rect.height();
            let effects = game.borrow_mut().click(x as f32, y as f32);
            for effect in effects {
                on_effect(effect);
            }
        }) as Box<dyn FnMut(MouseEvent)>)
    };
    canvas.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;

    let surface = Canvas::new(&canvas)?;
    let last = Cell::new(None::<f64>);
    let next = frames.clone();
    frames.install(Closure::wrap(Box::new(move |ts: f64| {
        if !next.is_running() {
            return;
        }
        let dt = match last.replace(Some(ts)) {
            Some(prev) => (((ts - prev) / 1000.0) as f32).clamp(0.0, Params::MAX_DT),
            None => 0.0,
        };
        let effects = game.borrow_mut().frame(dt);
        for effect in effects {
            on_effect(effect);
        }
        game.borrow().draw(&surface);

        if let Some(w) = web_sys::window() {
            if let Some(Ok(handle)) = next.with_callback(|cb| w.request_animation_frame(cb.as_ref().unchecked_ref())) {
                next.set_pending(handle);
            }
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(handle) = frames.with_callback(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref())) {
        frames.set_pending(handle?);
    }

    Ok(Mounted {
        frames,
        document,
        canvas,
        key_down,
        key_up,
        click,
    })
}

fn open_url(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.open_with_url_and_target(url, "_blank") {
            log::warn!("Cannot open {}: {:?}", url, e);
        }
    }
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Navigate to `url` after `delay_ms`
pub fn redirect_later(url: String, delay_ms: i32) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(move || {
        if let Some(w) = web_sys::window() {
            if let Err(e) = w.location().set_href(&url) {
                log::error!("Redirect to {} failed: {:?}", url, e);
            }
        }
    });
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms) {
        log::error!("Cannot schedule redirect: {:?}", e);
    }
}

fn local_pong_stats() -> GameStats {
    match LocalStorage::open() {
        Ok(store) => storage::load_or_default(&store, PONG_STATS_KEY),
        Err(e) => {
            log::warn!("{}", e);
            GameStats::default()
        }
    }
}

fn store_pong_stats(stats: &GameStats) {
    let result = LocalStorage::open().and_then(|mut store| storage::save(&mut store, PONG_STATS_KEY, stats));
    if let Err(e) = result {
        log::error!("Cannot keep stats locally: {}", e);
    }
}

/// Load stats into the controller, backend first, then localStorage
fn refresh_stats(game: Rc<RefCell<PongController>>, api: Option<ApiClient>, sync: Rc<RefCell<StatsSync>>) {
    let ticket = sync.borrow_mut().begin();
    let Some(api) = api else {
        game.borrow_mut().set_stats(local_pong_stats());
        return;
    };
    spawn_local(async move {
        let stats = match api.player_stats().await {
            Ok(response) => stats_from_backend(&response),
            Err(e) => {
                log::warn!("Loading stats from the backend failed: {}", e);
                local_pong_stats()
            }
        };
        if sync.borrow().is_current(ticket) {
            game.borrow_mut().set_stats(stats);
        } else {
            log::debug!("Dropping stale stats response {}", ticket);
        }
    });
}

fn save_stats(game: &Rc<RefCell<PongController>>, api: Option<ApiClient>, sync: &Rc<RefCell<StatsSync>>, summary: MatchSummary) {
    // Any load still in flight predates this match
    sync.borrow_mut().begin();
    let stats = game.borrow().stats().clone();
    let Some(api) = api else {
        store_pong_stats(&stats);
        return;
    };
    spawn_local(async move {
        match api.save_stats(&save_stats_request(&summary)).await {
            Ok(()) => log::info!("Stats saved"),
            Err(e) => {
                log::warn!("Saving stats failed, keeping them locally: {}", e);
                store_pong_stats(&stats);
            }
        }
    });
}

fn post_tournament_score(api: ApiClient, summary: MatchSummary, context: TournamentContext) {
    spawn_local(async move {
        let request = match_score_request(&summary, &context);
        match api.post_match_score(context.match_id, &request).await {
            Ok(reply) => {
                let target = reply
                    .redirect_url
                    .unwrap_or_else(|| endpoints::tournament_page(context.tournament_id));
                log::info!("Match {} recorded, back to {}", context.match_id, target);
                redirect_later(target, TOURNAMENT_REDIRECT_MS);
            }
            Err(e) => {
                log::error!("Posting match {} failed: {}", context.match_id, e);
                alert(&format!("Could not save the match result: {}", e));
            }
        }
    });
}

/// Mount Pong; `api` enables backend stats and tournament scoring
pub fn mount_pong(
    canvas: HtmlCanvasElement,
    variant: Variant,
    tournament: Option<TournamentContext>,
    api: Option<ApiClient>,
) -> Result<Mounted, JsValue> {
    let width = canvas.width() as f32;
    let controller = match tournament {
        Some(context) => PongController::tournament(variant, width, random_seed(), context)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?,
        None => PongController::new(variant, width, random_seed()),
    };
    let game = Rc::new(RefCell::new(controller));
    let sync = Rc::new(RefCell::new(StatsSync::new()));

    if variant == Variant::Embedded {
        refresh_stats(game.clone(), api.clone(), sync.clone());
    }

    let on_effect: Rc<dyn Fn(pong::Effect)> = {
        let game = game.clone();
        Rc::new(move |effect: pong::Effect| match effect {
            pong::Effect::OpenUrl(url) => open_url(url),
            pong::Effect::RefreshStats => refresh_stats(game.clone(), api.clone(), sync.clone()),
            pong::Effect::MatchFinished(summary) => match summary.tournament.clone() {
                Some(context) => match api.clone() {
                    Some(api) => post_tournament_score(api, summary, context),
                    None => log::error!("Tournament match {} finished without a backend", context.match_id),
                },
                None if variant == Variant::Embedded => save_stats(&game, api.clone(), &sync, summary),
                None => {}
            },
        })
    };

    log::info!("Pong ({:?}) mounted", variant);
    mount(canvas, game, on_effect)
}

pub fn mount_bomberman(canvas: HtmlCanvasElement) -> Result<Mounted, JsValue> {
    let mut controller = BombermanController::new(canvas.width() as f32, random_seed());
    match LocalStorage::open() {
        Ok(store) => controller.set_history(storage::load_or_default(&store, BOMBERMAN_STATS_KEY)),
        Err(e) => log::warn!("{}", e),
    }
    let game = Rc::new(RefCell::new(controller));

    let on_effect: Rc<dyn Fn(bomberman::Effect)> = {
        let game = game.clone();
        Rc::new(move |effect: bomberman::Effect| match effect {
            bomberman::Effect::OpenUrl(url) => open_url(url),
            bomberman::Effect::RoundFinished(outcome) => {
                log::info!("Bomberman round finished: {:?}", outcome);
                let history: BombermanHistory = game.borrow().history().clone();
                let result = LocalStorage::open()
                    .and_then(|mut store| storage::save(&mut store, BOMBERMAN_STATS_KEY, &history));
                if let Err(e) = result {
                    log::error!("Cannot keep Bomberman history: {}", e);
                }
            }
        })
    };

    log::info!("Bomberman mounted");
    mount(canvas, game, on_effect)
}
