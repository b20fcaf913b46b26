//! The single-page shell: routing, page rendering, sockets and DOM events

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CloseEvent, Element, Event, HtmlInputElement, MessageEvent, MouseEvent, WebSocket};

use game_core::Variant;
use proto::{Id, SendMessageRequest, WsMessage};

use crate::games::{self, Mounted};
use crate::network::ApiClient;
use crate::reconnect::CloseAction;
use crate::router::{self, Router, View};
use crate::state::{AppState, Listeners, SocketKind};
use crate::views;

const NOTICE_MS: i32 = 5000;

pub struct App {
    router: Router<View>,
    state: AppState,
    listeners: Listeners,
    api: ApiClient,
    view: View,
    mounted: Option<Mounted>,
    sockets: HashMap<SocketKind, WebSocket>,
    nav_dirty: Rc<Cell<bool>>,
    page_dirty: Rc<Cell<bool>>,
}

type Shared = Rc<RefCell<App>>;

impl App {
    fn new(api: ApiClient) -> Self {
        let nav_dirty = Rc::new(Cell::new(true));
        let page_dirty = Rc::new(Cell::new(true));
        let mut listeners = Listeners::new();
        for (path, nav, page) in [
            ("user", true, true),
            ("chat", true, true),
            ("tournaments", false, true),
            ("websockets", true, false),
        ] {
            let nav_flag = nav_dirty.clone();
            let page_flag = page_dirty.clone();
            listeners.subscribe(Some(path), move |_| {
                if nav {
                    nav_flag.set(true);
                }
                if page {
                    page_flag.set(true);
                }
            });
        }
        Self {
            router: router::app_router(),
            state: AppState::new(),
            listeners,
            api,
            view: View::Home,
            mounted: None,
            sockets: HashMap::new(),
            nav_dirty,
            page_dirty,
        }
    }
}

fn document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}

fn element(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

fn set_html(id: &str, html: &str) {
    match element(id) {
        Some(el) => el.set_inner_html(html),
        None => log::warn!("Missing #{}", id),
    }
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

fn set_timeout(delay_ms: i32, callback: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(callback);
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms) {
        log::error!("setTimeout failed: {:?}", e);
    }
}

/// Push state changes to listeners and redraw what they marked
fn flush(app: &Shared) {
    let notices = {
        let mut a = app.borrow_mut();
        let changes = a.state.take_changes();
        for change in changes {
            a.listeners.notify(change);
        }
        a.state.take_notifications()
    };

    let (nav, page) = {
        let a = app.borrow();
        (a.nav_dirty.replace(false), a.page_dirty.replace(false))
    };
    if nav {
        render_nav(app);
    }
    if page {
        render_page(app);
    }

    if !notices.is_empty() {
        let html: String = notices.iter().map(|n| views::notification(&n.text())).collect();
        if let Some(el) = element("notices") {
            let _ = el.insert_adjacent_html("beforeend", &html);
        }
        set_timeout(NOTICE_MS, || set_html("notices", ""));
    }
}

fn render_nav(app: &Shared) {
    let a = app.borrow();
    let mut html = String::new();
    if a.state.server_offline() {
        html.push_str(views::offline_banner());
    }
    html.push_str(&views::nav(&a.state));
    set_html("nav", &html);
}

/// Redraw the current page; game pages keep their canvas
fn render_page(app: &Shared) {
    let a = app.borrow();
    let html = match a.view {
        View::Home => views::home(),
        View::Profile => views::profile(a.state.user.profile.as_ref()),
        View::Chat => {
            let draft = element("chat-input")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value());
            set_html("page", &views::chat(&a.state.chat));
            if let Some(draft) = draft {
                if let Some(input) = element("chat-input").and_then(|el| el.dyn_into::<HtmlInputElement>().ok()) {
                    input.set_value(&draft);
                }
            }
            return;
        }
        View::Tournaments => views::tournaments(&a.state.tournaments.list),
        View::TournamentDetail => match &a.state.tournaments.current {
            Some(detail) => views::tournament_detail(detail, a.state.user.id),
            None => "<p>Loading tournament...</p>".to_string(),
        },
        View::Pong | View::PongEnhanced | View::PongEmbedded | View::Bomberman => return,
    };
    set_html("page", &html);
}

/// Show the page for the current location
fn route(app: &Shared) {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return;
    };
    let pathname = location.pathname().unwrap_or_else(|_| "/".to_string());
    let hash = location.hash().unwrap_or_default();
    let path = router::location_path(&pathname, &hash);

    let resolved = app.borrow().router.resolve(&path);
    let Some(resolved) = resolved else {
        log::error!("No route for {}", path);
        return;
    };
    log::info!("Route {} -> {:?}", path, resolved.target);

    {
        let mut a = app.borrow_mut();
        // Stop any running game before its canvas goes away
        drop(a.mounted.take());
        a.view = resolved.target;
    }

    match resolved.target {
        View::Pong | View::PongEnhanced | View::PongEmbedded | View::Bomberman => {
            if let Some(html) = views::game_page(resolved.target) {
                set_html("page", &html);
            }
            if let Err(e) = mount_game(app, resolved.target, &hash) {
                log::error!("Cannot start game: {:?}", e);
            }
        }
        View::Chat => {
            render_page(app);
            load_chat_users(app);
        }
        View::Tournaments => {
            render_page(app);
            load_tournaments(app);
        }
        View::TournamentDetail => {
            app.borrow_mut().state.set_current_tournament(None);
            flush(app);
            if let Some(id) = resolved.params.get("id") {
                load_tournament(app, Id(id.clone()));
            }
        }
        View::Home | View::Profile => render_page(app),
    }
}

fn mount_game(app: &Shared, view: View, hash: &str) -> Result<(), JsValue> {
    let canvas = games::canvas_by_id(views::CANVAS_ID)?;
    let api = app.borrow().api.clone();
    let mounted = match view {
        View::Pong => games::mount_pong(canvas, Variant::Classic, router::tournament_match(hash), Some(api))?,
        View::PongEnhanced => games::mount_pong(canvas, Variant::Enhanced, None, None)?,
        View::PongEmbedded => games::mount_pong(canvas, Variant::Embedded, None, Some(api))?,
        View::Bomberman => games::mount_bomberman(canvas)?,
        _ => return Ok(()),
    };
    app.borrow_mut().mounted = Some(mounted);
    let _ = canvas_focus();
    Ok(())
}

fn canvas_focus() -> Option<()> {
    element(views::CANVAS_ID)?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()?
        .focus()
        .ok()
}

fn navigate(app: &Shared, path: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(path)) {
            log::error!("pushState failed: {:?}", e);
        }
    }
    route(app);
}

// ============================================================================
// Backend loads
// ============================================================================

fn load_user(app: &Shared) {
    let app = app.clone();
    spawn_local(async move {
        let api = app.borrow().api.clone();
        match api.check_auth().await {
            Ok(status) if status.is_authenticated => {}
            Ok(_) => {
                log::info!("Not signed in");
                app.borrow_mut().state.sign_out();
                flush(&app);
                return;
            }
            Err(e) => {
                log::warn!("Auth check failed: {}", e);
                return;
            }
        }
        match api.profile().await {
            Ok(profile) => {
                app.borrow_mut().state.set_profile(profile);
                flush(&app);
                connect(&app, SocketKind::Chat);
                connect(&app, SocketKind::Tournament);
            }
            Err(e) => log::error!("Loading profile failed: {}", e),
        }
    });
}

fn load_chat_users(app: &Shared) {
    let app = app.clone();
    spawn_local(async move {
        let api = app.borrow().api.clone();
        match api.chat_users().await {
            Ok(users) => {
                app.borrow_mut().state.set_users(users);
                flush(&app);
            }
            Err(e) => log::error!("Loading chat users failed: {}", e),
        }
    });
}

fn load_history(app: &Shared, peer: u64) {
    let app = app.clone();
    spawn_local(async move {
        let api = app.borrow().api.clone();
        match api.chat_messages(peer).await {
            Ok(history) => {
                app.borrow_mut().state.load_history(peer, history);
                flush(&app);
            }
            Err(e) => log::error!("Loading messages with {} failed: {}", peer, e),
        }
    });
}

fn load_tournaments(app: &Shared) {
    let app = app.clone();
    spawn_local(async move {
        let api = app.borrow().api.clone();
        match api.tournaments().await {
            Ok(response) => {
                app.borrow_mut().state.set_tournaments(response.tournaments);
                flush(&app);
            }
            Err(e) => log::error!("Loading tournaments failed: {}", e),
        }
    });
}

fn load_tournament(app: &Shared, id: Id) {
    let app = app.clone();
    spawn_local(async move {
        let api = app.borrow().api.clone();
        match api.tournament(&id).await {
            Ok(response) => {
                if response.tournament.is_none() {
                    log::warn!("Tournament {}: {}", id, response.message.unwrap_or(response.status));
                }
                app.borrow_mut().state.set_current_tournament(response.tournament);
                flush(&app);
            }
            Err(e) => log::error!("Loading tournament {} failed: {}", id, e),
        }
    });
}

// ============================================================================
// Sockets
// ============================================================================

fn socket_url(path: &str) -> Option<String> {
    let location = web_sys::window()?.location();
    let scheme = if location.protocol().ok()? == "https:" { "wss" } else { "ws" };
    Some(format!("{}://{}{}", scheme, location.host().ok()?, path))
}

fn connect(app: &Shared, kind: SocketKind) {
    if !app.borrow_mut().state.socket_connecting(kind) {
        return;
    }
    let socket = socket_url(kind.endpoint())
        .ok_or_else(|| JsValue::from_str("no location"))
        .and_then(|url| WebSocket::new(&url));
    let socket = match socket {
        Ok(socket) => socket,
        Err(e) => {
            log::error!("Cannot open {}: {:?}", kind.key_path(), e);
            app.borrow_mut().state.socket_errored(kind);
            flush(app);
            return;
        }
    };

    let on_open = {
        let app = app.clone();
        Closure::wrap(Box::new(move |_: Event| {
            log::info!("{} connected", kind.key_path());
            app.borrow_mut().state.socket_opened(kind);
            flush(&app);
        }) as Box<dyn FnMut(Event)>)
    };
    socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    on_open.forget();

    let on_message = {
        let app = app.clone();
        Closure::wrap(Box::new(move |evt: MessageEvent| {
            let Some(text) = evt.data().as_string() else {
                log::warn!("Non-text frame on {}", kind.key_path());
                return;
            };
            match WsMessage::from_json(&text) {
                Ok(message) => {
                    app.borrow_mut().state.dispatch(message);
                    flush(&app);
                }
                Err(e) => log::warn!("Bad frame on {}: {}", kind.key_path(), e),
            }
        }) as Box<dyn FnMut(MessageEvent)>)
    };
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    on_message.forget();

    let on_error = {
        let app = app.clone();
        Closure::wrap(Box::new(move |_: Event| {
            log::error!("{} error", kind.key_path());
            app.borrow_mut().state.socket_errored(kind);
            flush(&app);
        }) as Box<dyn FnMut(Event)>)
    };
    socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    on_error.forget();

    let on_close = {
        let app = app.clone();
        Closure::wrap(Box::new(move |evt: CloseEvent| {
            let action = app.borrow_mut().state.socket_closed(kind, evt.code());
            app.borrow_mut().sockets.remove(&kind);
            flush(&app);
            if let CloseAction::Retry(delay) = action {
                let app = app.clone();
                set_timeout(i32::try_from(delay).unwrap_or(i32::MAX), move || connect(&app, kind));
            }
        }) as Box<dyn FnMut(CloseEvent)>)
    };
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
    on_close.forget();

    app.borrow_mut().sockets.insert(kind, socket);
}

// ============================================================================
// DOM events
// ============================================================================

fn data(el: &Element, name: &str) -> Option<String> {
    el.get_attribute(name)
}

fn data_u64(el: &Element, name: &str) -> Option<u64> {
    data(el, name)?.parse().ok()
}

fn conversation_notice(text: &str) {
    if let Some(list) = document().and_then(|d| d.query_selector(".messages").ok().flatten()) {
        let _ = list.insert_adjacent_html("beforeend", &views::system_message(text));
    }
}

fn on_click(app: &Shared, evt: &MouseEvent) {
    let Some(target) = evt.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return;
    };
    let closest = |selector: &str| target.closest(selector).ok().flatten();

    if let Some(link) = closest("[data-link]") {
        evt.prevent_default();
        if let Some(href) = data(&link, "href") {
            navigate(app, &href);
        }
    } else if let Some(item) = closest("[data-chat-user]") {
        let Some(id) = data_u64(&item, "data-chat-user") else {
            return;
        };
        let user = app.borrow().state.chat.users.iter().find(|u| u.id == id).cloned();
        app.borrow_mut().state.set_current_recipient(user);
        flush(app);
        load_history(app, id);
    } else if let Some(button) = closest("[data-chat-action]") {
        let (Some(action), Some(user)) = (data(&button, "data-chat-action"), data_u64(&button, "data-user")) else {
            return;
        };
        chat_action(app, action, user);
    } else if let Some(button) = closest("[data-tournament]") {
        let (Some(id), Some(action)) = (data(&button, "data-tournament"), data(&button, "data-action")) else {
            return;
        };
        tournament_action(app, Id(id), action);
    } else if let Some(button) = closest("[data-match-start]") {
        if let Some(match_id) = data_u64(&button, "data-match-start") {
            start_match(app, match_id);
        }
    }
}

fn chat_action(app: &Shared, action: String, user: u64) {
    let app = app.clone();
    spawn_local(async move {
        let api = app.borrow().api.clone();
        let result = match action.as_str() {
            "block" => api.block_user(user).await,
            "unblock" => api.unblock_user(user).await,
            "invite" => api.send_game_invite(user).await,
            other => {
                log::warn!("Unknown chat action {}", other);
                return;
            }
        };
        match result {
            Ok(()) if action == "invite" => conversation_notice("Invitation sent"),
            Ok(()) => load_chat_users(&app),
            Err(e) => conversation_notice(&format!("Could not {}: {}", action, e)),
        }
    });
}

fn tournament_action(app: &Shared, id: Id, action: String) {
    let app = app.clone();
    spawn_local(async move {
        let api = app.borrow().api.clone();
        match api.tournament_action(&id, &action).await {
            Ok(()) => {
                log::info!("Tournament {}: {}", id, action);
                load_tournaments(&app);
            }
            Err(e) => alert(&format!("Could not {} the tournament: {}", action, e)),
        }
    });
}

fn start_match(app: &Shared, match_id: u64) {
    let app = app.clone();
    spawn_local(async move {
        let api = app.borrow().api.clone();
        match api.start_match(match_id).await {
            Ok(reply) => match reply.redirect_url {
                Some(url) => {
                    if let Some(window) = web_sys::window() {
                        if let Err(e) = window.location().set_href(&url) {
                            log::error!("Redirect to {} failed: {:?}", url, e);
                        }
                    }
                }
                None => log::warn!("Match {} started without a game page", match_id),
            },
            Err(e) => alert(&format!("Could not start the match: {}", e)),
        }
    });
}

fn on_submit(app: &Shared, evt: &Event) {
    let is_chat = evt
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .map(|el| el.id() == "chat-form")
        .unwrap_or(false);
    if !is_chat {
        return;
    }
    evt.prevent_default();

    let Some(input) = element("chat-input").and_then(|el| el.dyn_into::<HtmlInputElement>().ok()) else {
        return;
    };
    let content = input.value().trim().to_string();
    let recipient = app.borrow().state.chat.current_recipient.as_ref().map(|u| u.id);
    let Some(recipient_id) = recipient else {
        return;
    };
    if content.is_empty() {
        return;
    }
    input.set_value("");

    let app = app.clone();
    spawn_local(async move {
        let api = app.borrow().api.clone();
        let request = SendMessageRequest {
            content,
            recipient_id,
        };
        if let Err(e) = api.send_message(&request).await {
            log::error!("Sending message failed: {}", e);
            conversation_notice(&format!("Message not sent: {}", e));
        }
    });
}

/// Build the shell inside `#root_id` and start routing
pub fn start(root_id: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let root = document
        .get_element_by_id(root_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{}", root_id)))?;
    root.set_inner_html("<div id=\"nav\"></div><div id=\"notices\"></div><main id=\"page\"></main>");

    let origin = window.location().origin()?;
    let app: Shared = Rc::new(RefCell::new(App::new(ApiClient::new(&origin))));

    let click = {
        let app = app.clone();
        Closure::wrap(Box::new(move |evt: MouseEvent| on_click(&app, &evt)) as Box<dyn FnMut(MouseEvent)>)
    };
    document.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
    click.forget();

    let submit = {
        let app = app.clone();
        Closure::wrap(Box::new(move |evt: Event| on_submit(&app, &evt)) as Box<dyn FnMut(Event)>)
    };
    document.add_event_listener_with_callback("submit", submit.as_ref().unchecked_ref())?;
    submit.forget();

    let history = {
        let app = app.clone();
        Closure::wrap(Box::new(move |_: Event| route(&app)) as Box<dyn FnMut(Event)>)
    };
    window.add_event_listener_with_callback("popstate", history.as_ref().unchecked_ref())?;
    window.add_event_listener_with_callback("hashchange", history.as_ref().unchecked_ref())?;
    history.forget();

    route(&app);
    flush(&app);
    load_user(&app);
    Ok(())
}
