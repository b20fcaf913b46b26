//! HTML for the SPA pages
//!
//! Pages are plain strings mounted into `#app`. Buttons carry `data-*`
//! attributes that the document-level click handler reads; links with
//! `data-link` are routed without a page load.

use std::fmt::Write;

use proto::{BracketMatch, ChatUser, Profile, TournamentDetail, TournamentSummary};

use crate::router::View;
use crate::state::{AppState, ChatState};

/// Element id of the game canvas on the game pages
pub const CANVAS_ID: &str = "game-canvas";

/// Escape text for HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Top navigation with the unread badge on the chat link
pub fn nav(state: &AppState) -> String {
    let unread = state.chat.total_unread();
    let badge = if unread > 0 {
        format!(" <span class=\"badge\">{}</span>", unread)
    } else {
        String::new()
    };
    let user = match &state.user.username {
        Some(name) => format!("<a href=\"/profile\" data-link>{}</a>", escape(name)),
        None => "<a href=\"/accounts/login/\">Log in</a>".to_string(),
    };
    format!(
        "<nav><a href=\"/\" data-link>Home</a> <a href=\"/chat\" data-link>Chat{}</a> \
         <a href=\"/tournaments\" data-link>Tournaments</a> {}</nav>",
        badge, user
    )
}

pub fn offline_banner() -> &'static str {
    "<div class=\"offline-banner\">Server unreachable. Reload the page to try again.</div>"
}

pub fn notification(text: &str) -> String {
    format!("<div class=\"notification\">{}</div>", escape(text))
}

pub fn home() -> String {
    let games = [
        ("/pong", "Pong", "The classic, first to 3"),
        ("/pong-ameliore", "Pong+", "Pong with power-ups"),
        ("/game", "Pong (online stats)", "Pause, difficulty and saved stats"),
        ("/Bomberman", "Bomberman", "Clear the grid of enemies"),
    ];
    let mut html = String::from("<section class=\"home\"><h1>Arcade</h1><ul>");
    for (path, name, blurb) in games {
        let _ = write!(html, "<li><a href=\"{}\" data-link>{}</a> {}</li>", path, name, blurb);
    }
    html.push_str("</ul></section>");
    html
}

pub fn profile(profile: Option<&Profile>) -> String {
    let Some(p) = profile else {
        return "<section class=\"profile\"><p>Log in to see your profile.</p></section>".to_string();
    };
    let mut html = format!(
        "<section class=\"profile\"><h1>{}</h1><p>{}</p>\
         <p>Level {} | {} games | {:.0}% won | {} points</p>",
        escape(&p.username),
        escape(&p.email),
        p.level,
        p.games_played,
        p.win_rate,
        p.total_score
    );
    if !p.achievements.is_empty() {
        html.push_str("<ul class=\"achievements\">");
        for achievement in &p.achievements {
            let _ = write!(html, "<li>{} {}</li>", escape(&achievement.icon), escape(&achievement.name));
        }
        html.push_str("</ul>");
    }
    html.push_str("</section>");
    html
}

fn chat_user(chat: &ChatState, user: &ChatUser) -> String {
    let unread = chat.unread_from(user.id);
    let badge = if unread > 0 {
        format!(" <span class=\"badge\">{}</span>", unread)
    } else {
        String::new()
    };
    let class = if chat.current_recipient.as_ref().map(|u| u.id) == Some(user.id) {
        "chat-user active"
    } else {
        "chat-user"
    };
    format!(
        "<li class=\"{}\" data-chat-user=\"{}\">{}{}</li>",
        class,
        user.id,
        escape(&user.username),
        badge
    )
}

/// User list, the open conversation and the message form
pub fn chat(chat: &ChatState) -> String {
    let mut html = String::from("<section class=\"chat\"><ul class=\"chat-users\">");
    for user in &chat.users {
        html.push_str(&chat_user(chat, user));
    }
    html.push_str("</ul><div class=\"conversation\">");

    match &chat.current_recipient {
        None => html.push_str("<p>Pick someone to talk to.</p>"),
        Some(peer) => {
            let _ = write!(html, "<h2>{}</h2>", escape(&peer.username));
            let blocked = chat.is_blocked(peer.id);
            let (action, label) = if blocked {
                ("unblock", "Unblock")
            } else {
                ("block", "Block")
            };
            let _ = write!(
                html,
                "<button data-chat-action=\"{}\" data-user=\"{}\">{}</button>\
                 <button data-chat-action=\"invite\" data-user=\"{}\">Invite to Pong</button>",
                action, peer.id, label, peer.id
            );
            html.push_str("<ul class=\"messages\">");
            for message in chat.messages_with(peer.id) {
                let class = if message.is_sent { "sent" } else { "received" };
                let _ = write!(
                    html,
                    "<li class=\"{}\"><b>{}</b> {}</li>",
                    class,
                    escape(&message.sender),
                    escape(&message.content)
                );
            }
            html.push_str("</ul>");
            if chat.blocked_by.contains(&peer.id) {
                html.push_str("<p class=\"system\">You cannot message this user.</p>");
            } else if !blocked {
                html.push_str(
                    "<form id=\"chat-form\"><input id=\"chat-input\" autocomplete=\"off\">\
                     <button type=\"submit\">Send</button></form>",
                );
            }
        }
    }
    html.push_str("</div></section>");
    html
}

/// Inline message inside the conversation, e.g. a failed send
pub fn system_message(text: &str) -> String {
    format!("<li class=\"system\">{}</li>", escape(text))
}

fn tournament_actions(t: &TournamentSummary) -> String {
    let mut html = String::new();
    if t.status == "pending" {
        if t.is_creator {
            let _ = write!(html, "<button data-tournament=\"{}\" data-action=\"start\">Start</button>", t.id);
        }
        let action = if t.is_participant { "leave" } else { "join" };
        let label = if t.is_participant { "Leave" } else { "Join" };
        let _ = write!(
            html,
            "<button data-tournament=\"{}\" data-action=\"{}\">{}</button>",
            t.id, action, label
        );
    }
    html
}

pub fn tournaments(list: &[TournamentSummary]) -> String {
    let mut html = String::from("<section class=\"tournaments\"><h1>Tournaments</h1>");
    if list.is_empty() {
        html.push_str("<p>No tournaments yet.</p>");
    }
    html.push_str("<ul>");
    for t in list {
        let _ = write!(
            html,
            "<li><a href=\"/tournaments/{}\" data-link>{}</a> {} | {} players {}</li>",
            t.id,
            escape(&t.name),
            escape(&t.status),
            t.participants_count,
            tournament_actions(t)
        );
    }
    html.push_str("</ul></section>");
    html
}

fn bracket_match(m: &BracketMatch, me: Option<u64>) -> String {
    let score = match (m.score.player1, m.score.player2) {
        (Some(a), Some(b)) => format!(" {} - {}", a, b),
        _ => String::new(),
    };
    let mut html = format!(
        "<li class=\"match {}\">{} vs {}{}",
        escape(&m.status),
        escape(&m.player1.name),
        escape(&m.player2.name),
        score
    );
    let plays = me.is_some() && (m.player1.id == me || m.player2.id == me);
    if plays && m.status == "pending" && m.player1.id.is_some() && m.player2.id.is_some() {
        let _ = write!(html, " <button data-match-start=\"{}\">Play</button>", m.id);
    }
    html.push_str("</li>");
    html
}

/// Bracket by round; `me` gets a Play button on their pending matches
pub fn tournament_detail(detail: &TournamentDetail, me: Option<u64>) -> String {
    let mut html = format!(
        "<section class=\"tournament\"><h1>{}</h1><p>{}</p>",
        escape(&detail.name),
        escape(&detail.status)
    );
    if let Some(winner) = &detail.winner {
        let _ = write!(html, "<p class=\"winner\">Winner: {}</p>", escape(winner));
    }
    for (round, matches) in &detail.rounds {
        let _ = write!(html, "<h2>Round {}</h2><ul>", escape(round));
        for m in matches {
            html.push_str(&bracket_match(m, me));
        }
        html.push_str("</ul>");
    }
    html.push_str("</section>");
    html
}

/// Canvas page for a game view; other views have no canvas
pub fn game_page(view: View) -> Option<String> {
    let (width, height) = match view {
        View::Pong | View::PongEnhanced | View::PongEmbedded => (800, 400),
        View::Bomberman => (600, 600),
        _ => return None,
    };
    Some(format!(
        "<section class=\"game\"><canvas id=\"{}\" width=\"{}\" height=\"{}\" tabindex=\"0\"></canvas></section>",
        CANVAS_ID, width, height
    ))
}
