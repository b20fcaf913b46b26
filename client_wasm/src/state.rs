//! Application state shared by the shell views
//!
//! One `AppState` owns the user, both socket statuses, the chat and the
//! tournament data. Mutations record the key path they touched
//! (`user`, `websockets.chat`, `chat`, ...); the app drains those with
//! [`AppState::take_changes`] and hands them to [`Listeners::notify`] once
//! no borrow of the state is held.

use std::collections::HashMap;

use proto::{
    ChatUser, Id, Profile, StoredMessage, TournamentDetail, TournamentSummary, UsersResponse,
    WsMessage,
};

use crate::reconnect::{CloseAction, ReconnectPolicy};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
    pub is_authenticated: bool,
    pub id: Option<u64>,
    pub username: Option<String>,
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketKind {
    Chat,
    Tournament,
}

impl SocketKind {
    pub fn key_path(self) -> &'static str {
        match self {
            SocketKind::Chat => "websockets.chat",
            SocketKind::Tournament => "websockets.tournament",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            SocketKind::Chat => proto::endpoints::WS_CHAT,
            SocketKind::Tournament => proto::endpoints::WS_TOURNAMENT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocketStatus {
    pub connecting: bool,
    pub connected: bool,
    pub reconnect: ReconnectPolicy,
}

impl SocketStatus {
    /// A new connection may be opened
    pub fn can_connect(&self) -> bool {
        !self.connecting && !self.connected && !self.reconnect.is_offline()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub content: String,
    pub sender: String,
    pub sender_id: u64,
    pub recipient_id: u64,
    pub is_sent: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub current_recipient: Option<ChatUser>,
    pub users: Vec<ChatUser>,
    pub blocked: Vec<ChatUser>,
    pub blocked_by: Vec<u64>,
    /// Conversations keyed by the other user's id
    messages: HashMap<u64, Vec<ChatMessage>>,
    unread: HashMap<u64, u32>,
}

impl ChatState {
    pub fn messages_with(&self, user_id: u64) -> &[ChatMessage] {
        self.messages.get(&user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn unread_from(&self, user_id: u64) -> u32 {
        self.unread.get(&user_id).copied().unwrap_or(0)
    }

    pub fn total_unread(&self) -> u32 {
        self.unread.values().sum()
    }

    pub fn is_blocked(&self, user_id: u64) -> bool {
        self.blocked.iter().any(|u| u.id == user_id)
    }

    fn is_current(&self, user_id: u64) -> bool {
        self.current_recipient.as_ref().map(|u| u.id) == Some(user_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TournamentState {
    pub list: Vec<TournamentSummary>,
    pub current: Option<TournamentDetail>,
}

/// Socket events surfaced to the user
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    GameInvite {
        sender: String,
        sender_id: u64,
        message: String,
    },
    TournamentUpdate {
        tournament_id: Id,
        status: String,
        message: String,
    },
    MatchReady {
        tournament_id: Id,
        tournament_name: String,
        match_id: Id,
        opponent_name: String,
        message: String,
    },
}

impl Notification {
    pub fn text(&self) -> String {
        match self {
            Notification::GameInvite {
                sender, message, ..
            } if message.is_empty() => format!("{} invites you to a game of Pong", sender),
            Notification::GameInvite { message, .. } => message.clone(),
            Notification::TournamentUpdate {
                status, message, ..
            } if message.is_empty() => format!("Tournament is now {}", status),
            Notification::TournamentUpdate { message, .. } => message.clone(),
            Notification::MatchReady {
                tournament_name,
                opponent_name,
                message,
                ..
            } if message.is_empty() => {
                format!("{}: your match against {} is ready", tournament_name, opponent_name)
            }
            Notification::MatchReady { message, .. } => message.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub user: UserState,
    pub chat: ChatState,
    pub tournaments: TournamentState,
    sockets: HashMap<SocketKind, SocketStatus>,
    notifications: Vec<Notification>,
    changes: Vec<&'static str>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    fn changed(&mut self, key_path: &'static str) {
        if !self.changes.contains(&key_path) {
            self.changes.push(key_path);
        }
    }

    /// Key paths touched since the last call
    pub fn take_changes(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.changes)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ========================================================================
    // User
    // ========================================================================

    pub fn set_profile(&mut self, profile: Profile) {
        self.user = UserState {
            is_authenticated: true,
            id: profile.id,
            username: Some(profile.username.clone()),
            profile: Some(profile),
        };
        self.changed("user");
    }

    pub fn sign_out(&mut self) {
        self.user = UserState::default();
        self.changed("user");
    }

    // ========================================================================
    // Sockets
    // ========================================================================

    pub fn socket(&self, kind: SocketKind) -> SocketStatus {
        self.sockets.get(&kind).cloned().unwrap_or_default()
    }

    fn socket_mut(&mut self, kind: SocketKind) -> &mut SocketStatus {
        self.sockets.entry(kind).or_default()
    }

    /// Mark a connection attempt; false when one is already underway or the server is offline
    pub fn socket_connecting(&mut self, kind: SocketKind) -> bool {
        if !self.user.is_authenticated || !self.socket(kind).can_connect() {
            return false;
        }
        self.socket_mut(kind).connecting = true;
        self.changed(kind.key_path());
        true
    }

    pub fn socket_opened(&mut self, kind: SocketKind) {
        let status = self.socket_mut(kind);
        status.connecting = false;
        status.connected = true;
        status.reconnect.on_open();
        self.changed(kind.key_path());
    }

    pub fn socket_errored(&mut self, kind: SocketKind) {
        self.socket_mut(kind).connecting = false;
        self.changed(kind.key_path());
    }

    pub fn socket_closed(&mut self, kind: SocketKind, code: u16) -> CloseAction {
        let status = self.socket_mut(kind);
        status.connecting = false;
        status.connected = false;
        let action = status.reconnect.on_close(code);
        match action {
            CloseAction::Retry(delay) => {
                log::info!("{} closed ({}), retrying in {} ms", kind.key_path(), code, delay)
            }
            CloseAction::Offline => log::warn!("{} closed ({}), server offline", kind.key_path(), code),
            CloseAction::Stay => log::debug!("{} closed normally", kind.key_path()),
        }
        self.changed(kind.key_path());
        action
    }

    /// Any socket gave up reconnecting
    pub fn server_offline(&self) -> bool {
        self.sockets.values().any(|s| s.reconnect.is_offline())
    }

    // ========================================================================
    // Socket messages
    // ========================================================================

    /// Apply a socket frame; returns false for frames this client ignores
    pub fn dispatch(&mut self, message: WsMessage) -> bool {
        match message {
            WsMessage::ChatMessage {
                message,
                sender,
                sender_id,
                recipient_id,
                is_sent,
            } => {
                self.receive_chat(ChatMessage {
                    content: message,
                    sender,
                    sender_id,
                    recipient_id,
                    is_sent,
                });
            }
            WsMessage::GameInvite {
                sender,
                sender_id,
                message,
                ..
            } => {
                self.notify_user(Notification::GameInvite {
                    sender,
                    sender_id,
                    message,
                });
            }
            WsMessage::TournamentUpdate {
                tournament_id,
                status,
                message,
                ..
            } => {
                if let Some(entry) = self.tournaments.list.iter_mut().find(|t| t.id == tournament_id) {
                    entry.status = status.clone();
                }
                self.changed("tournaments");
                self.notify_user(Notification::TournamentUpdate {
                    tournament_id,
                    status,
                    message,
                });
            }
            WsMessage::TournamentMatchNotification {
                tournament_id,
                tournament_name,
                match_id,
                opponent_name,
                message,
                ..
            } => {
                self.notify_user(Notification::MatchReady {
                    tournament_id,
                    tournament_name,
                    match_id,
                    opponent_name,
                    message,
                });
            }
            WsMessage::Unknown => {
                log::warn!("Ignoring socket message of unknown type");
                return false;
            }
        }
        true
    }

    fn notify_user(&mut self, notification: Notification) {
        log::info!("Notification: {}", notification.text());
        self.notifications.push(notification);
        self.changed("notifications");
    }

    // ========================================================================
    // Chat
    // ========================================================================

    fn receive_chat(&mut self, message: ChatMessage) {
        let peer = if message.is_sent {
            message.recipient_id
        } else {
            message.sender_id
        };
        if !message.is_sent && !self.chat.is_current(message.sender_id) {
            *self.chat.unread.entry(message.sender_id).or_insert(0) += 1;
        }
        self.chat.messages.entry(peer).or_default().push(message);
        self.changed("chat");
    }

    /// Open a conversation and clear its unread counter
    pub fn set_current_recipient(&mut self, recipient: Option<ChatUser>) {
        if let Some(user) = &recipient {
            self.chat.unread.insert(user.id, 0);
        }
        self.chat.current_recipient = recipient;
        self.changed("chat");
    }

    pub fn set_users(&mut self, users: UsersResponse) {
        self.chat.users = users.users;
        self.chat.blocked = users.blocked_users;
        self.chat.blocked_by = users.blocked_by_users;
        self.changed("chat");
    }

    /// Replace a conversation with the history fetched from the backend
    pub fn load_history(&mut self, peer: u64, history: Vec<StoredMessage>) {
        let me = self.user.username.clone().unwrap_or_default();
        let my_id = self.user.id.unwrap_or(0);
        let messages = history
            .into_iter()
            .map(|stored| {
                let is_sent = stored.sender == me;
                ChatMessage {
                    content: stored.content,
                    sender: stored.sender,
                    sender_id: if is_sent { my_id } else { peer },
                    recipient_id: stored.recipient_id,
                    is_sent,
                }
            })
            .collect();
        self.chat.messages.insert(peer, messages);
        self.changed("chat");
    }

    // ========================================================================
    // Tournaments
    // ========================================================================

    pub fn set_tournaments(&mut self, list: Vec<TournamentSummary>) {
        self.tournaments.list = list;
        self.changed("tournaments");
    }

    pub fn set_current_tournament(&mut self, detail: Option<TournamentDetail>) {
        self.tournaments.current = detail;
        self.changed("tournaments.current");
    }
}

/// Identifies a subscription for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u32);

/// Callbacks subscribed to key paths
///
/// A listener with no key path hears every change; otherwise it hears
/// changes whose path starts with its own.
pub struct Listeners {
    next_id: u32,
    entries: Vec<(ListenerId, Option<String>, Box<dyn FnMut(&str)>)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, key_path: Option<&str>, callback: impl FnMut(&str) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries
            .push((id, key_path.map(str::to_string), Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.entries.retain(|(entry, _, _)| *entry != id);
    }

    pub fn notify(&mut self, changed: &str) {
        for (_, key_path, callback) in self.entries.iter_mut() {
            let wanted = match key_path {
                None => true,
                Some(path) => changed.starts_with(path.as_str()),
            };
            if wanted {
                callback(changed);
            }
        }
    }
}

impl Default for Listeners {
    fn default() -> Self {
        Self::new()
    }
}
