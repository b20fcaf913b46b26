//! Wire types shared with the arcade backend
//!
//! Everything is JSON. WebSocket frames are objects tagged by a `type` field;
//! REST bodies mirror the backend's field names.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Backend id that may arrive as a JSON string or number
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(pub String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for Id {
    fn from(id: u64) -> Self {
        Id(id.to_string())
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Id(id.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Id(s),
            Raw::Number(n) => Id(n.to_string()),
        })
    }
}

// ============================================================================
// WebSocket Messages
// ============================================================================

/// Frames pushed by the chat and tournament sockets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    ChatMessage {
        message: String,
        sender: String,
        sender_id: u64,
        recipient_id: u64,
        /// Echo of a message we sent ourselves
        #[serde(default)]
        is_sent: bool,
    },

    GameInvite {
        sender: String,
        sender_id: u64,
        recipient_id: u64,
        #[serde(default)]
        message: String,
    },

    TournamentUpdate {
        tournament_id: Id,
        status: String,
        #[serde(default)]
        current_round: Option<u32>,
        #[serde(default)]
        message: String,
    },

    TournamentMatchNotification {
        tournament_id: Id,
        tournament_name: String,
        match_id: Id,
        #[serde(default)]
        opponent_name: String,
        #[serde(default)]
        opponent_id: Option<u64>,
        #[serde(default)]
        round: Option<u32>,
        #[serde(default)]
        message: String,
    },

    /// Any frame type this client does not handle
    #[serde(other)]
    Unknown,
}

impl WsMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The `type` tag as sent on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            WsMessage::ChatMessage { .. } => "chat_message",
            WsMessage::GameInvite { .. } => "game_invite",
            WsMessage::TournamentUpdate { .. } => "tournament_update",
            WsMessage::TournamentMatchNotification { .. } => "tournament_match_notification",
            WsMessage::Unknown => "unknown",
        }
    }
}

// ============================================================================
// REST: accounts
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub is_authenticated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: Option<u64>,
    pub is_authenticated: bool,
    pub username: String,
    pub email: String,
    pub profile_photo: String,
    pub level: u32,
    pub games_played: u32,
    pub win_rate: f32,
    pub total_score: u32,
    pub is_42_user: bool,
    pub achievements: Vec<Achievement>,
}

// ============================================================================
// REST: chat
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersResponse {
    pub users: Vec<ChatUser>,
    pub blocked_users: Vec<ChatUser>,
    /// Only ids, so the client can hide users that blocked us
    pub blocked_by_users: Vec<u64>,
}

/// Stored message as returned by the history endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub content: String,
    pub sender: String,
    pub timestamp: String,
    pub recipient_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    pub recipient_id: u64,
}

/// Generic `{status, message}` reply of mutating endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub status: String,
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// REST: pong stats
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveStatsRequest {
    pub player_score: u8,
    pub computer_score: u8,
    pub difficulty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentGame {
    pub date: String,
    pub player_score: u8,
    pub computer_score: u8,
    pub difficulty: String,
}

impl Default for RecentGame {
    fn default() -> Self {
        Self {
            date: String::new(),
            player_score: 0,
            computer_score: 0,
            difficulty: "medium".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStatsResponse {
    pub total_games: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub perfect_games: u32,
    pub win_ratio: f32,
    pub recent_games: Vec<RecentGame>,
}

// ============================================================================
// REST: tournaments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub id: Id,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub participants_count: u32,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub is_creator: bool,
    #[serde(default)]
    pub is_participant: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentListResponse {
    pub tournaments: Vec<TournamentSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketPlayer {
    pub id: Option<u64>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchScore {
    pub player1: Option<u32>,
    pub player2: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: Id,
    pub player1: BracketPlayer,
    pub player2: BracketPlayer,
    #[serde(default)]
    pub winner_id: Option<u64>,
    pub status: String,
    #[serde(default)]
    pub score: MatchScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentDetail {
    pub id: Id,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub current_round: Option<u32>,
    #[serde(default)]
    pub winner: Option<String>,
    /// Keyed by round number
    #[serde(default)]
    pub rounds: BTreeMap<String, Vec<BracketMatch>>,
    #[serde(default)]
    pub participants: Vec<ChatUser>,
    #[serde(default)]
    pub is_creator: bool,
    #[serde(default)]
    pub is_participant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentDetailResponse {
    pub status: String,
    #[serde(default)]
    pub tournament: Option<TournamentDetail>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScoreRequest {
    pub score_player1: u8,
    pub score_player2: u8,
    pub winner_id: Option<u64>,
}

/// Reply to match start and score posts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchActionResponse {
    pub status: String,
    pub message: Option<String>,
    /// Where the backend wants the browser to go next
    pub redirect_url: Option<String>,
}

// ============================================================================
// Endpoints
// ============================================================================

pub mod endpoints {
    use super::Id;

    pub const CHECK_AUTH: &str = "/api/check-auth/";
    pub const PROFILE: &str = "/api/profile/";
    pub const SAVE_STATS: &str = "/api/pong/save-stats/";
    pub const PLAYER_STATS: &str = "/api/pong/stats/";
    pub const CHAT_USERS: &str = "/chat/api/users/";
    pub const SEND_MESSAGE: &str = "/chat/send_message/";
    pub const TOURNAMENTS: &str = "/tournaments/api/tournaments/";
    pub const WS_CHAT: &str = "/ws/chat/";
    pub const WS_TOURNAMENT: &str = "/ws/tournament/";

    pub fn chat_messages(user_id: u64) -> String {
        format!("/chat/messages/{}/", user_id)
    }

    pub fn send_game_invite(user_id: u64) -> String {
        format!("/chat/send_game_invite/{}/", user_id)
    }

    pub fn block_user(user_id: u64) -> String {
        format!("/chat/block_user/{}/", user_id)
    }

    pub fn unblock_user(user_id: u64) -> String {
        format!("/chat/unblock_user/{}/", user_id)
    }

    pub fn tournament(id: &Id) -> String {
        format!("{}{}/", TOURNAMENTS, id)
    }

    /// `action` is one of `join`, `leave` or `start`
    pub fn tournament_action(id: &Id, action: &str) -> String {
        format!("{}{}/{}/", TOURNAMENTS, id, action)
    }

    pub fn match_start(match_id: u64) -> String {
        format!("/tournaments/api/matches/{}/start/", match_id)
    }

    pub fn match_score(match_id: u64) -> String {
        format!("/tournaments/api/matches/{}/score/", match_id)
    }

    /// SPA hash route shown after a tournament match
    pub fn tournament_page(tournament_id: u64) -> String {
        format!("/#/tournaments/{}", tournament_id)
    }
}
