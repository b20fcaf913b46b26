//! REST client for the backend and the wire conversions around it

use std::fmt;

use game_core::session::{MatchSummary, TournamentContext};
use game_core::stats::{winner_label, GameRecord, GameStats, SideTally, WinLoss};
use game_core::{Difficulty, GameMode, Side};
use proto::{MatchScoreRequest, PlayerStatsResponse, RecentGame, SaveStatsRequest};

/// Delay before leaving a finished tournament match for the bracket page
pub const TOURNAMENT_REDIRECT_MS: i32 = 2000;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// fetch itself failed (offline, CORS, no window)
    Network(String),
    /// Non-2xx reply
    Status(u16),
    /// Body was not the JSON we expected
    Decode(String),
    /// 2xx reply whose `status` field was not `success`
    Rejected(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {}", msg),
            ApiError::Status(code) => write!(f, "server responded with {}", code),
            ApiError::Decode(msg) => write!(f, "unexpected response: {}", msg),
            ApiError::Rejected(msg) => write!(f, "request rejected: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Raw value of cookie `name` from a `document.cookie` string
pub fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
}

/// Body for `POST /api/pong/save-stats/`; the left paddle is the player
pub fn save_stats_request(summary: &MatchSummary) -> SaveStatsRequest {
    SaveStatsRequest {
        player_score: summary.score.left,
        computer_score: summary.score.right,
        difficulty: summary.difficulty.as_str().to_string(),
    }
}

/// Body for posting a tournament match result
pub fn match_score_request(summary: &MatchSummary, context: &TournamentContext) -> MatchScoreRequest {
    MatchScoreRequest {
        score_player1: summary.score.left,
        score_player2: summary.score.right,
        winner_id: Some(context.player_id(summary.winner)),
    }
}

fn parse_difficulty(name: &str) -> Option<Difficulty> {
    match name {
        "easy" => Some(Difficulty::Easy),
        "medium" => Some(Difficulty::Medium),
        "hard" => Some(Difficulty::Hard),
        _ => None,
    }
}

fn record_from_backend(game: &RecentGame) -> GameRecord {
    let winner = if game.player_score > game.computer_score {
        Side::Left
    } else {
        Side::Right
    };
    let loser_points = match winner {
        Side::Left => game.computer_score,
        Side::Right => game.player_score,
    };
    GameRecord {
        winner: winner_label(winner, GameMode::Single).to_string(),
        winner_side: winner,
        score: SideTally {
            left: u32::from(game.player_score),
            right: u32::from(game.computer_score),
        },
        duration_secs: 0.0,
        is_perfect: loser_points == 0,
        difficulty: parse_difficulty(&game.difficulty),
    }
}

/// Backend stats in the shape the stats panel draws
///
/// The backend reports totals for games and wins but only the recent games
/// carry scores, so `total_score` covers those games alone.
pub fn stats_from_backend(response: &PlayerStatsResponse) -> GameStats {
    let mut stats = GameStats {
        total_games: response.total_games,
        win_loss: WinLoss {
            wins: response.games_won,
            losses: response.games_lost,
        },
        perfect_games: SideTally {
            left: response.perfect_games,
            right: 0,
        },
        ..GameStats::default()
    };
    // History is pushed to the front, so feed it oldest first
    for game in response.recent_games.iter().rev() {
        let record = record_from_backend(game);
        stats.total_score.left += record.score.left;
        stats.total_score.right += record.score.right;
        stats.last_games.push(record);
    }
    stats
}

/// Hands out tickets so only the newest stats request may apply its reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSync {
    generation: u64,
}

impl StatsSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.generation
    }
}

#[cfg(target_arch = "wasm32")]
pub use client::ApiClient;

#[cfg(target_arch = "wasm32")]
mod client {
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{HtmlDocument, Request, RequestCredentials, RequestInit, RequestMode, Response};

    use proto::{
        endpoints, AuthStatus, Id, MatchActionResponse, MatchScoreRequest, PlayerStatsResponse,
        Profile, SaveStatsRequest, SendMessageRequest, StatusResponse, StoredMessage,
        TournamentDetailResponse, TournamentListResponse, UsersResponse,
    };

    use super::{cookie_value, ApiError};

    fn js_error(e: JsValue) -> ApiError {
        ApiError::Network(format!("{:?}", e))
    }

    fn csrf_token() -> Option<String> {
        let document = web_sys::window()?.document()?.dyn_into::<HtmlDocument>().ok()?;
        let cookies = document.cookie().ok()?;
        let raw = cookie_value(&cookies, "csrftoken")?;
        js_sys::decode_uri_component(raw).ok().map(String::from)
    }

    /// Same-origin JSON client; mutating calls carry the CSRF header
    #[derive(Debug, Clone, Default)]
    pub struct ApiClient {
        base_url: String,
    }

    impl ApiClient {
        pub fn new(base_url: &str) -> Self {
            Self {
                base_url: base_url.trim_end_matches('/').to_string(),
            }
        }

        async fn send(&self, method: &str, path: &str, body: Option<String>) -> Result<String, ApiError> {
            let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;

            let init = RequestInit::new();
            init.set_method(method);
            init.set_mode(RequestMode::SameOrigin);
            init.set_credentials(RequestCredentials::Include);
            if let Some(body) = &body {
                init.set_body(&JsValue::from_str(body));
            }

            let url = format!("{}{}", self.base_url, path);
            let request = Request::new_with_str_and_init(&url, &init).map_err(js_error)?;
            let headers = request.headers();
            headers.set("Content-Type", "application/json").map_err(js_error)?;
            if method != "GET" {
                match csrf_token() {
                    Some(token) => headers.set("X-CSRFToken", &token).map_err(js_error)?,
                    None => log::warn!("CSRF token not found for {} {}", method, path),
                }
            }

            let reply = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(js_error)?;
            let response: Response = reply.dyn_into().map_err(js_error)?;
            if !response.ok() {
                log::error!("{} {} -> {}", method, path, response.status());
                return Err(ApiError::Status(response.status()));
            }
            let text = JsFuture::from(response.text().map_err(js_error)?)
                .await
                .map_err(js_error)?;
            text.as_string()
                .ok_or_else(|| ApiError::Decode("body is not text".into()))
        }

        async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
            let text = self.send("GET", path, None).await?;
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
        }

        async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: Option<&B>) -> Result<T, ApiError> {
            let body = match body {
                Some(body) => Some(serde_json::to_string(body).map_err(|e| ApiError::Decode(e.to_string()))?),
                None => None,
            };
            let text = self.send("POST", path, body).await?;
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
        }

        /// POST that answers with `{status, message}`
        async fn post_action<B: Serialize>(&self, path: &str, body: Option<&B>) -> Result<(), ApiError> {
            let reply: StatusResponse = self.post(path, body).await?;
            if reply.is_success() {
                Ok(())
            } else {
                Err(ApiError::Rejected(reply.message.unwrap_or(reply.status)))
            }
        }

        pub async fn check_auth(&self) -> Result<AuthStatus, ApiError> {
            self.get(endpoints::CHECK_AUTH).await
        }

        pub async fn profile(&self) -> Result<Profile, ApiError> {
            self.get(endpoints::PROFILE).await
        }

        pub async fn save_stats(&self, request: &SaveStatsRequest) -> Result<(), ApiError> {
            self.post_action(endpoints::SAVE_STATS, Some(request)).await
        }

        pub async fn player_stats(&self) -> Result<PlayerStatsResponse, ApiError> {
            self.get(endpoints::PLAYER_STATS).await
        }

        pub async fn chat_users(&self) -> Result<UsersResponse, ApiError> {
            self.get(endpoints::CHAT_USERS).await
        }

        pub async fn chat_messages(&self, user_id: u64) -> Result<Vec<StoredMessage>, ApiError> {
            self.get(&endpoints::chat_messages(user_id)).await
        }

        pub async fn send_message(&self, request: &SendMessageRequest) -> Result<(), ApiError> {
            self.post_action(endpoints::SEND_MESSAGE, Some(request)).await
        }

        pub async fn send_game_invite(&self, user_id: u64) -> Result<(), ApiError> {
            self.post_action::<()>(&endpoints::send_game_invite(user_id), None).await
        }

        pub async fn block_user(&self, user_id: u64) -> Result<(), ApiError> {
            self.post_action::<()>(&endpoints::block_user(user_id), None).await
        }

        pub async fn unblock_user(&self, user_id: u64) -> Result<(), ApiError> {
            self.post_action::<()>(&endpoints::unblock_user(user_id), None).await
        }

        pub async fn tournaments(&self) -> Result<TournamentListResponse, ApiError> {
            self.get(endpoints::TOURNAMENTS).await
        }

        pub async fn tournament(&self, id: &Id) -> Result<TournamentDetailResponse, ApiError> {
            self.get(&endpoints::tournament(id)).await
        }

        /// `action` is `join`, `leave` or `start`
        pub async fn tournament_action(&self, id: &Id, action: &str) -> Result<(), ApiError> {
            self.post_action::<()>(&endpoints::tournament_action(id, action), None).await
        }

        pub async fn start_match(&self, match_id: u64) -> Result<MatchActionResponse, ApiError> {
            let reply: MatchActionResponse = self.post::<(), _>(&endpoints::match_start(match_id), None).await?;
            if reply.status == "success" {
                Ok(reply)
            } else {
                Err(ApiError::Rejected(reply.message.unwrap_or(reply.status)))
            }
        }

        pub async fn post_match_score(&self, match_id: u64, request: &MatchScoreRequest) -> Result<MatchActionResponse, ApiError> {
            let reply: MatchActionResponse = self.post(&endpoints::match_score(match_id), Some(request)).await?;
            if reply.status == "success" {
                Ok(reply)
            } else {
                Err(ApiError::Rejected(reply.message.unwrap_or(reply.status)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::Score;

    fn summary(left: u8, right: u8, winner: Side) -> MatchSummary {
        MatchSummary {
            winner,
            score: Score { left, right },
            duration_secs: 30.0,
            mode: GameMode::Single,
            difficulty: Difficulty::Easy,
            tournament: None,
        }
    }

    #[test]
    fn test_cookie_lookup() {
        let cookies = "theme=dark; csrftoken=abc123; csrftokenx=nope";
        assert_eq!(cookie_value(cookies, "csrftoken"), Some("abc123"));
        assert_eq!(cookie_value(cookies, "theme"), Some("dark"));
        assert_eq!(cookie_value(cookies, "session"), None);
        assert_eq!(cookie_value("", "csrftoken"), None);
    }

    #[test]
    fn test_save_stats_body() {
        let body = save_stats_request(&summary(5, 2, Side::Left));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"player_score": 5, "computer_score": 2, "difficulty": "easy"})
        );
    }

    #[test]
    fn test_match_score_names_winner() {
        let context = TournamentContext {
            match_id: 1,
            tournament_id: 2,
            player1_id: 10,
            player2_id: 20,
        };
        let request = match_score_request(&summary(1, 5, Side::Right), &context);
        assert_eq!(request.winner_id, Some(20));
        assert_eq!((request.score_player1, request.score_player2), (1, 5));
    }

    #[test]
    fn test_backend_stats_conversion() {
        let response: PlayerStatsResponse = serde_json::from_str(
            r#"{
                "total_games": 12, "games_won": 7, "games_lost": 5, "perfect_games": 2,
                "win_ratio": 58.3,
                "recent_games": [
                    {"date": "2024-05-02", "player_score": 5, "computer_score": 0, "difficulty": "hard"},
                    {"date": "2024-05-01", "player_score": 3, "computer_score": 5, "difficulty": "medium"}
                ]
            }"#,
        )
        .unwrap();

        let stats = stats_from_backend(&response);
        assert_eq!(stats.total_games, 12);
        assert_eq!(stats.win_loss.wins, 7);
        assert_eq!(stats.perfect_games.left, 2);
        assert_eq!(stats.total_score.left, 8);

        let latest = stats.last_games.latest().unwrap();
        assert_eq!(latest.winner, "Player");
        assert!(latest.is_perfect);
        assert_eq!(latest.difficulty, Some(Difficulty::Hard));
        assert_eq!(stats.last_games.iter().nth(1).map(|g| g.winner_side), Some(Side::Right));
    }

    #[test]
    fn test_stale_replies_are_discarded() {
        let mut sync = StatsSync::new();
        let first = sync.begin();
        let second = sync.begin();
        assert!(!sync.is_current(first));
        assert!(sync.is_current(second));
    }
}
