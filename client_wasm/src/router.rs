//! Path routing for the single-page shell
//!
//! Routes are registered with exact paths or `:param` segments. A trailing
//! slash is ignored, and paths nothing matches resolve to `/`.

use std::collections::HashMap;

use game_core::session::TournamentContext;

/// Views the shell can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Profile,
    Chat,
    Tournaments,
    TournamentDetail,
    Pong,
    PongEnhanced,
    PongEmbedded,
    Bomberman,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub target: T,
    /// Normalized registered pattern that matched
    pub pattern: String,
    pub params: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Router<T> {
    routes: Vec<(String, T)>,
}

impl<T: Clone> Router<T> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn on(&mut self, path: &str, target: T) -> &mut Self {
        self.routes.push((normalize(path), target));
        self
    }

    /// Match `path`, preferring exact routes over parameterized ones
    pub fn matches(&self, path: &str) -> Option<Resolved<T>> {
        let path = normalize(path);
        if let Some((pattern, target)) = self.routes.iter().find(|(p, _)| *p == path) {
            return Some(Resolved {
                target: target.clone(),
                pattern: pattern.clone(),
                params: HashMap::new(),
            });
        }

        let segments: Vec<&str> = path.split('/').collect();
        self.routes.iter().find_map(|(pattern, target)| {
            let params = match_segments(pattern, &segments)?;
            Some(Resolved {
                target: target.clone(),
                pattern: pattern.clone(),
                params,
            })
        })
    }

    /// Match `path`, falling back to the `/` route
    pub fn resolve(&self, path: &str) -> Option<Resolved<T>> {
        match self.matches(path) {
            Some(resolved) => Some(resolved),
            None => {
                log::warn!("No route for {}, falling back to /", path);
                self.matches("/")
            }
        }
    }
}

impl<T: Clone> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes served by the shell
pub fn app_router() -> Router<View> {
    let mut router = Router::new();
    router
        .on("/", View::Home)
        .on("/profile", View::Profile)
        .on("/chat", View::Chat)
        .on("/tournaments", View::Tournaments)
        .on("/tournaments/:id", View::TournamentDetail)
        .on("/pong", View::Pong)
        .on("/pong-ameliore", View::PongEnhanced)
        .on("/game", View::PongEmbedded)
        .on("/Bomberman", View::Bomberman);
    router
}

/// Strip the trailing slash; the root stays `/`
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn match_segments(pattern: &str, segments: &[&str]) -> Option<HashMap<String, String>> {
    let parts: Vec<&str> = pattern.split('/').collect();
    if parts.len() != segments.len() {
        return None;
    }
    let mut params = HashMap::new();
    for (part, segment) in parts.iter().zip(segments) {
        if let Some(name) = part.strip_prefix(':') {
            if segment.is_empty() {
                return None;
            }
            params.insert(name.to_string(), segment.to_string());
        } else if part != segment {
            return None;
        }
    }
    Some(params)
}

/// Path to route for a location; a `#/...` hash takes precedence
pub fn location_path(pathname: &str, hash: &str) -> String {
    match hash.strip_prefix('#') {
        Some(rest) if rest.starts_with('/') => {
            let path = rest.split('?').next().unwrap_or(rest);
            normalize(path)
        }
        _ => normalize(pathname),
    }
}

/// Query parameters after the `?` of a location hash
pub fn hash_query(hash: &str) -> HashMap<String, String> {
    let Some((_, query)) = hash.split_once('?') else {
        return HashMap::new();
    };
    query
        .split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key.is_empty() {
                None
            } else {
                Some((key.to_string(), value.to_string()))
            }
        })
        .collect()
}

/// Tournament match parameters carried in the hash, if all are present
pub fn tournament_match(hash: &str) -> Option<TournamentContext> {
    let query = hash_query(hash);
    let id = |key: &str| query.get(key).and_then(|v| v.parse::<u64>().ok());
    Some(TournamentContext {
        match_id: id("matchId")?,
        tournament_id: id("tournamentId")?,
        player1_id: id("player1")?,
        player2_id: id("player2")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_trailing_slash() {
        let router = app_router();
        assert_eq!(router.matches("/chat").map(|r| r.target), Some(View::Chat));
        assert_eq!(router.matches("/chat/").map(|r| r.target), Some(View::Chat));
        assert_eq!(router.matches("/").map(|r| r.target), Some(View::Home));
        assert_eq!(router.matches("").map(|r| r.target), Some(View::Home));
    }

    #[test]
    fn test_param_segment() {
        let router = app_router();
        let resolved = router.matches("/tournaments/42/").unwrap();
        assert_eq!(resolved.target, View::TournamentDetail);
        assert_eq!(resolved.pattern, "/tournaments/:id");
        assert_eq!(resolved.params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_exact_beats_param() {
        let mut router = Router::new();
        router.on("/items/:id", 1).on("/items/new", 2);
        assert_eq!(router.matches("/items/new").map(|r| r.target), Some(2));
        assert_eq!(router.matches("/items/7").map(|r| r.target), Some(1));
    }

    #[test]
    fn test_unknown_falls_back_to_root() {
        let router = app_router();
        assert!(router.matches("/nowhere").is_none());
        assert_eq!(router.resolve("/nowhere").map(|r| r.target), Some(View::Home));
        assert!(router.matches("/tournaments/1/extra").is_none());
    }

    #[test]
    fn test_location_prefers_hash_route() {
        assert_eq!(location_path("/", "#/tournaments/3"), "/tournaments/3");
        assert_eq!(location_path("/", "#/pong?matchId=1"), "/pong");
        assert_eq!(location_path("/pong/", ""), "/pong");
        assert_eq!(location_path("/chat", "#section"), "/chat");
    }

    #[test]
    fn test_tournament_match_from_hash() {
        let context = tournament_match("#/pong?matchId=9&player1=4&player2=5&tournamentId=2").unwrap();
        assert_eq!(
            context,
            TournamentContext {
                match_id: 9,
                tournament_id: 2,
                player1_id: 4,
                player2_id: 5,
            }
        );
        assert!(tournament_match("#/pong?matchId=9&player1=4").is_none());
        assert!(tournament_match("#/pong").is_none());
        assert!(hash_query("#x?flag").contains_key("flag"));
    }
}
