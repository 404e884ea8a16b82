use serde::{Deserialize, Serialize};

/// One side of a played game as reported by the upstream archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub result: String, // "win", "resigned", "agreed", ...
    #[serde(default)]
    pub username: String,
}

/// A finished game from the upstream monthly archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedGame {
    pub url: String,
    #[serde(default)]
    pub pgn: String,
    /// Unix seconds.
    #[serde(default)]
    pub end_time: i64,
    #[serde(default = "default_rated")]
    pub rated: bool,
    #[serde(default)]
    pub time_class: String,
    #[serde(default = "default_rules")]
    pub rules: String,
    #[serde(default)]
    pub eco: Option<String>,
    pub white: PlayerResult,
    pub black: PlayerResult,
}

fn default_rated() -> bool {
    true
}

fn default_rules() -> String {
    "chess".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamesResponse {
    #[serde(default)]
    pub games: Vec<PlayedGame>,
}
