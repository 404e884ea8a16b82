use std::time::Duration;

use chess_core::{GamesResponse, PlayedGame};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::GameSource;
use crate::error::GameSourceError;
use crate::model::YearMonth;

const DEFAULT_BASE_URL: &str = "https://api.chess.com/pub";
pub const DEFAULT_USER_AGENT: &str = "MotifIndex/1.0";

/// Client for the chess.com monthly game archives.
#[derive(Clone)]
pub struct ChessComClient {
    client: Client,
    base_url: String,
    pause: Duration,
}

impl ChessComClient {
    pub fn new(user_agent: &str) -> Result<Self, GameSourceError> {
        Self::with_base_url(DEFAULT_BASE_URL, user_agent)
    }

    pub fn with_base_url(base_url: &str, user_agent: &str) -> Result<Self, GameSourceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            pause: Duration::from_millis(100),
        })
    }

    fn archive_url(&self, player: &str, month: YearMonth) -> String {
        format!(
            "{}/player/{}/games/{:04}/{:02}",
            self.base_url,
            player.to_lowercase(),
            month.year,
            month.month
        )
    }
}

impl GameSource for ChessComClient {
    async fn fetch_games(
        &self,
        player: &str,
        month: YearMonth,
    ) -> Result<Option<Vec<PlayedGame>>, GameSourceError> {
        let url = self.archive_url(player, month);

        // Rate limit
        tokio::time::sleep(self.pause).await;

        let resp = self.client.get(&url).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!(%url, "No archive for month");
            return Ok(None);
        }

        if !resp.status().is_success() {
            return Err(GameSourceError::Status { status: resp.status().as_u16(), url });
        }

        let page: GamesResponse = resp.json().await?;
        debug!(%url, games = page.games.len(), "Fetched archive");
        Ok(Some(page.games))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_url() {
        let client = ChessComClient::with_base_url("http://localhost:9999/pub/", "test").unwrap();
        let url = client.archive_url("Hikaru", YearMonth { year: 2024, month: 3 });
        assert_eq!(url, "http://localhost:9999/pub/player/hikaru/games/2024/03");
    }
}
