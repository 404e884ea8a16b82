use std::sync::Arc;

use chess_analyzers::FeatureExtractor;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ControllerError;
use crate::store::FeatureStore;

pub const BATCH_SIZE: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReanalysisResponse {
    pub processed: u64,
    pub failed: u64,
}

/// Re-runs every detector over stored PGNs, for after detectors change.
pub struct ReanalysisController<F> {
    features: Arc<F>,
    extractor: Arc<FeatureExtractor>,
}

impl<F: FeatureStore> ReanalysisController<F> {
    pub fn new(features: Arc<F>, extractor: Arc<FeatureExtractor>) -> Self {
        Self { features, extractor }
    }

    /// Walks the store in URL order so rewrites never shift later pages.
    pub async fn reanalyze(&self) -> Result<ReanalysisResponse, ControllerError> {
        info!("Starting full re-analysis");
        let mut processed = 0;
        let mut failed = 0;
        let mut cursor: Option<String> = None;

        loop {
            let batch = self.features.fetch_for_reanalysis(cursor.as_deref(), BATCH_SIZE).await?;
            let batch_len = batch.len() as i64;

            for game in &batch {
                if game.pgn.trim().is_empty() {
                    warn!(game_url = %game.game_url, "Skipping game with no PGN");
                    failed += 1;
                    continue;
                }
                match self.extractor.extract(&game.pgn) {
                    Ok(extracted) => {
                        let num_moves = i32::try_from(extracted.num_moves).unwrap_or(i32::MAX);
                        self.features
                            .replace_occurrences(&game.game_url, num_moves, &extracted.occurrences)
                            .await?;
                        processed += 1;
                    }
                    Err(e) => {
                        warn!(game_url = %game.game_url, error = %e, "Failed to reanalyze game");
                        failed += 1;
                    }
                }
            }

            cursor = batch.last().map(|g| g.game_url.clone());
            debug!(processed, failed, "Re-analysis progress");
            if batch_len < BATCH_SIZE {
                break;
            }
        }

        info!(processed, failed, "Re-analysis done");
        Ok(ReanalysisResponse { processed, failed })
    }
}
