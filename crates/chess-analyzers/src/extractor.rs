//! Feature extraction: PGN -> replayed positions -> every detector.

use std::collections::BTreeMap;

use chess_core::pgn::PgnParser;
use chess_core::{replay, Motif, MotifOccurrence, PositionContext, ReplayError};
use serde::Serialize;
use tracing::debug;

use crate::detector::Detector;

/// Motif occurrences of one game, grouped by motif. Only motifs with at least
/// one occurrence have an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFeatures {
    pub num_moves: u32,
    pub occurrences: BTreeMap<Motif, Vec<MotifOccurrence>>,
}

impl GameFeatures {
    pub fn has(&self, motif: Motif) -> bool {
        self.occurrences.get(&motif).is_some_and(|occs| !occs.is_empty())
    }

    pub fn get(&self, motif: Motif) -> &[MotifOccurrence] {
        self.occurrences.get(&motif).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_occurrences(&self) -> usize {
        self.occurrences.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    parser: PgnParser,
    detectors: Vec<Detector>,
}

impl FeatureExtractor {
    /// Extractor running every detector.
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_detectors(Detector::ALL.to_vec())
    }

    pub fn with_detectors(detectors: Vec<Detector>) -> Result<Self, regex::Error> {
        Ok(Self { parser: PgnParser::new()?, detectors })
    }

    pub fn extract(&self, pgn: &str) -> Result<GameFeatures, ReplayError> {
        let moves = self.parser.parse_moves(pgn);
        let positions = replay(&moves)?;
        debug!(plies = moves.len(), "replayed game");
        Ok(self.extract_positions(&positions))
    }

    /// Run all detectors over an already replayed game.
    pub fn extract_positions(&self, positions: &[PositionContext]) -> GameFeatures {
        let mut occurrences: BTreeMap<Motif, Vec<MotifOccurrence>> = BTreeMap::new();

        for &detector in &self.detectors {
            let found = detector.detect(positions);
            if detector == Detector::Attack {
                let discovered: Vec<_> =
                    found.iter().filter(|o| o.is_discovered).cloned().collect();
                if !discovered.is_empty() {
                    occurrences
                        .entry(Motif::DiscoveredAttack)
                        .or_default()
                        .extend(discovered);
                }
            }
            if !found.is_empty() {
                occurrences.entry(detector.motif()).or_default().extend(found);
            }
        }

        GameFeatures {
            num_moves: positions.last().map(|p| p.move_number).unwrap_or(0),
            occurrences,
        }
    }
}
