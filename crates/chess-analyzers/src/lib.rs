//! Chess motif detectors.
//!
//! Every detector is a pure function over the positions of one replayed game
//! and reports zero or more motif occurrences. `FeatureExtractor` runs the
//! PGN parser, the replayer and the full detector set for a single game.

pub mod board_utils;
pub mod detector;
pub mod detectors;
pub mod extractor;

pub use detector::Detector;
pub use extractor::{FeatureExtractor, GameFeatures};
