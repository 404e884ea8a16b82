//! The fixed set of motif detectors, dispatched statically.

use chess_core::{Motif, MotifOccurrence, PositionContext};

use crate::detectors::{
    attack, back_rank_mate, check, cross_pin, discovered_check, double_check, fork, interference,
    overloaded_piece, pin, promotion, sacrifice, skewer, smothered_mate, zugzwang,
};

/// A stateless motif detector. Discovered attacks are not listed: they are
/// the attack occurrences flagged as discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detector {
    Pin,
    CrossPin,
    Fork,
    Skewer,
    Attack,
    DiscoveredCheck,
    Check,
    Checkmate,
    Promotion,
    PromotionWithCheck,
    PromotionWithCheckmate,
    BackRankMate,
    SmotheredMate,
    Sacrifice,
    Zugzwang,
    DoubleCheck,
    Interference,
    OverloadedPiece,
}

impl Detector {
    pub const ALL: [Detector; 18] = [
        Detector::Pin,
        Detector::CrossPin,
        Detector::Fork,
        Detector::Skewer,
        Detector::Attack,
        Detector::DiscoveredCheck,
        Detector::Check,
        Detector::Checkmate,
        Detector::Promotion,
        Detector::PromotionWithCheck,
        Detector::PromotionWithCheckmate,
        Detector::BackRankMate,
        Detector::SmotheredMate,
        Detector::Sacrifice,
        Detector::Zugzwang,
        Detector::DoubleCheck,
        Detector::Interference,
        Detector::OverloadedPiece,
    ];

    pub fn motif(self) -> Motif {
        match self {
            Detector::Pin => Motif::Pin,
            Detector::CrossPin => Motif::CrossPin,
            Detector::Fork => Motif::Fork,
            Detector::Skewer => Motif::Skewer,
            Detector::Attack => Motif::Attack,
            Detector::DiscoveredCheck => Motif::DiscoveredCheck,
            Detector::Check => Motif::Check,
            Detector::Checkmate => Motif::Checkmate,
            Detector::Promotion => Motif::Promotion,
            Detector::PromotionWithCheck => Motif::PromotionWithCheck,
            Detector::PromotionWithCheckmate => Motif::PromotionWithCheckmate,
            Detector::BackRankMate => Motif::BackRankMate,
            Detector::SmotheredMate => Motif::SmotheredMate,
            Detector::Sacrifice => Motif::Sacrifice,
            Detector::Zugzwang => Motif::Zugzwang,
            Detector::DoubleCheck => Motif::DoubleCheck,
            Detector::Interference => Motif::Interference,
            Detector::OverloadedPiece => Motif::OverloadedPiece,
        }
    }

    pub fn detect(self, positions: &[PositionContext]) -> Vec<MotifOccurrence> {
        match self {
            Detector::Pin => pin::detect(positions),
            Detector::CrossPin => cross_pin::detect(positions),
            Detector::Fork => fork::detect(positions),
            Detector::Skewer => skewer::detect(positions),
            Detector::Attack => attack::detect(positions),
            Detector::DiscoveredCheck => discovered_check::detect(positions),
            Detector::Check => check::detect(positions),
            Detector::Checkmate => check::detect_checkmate(positions),
            Detector::Promotion => promotion::detect(positions),
            Detector::PromotionWithCheck => promotion::detect_with_check(positions),
            Detector::PromotionWithCheckmate => promotion::detect_with_checkmate(positions),
            Detector::BackRankMate => back_rank_mate::detect(positions),
            Detector::SmotheredMate => smothered_mate::detect(positions),
            Detector::Sacrifice => sacrifice::detect(positions),
            Detector::Zugzwang => zugzwang::detect(positions),
            Detector::DoubleCheck => double_check::detect(positions),
            Detector::Interference => interference::detect(positions),
            Detector::OverloadedPiece => overloaded_piece::detect(positions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::replay;

    #[test]
    fn test_every_detector_handles_empty_input() {
        for detector in Detector::ALL {
            assert!(detector.detect(&[]).is_empty(), "{:?}", detector);
        }
    }

    #[test]
    fn test_start_position_yields_nothing() {
        let positions = replay(&[]).unwrap();
        for detector in Detector::ALL {
            assert!(detector.detect(&positions).is_empty(), "{:?}", detector);
        }
    }

    #[test]
    fn test_motifs_are_distinct() {
        let mut motifs: Vec<Motif> = Detector::ALL.iter().map(|d| d.motif()).collect();
        motifs.sort();
        motifs.dedup();
        assert_eq!(motifs.len(), Detector::ALL.len());
        assert!(!motifs.contains(&Motif::DiscoveredAttack));
    }
}
