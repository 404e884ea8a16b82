//! Motif identities and detected occurrences.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::replay::PositionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motif {
    Pin,
    CrossPin,
    Fork,
    Skewer,
    Attack,
    DiscoveredAttack,
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

impl Motif {
    pub const ALL: [Motif; 19] = [
        Motif::Pin,
        Motif::CrossPin,
        Motif::Fork,
        Motif::Skewer,
        Motif::Attack,
        Motif::DiscoveredAttack,
        Motif::DiscoveredCheck,
        Motif::Check,
        Motif::Checkmate,
        Motif::Promotion,
        Motif::PromotionWithCheck,
        Motif::PromotionWithCheckmate,
        Motif::BackRankMate,
        Motif::SmotheredMate,
        Motif::Sacrifice,
        Motif::Zugzwang,
        Motif::DoubleCheck,
        Motif::Interference,
        Motif::OverloadedPiece,
    ];

    /// Lowercase name used by ChessQL and the `has_<name>` presence columns.
    pub fn name(self) -> &'static str {
        match self {
            Motif::Pin => "pin",
            Motif::CrossPin => "cross_pin",
            Motif::Fork => "fork",
            Motif::Skewer => "skewer",
            Motif::Attack => "attack",
            Motif::DiscoveredAttack => "discovered_attack",
            Motif::DiscoveredCheck => "discovered_check",
            Motif::Check => "check",
            Motif::Checkmate => "checkmate",
            Motif::Promotion => "promotion",
            Motif::PromotionWithCheck => "promotion_with_check",
            Motif::PromotionWithCheckmate => "promotion_with_checkmate",
            Motif::BackRankMate => "back_rank_mate",
            Motif::SmotheredMate => "smothered_mate",
            Motif::Sacrifice => "sacrifice",
            Motif::Zugzwang => "zugzwang",
            Motif::DoubleCheck => "double_check",
            Motif::Interference => "interference",
            Motif::OverloadedPiece => "overloaded_piece",
        }
    }

    /// Uppercase name stored in the `motif` column of occurrence rows.
    pub fn storage_name(self) -> String {
        self.name().to_ascii_uppercase()
    }

    pub fn column(self) -> String {
        format!("has_{}", self.name())
    }
}

impl fmt::Display for Motif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored or user-supplied tag that names no known value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("Unknown motif: {0}")]
    Motif(String),
    #[error("Unknown side: {0}")]
    Side(String),
    #[error("Unknown pin type: {0}")]
    PinType(String),
}

impl FromStr for Motif {
    type Err = TagError;

    /// Accepts either the lowercase or the stored uppercase form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Motif::ALL
            .into_iter()
            .find(|m| m.name() == lower)
            .ok_or_else(|| TagError::Motif(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn from_white(is_white: bool) -> Self {
        if is_white { Side::White } else { Side::Black }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

impl FromStr for Side {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Side::White),
            "black" => Ok(Side::Black),
            other => Err(TagError::Side(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PinType {
    Absolute,
    Relative,
}

impl PinType {
    pub fn as_str(self) -> &'static str {
        match self {
            PinType::Absolute => "ABSOLUTE",
            PinType::Relative => "RELATIVE",
        }
    }
}

impl FromStr for PinType {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ABSOLUTE" => Ok(PinType::Absolute),
            "RELATIVE" => Ok(PinType::Relative),
            other => Err(TagError::PinType(other.to_string())),
        }
    }
}

/// One detected instance of a motif.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotifOccurrence {
    pub move_number: u32,
    pub ply: u32,
    /// Side credited with the motif.
    pub side: Side,
    pub description: String,
    pub moved_piece: Option<String>,
    pub attacker: Option<String>,
    pub target: Option<String>,
    pub pin_type: Option<PinType>,
    pub is_discovered: bool,
    pub is_mate: bool,
}

impl MotifOccurrence {
    /// Occurrence credited to the side that made the move producing `ctx`.
    pub fn at(ctx: &PositionContext, description: impl Into<String>) -> Self {
        Self::for_side(ctx, Side::from_white(ctx.mover_is_white()), description)
    }

    pub fn for_side(ctx: &PositionContext, side: Side, description: impl Into<String>) -> Self {
        Self {
            move_number: ctx.move_number,
            ply: ctx.ply,
            side,
            description: description.into(),
            moved_piece: None,
            attacker: None,
            target: None,
            pin_type: None,
            is_discovered: false,
            is_mate: false,
        }
    }
}
