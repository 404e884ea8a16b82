//! Records shared by the worker, the stores and the controllers.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chess_core::Motif;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{UnknownStatus, WorkerError};

/// Calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(ts: DateTime<Utc>) -> Self {
        Self { year: ts.year(), month: ts.month() }
    }

    pub fn current() -> Self {
        Self::of(Utc::now())
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Months from `self` through `end`, both inclusive. Empty when `end` is earlier.
    pub fn through(self, end: YearMonth) -> Vec<YearMonth> {
        let mut months = Vec::new();
        let mut month = self;
        while month <= end {
            months.push(month);
            month = month.next();
        }
        months
    }

    /// Inclusive number of months in `self..=end`.
    pub fn span(self, end: YearMonth) -> i64 {
        (end.year as i64 - self.year as i64) * 12 + end.month as i64 - self.month as i64 + 1
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WorkerError::InvalidMonth(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let digits = |part: &str, len: usize| {
            part.len() == len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(year, 4) || !digits(month, 2) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Running => "RUNNING",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Failed => "FAILED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Running)
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequestStatus::Pending),
            "RUNNING" => Ok(RequestStatus::Running),
            "COMPLETED" => Ok(RequestStatus::Completed),
            "FAILED" => Ok(RequestStatus::Failed),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Queue payload asking the worker to index a player's months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMessage {
    pub request_id: i64,
    pub player: String,
    pub platform: String,
    pub start_month: String,
    pub end_month: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingRequest {
    pub id: i64,
    pub player: String,
    pub platform: String,
    pub start_month: String,
    pub end_month: String,
    pub status: RequestStatus,
    pub games_indexed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedPeriod {
    pub player: String,
    pub platform: String,
    pub month: String,
    pub fetched_at: DateTime<Utc>,
    pub is_complete: bool,
    pub games_count: i32,
}

/// Metadata and motif presence flags of one indexed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFeature {
    pub game_url: String,
    pub request_id: Option<i64>,
    pub platform: String,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
    pub white_elo: Option<i32>,
    pub black_elo: Option<i32>,
    pub time_class: Option<String>,
    pub eco: Option<String>,
    pub result: Option<String>,
    pub played_at: Option<DateTime<Utc>>,
    pub num_moves: i32,
    /// Motifs with at least one occurrence; stored as `has_<motif>` columns.
    pub motifs: BTreeSet<Motif>,
    #[serde(skip)]
    pub pgn: String,
    pub indexed_at: DateTime<Utc>,
}

impl GameFeature {
    pub fn has(&self, motif: Motif) -> bool {
        self.motifs.contains(&motif)
    }
}
