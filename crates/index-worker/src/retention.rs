//! Drops old games and forgets their periods so they are fetched again.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::error::StoreError;
use crate::store::{FeatureStore, PeriodStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionReport {
    pub games_deleted: u64,
    pub periods_deleted: u64,
}

pub fn threshold(now: DateTime<Utc>, retention_days: i64) -> DateTime<Utc> {
    now - Duration::days(retention_days)
}

pub async fn sweep<F, P>(
    features: &F,
    periods: &P,
    threshold: DateTime<Utc>,
) -> Result<RetentionReport, StoreError>
where
    F: FeatureStore,
    P: PeriodStore,
{
    let games_deleted = features.delete_older_than(threshold).await?;
    let periods_deleted = periods.delete_fetched_before(threshold).await?;
    info!(%threshold, games_deleted, periods_deleted, "Retention sweep done");
    Ok(RetentionReport { games_deleted, periods_deleted })
}
