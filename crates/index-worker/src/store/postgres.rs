//! Postgres-backed stores.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chess_core::{Motif, MotifOccurrence, PinType, Side};
use chessql::{CompiledQuery, SqlValue};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};

use super::{FeatureStore, OccurrencesByMotif, PeriodStore, RequestStore, StoredPgn};
use crate::error::StoreError;
use crate::model::{GameFeature, IndexedPeriod, IndexingRequest, RequestStatus};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(10))
            .idle_timeout(std::time::Duration::from_secs(300))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const GAME_COLUMNS: &str = "game_url, request_id, platform, white_username, black_username, \
     white_elo, black_elo, time_class, eco, result, played_at, num_moves, pgn, indexed_at";

fn upsert_sql() -> String {
    let flags: Vec<String> = Motif::ALL.iter().map(|m| m.column()).collect();
    let base_count = 14;
    let placeholders: Vec<String> =
        (1..=base_count + flags.len()).map(|i| format!("${}", i)).collect();
    let updates: Vec<String> = GAME_COLUMNS
        .split(", ")
        .map(str::trim)
        .filter(|c| *c != "game_url")
        .map(String::from)
        .chain(flags.iter().cloned())
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .collect();

    format!(
        "INSERT INTO game_features ({}, {}) VALUES ({}) ON CONFLICT (game_url) DO UPDATE SET {}",
        GAME_COLUMNS,
        flags.join(", "),
        placeholders.join(", "),
        updates.join(", ")
    )
}

fn flags_update_sql() -> String {
    let sets: Vec<String> = Motif::ALL
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{} = ${}", m.column(), i + 3))
        .collect();
    format!(
        "UPDATE game_features SET num_moves = $2, {} WHERE game_url = $1",
        sets.join(", ")
    )
}

async fn insert_occurrences(
    tx: &mut Transaction<'_, Postgres>,
    game_url: &str,
    occurrences: &BTreeMap<Motif, Vec<MotifOccurrence>>,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM motif_occurrences WHERE game_url = $1")
        .bind(game_url)
        .execute(&mut **tx)
        .await?;

    for (motif, occs) in occurrences {
        for occ in occs {
            sqlx::query(
                r#"INSERT INTO motif_occurrences (
                    game_url, motif, move_number, ply, side, description,
                    moved_piece, attacker, target, pin_type, is_discovered, is_mate
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
            )
            .bind(game_url)
            .bind(motif.storage_name())
            .bind(occ.move_number as i32)
            .bind(occ.ply as i32)
            .bind(occ.side.as_str())
            .bind(&occ.description)
            .bind(&occ.moved_piece)
            .bind(&occ.attacker)
            .bind(&occ.target)
            .bind(occ.pin_type.map(PinType::as_str))
            .bind(occ.is_discovered)
            .bind(occ.is_mate)
            .execute(&mut **tx)
            .await?;
        }
    }
    Ok(())
}

fn game_from_row(row: &PgRow) -> Result<GameFeature, StoreError> {
    let mut motifs = BTreeSet::new();
    for motif in Motif::ALL {
        let present: bool = row.try_get(motif.column().as_str())?;
        if present {
            motifs.insert(motif);
        }
    }

    Ok(GameFeature {
        game_url: row.try_get("game_url")?,
        request_id: row.try_get("request_id")?,
        platform: row.try_get("platform")?,
        white_username: row.try_get("white_username")?,
        black_username: row.try_get("black_username")?,
        white_elo: row.try_get("white_elo")?,
        black_elo: row.try_get("black_elo")?,
        time_class: row.try_get("time_class")?,
        eco: row.try_get("eco")?,
        result: row.try_get("result")?,
        played_at: row.try_get("played_at")?,
        num_moves: row.try_get("num_moves")?,
        motifs,
        pgn: row.try_get("pgn")?,
        indexed_at: row.try_get("indexed_at")?,
    })
}

type OccurrenceTuple = (
    String,
    String,
    i32,
    i32,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    bool,
    bool,
);

fn occurrence_from_tuple(
    row: OccurrenceTuple,
) -> Result<(String, Motif, MotifOccurrence), StoreError> {
    let (
        game_url,
        motif,
        move_number,
        ply,
        side,
        description,
        moved_piece,
        attacker,
        target,
        pin_type,
        is_discovered,
        is_mate,
    ) = row;

    let motif: Motif = motif.parse()?;
    let side: Side = side.parse()?;
    let pin_type = pin_type.map(|p| p.parse::<PinType>()).transpose()?;

    let occurrence = MotifOccurrence {
        move_number: move_number as u32,
        ply: ply as u32,
        side,
        description,
        moved_piece,
        attacker,
        target,
        pin_type,
        is_discovered,
        is_mate,
    };
    Ok((game_url, motif, occurrence))
}

type RequestTuple = (
    i64,
    String,
    String,
    String,
    String,
    String,
    i32,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

const REQUEST_COLUMNS: &str = "id, player, platform, start_month, end_month, status, \
     games_indexed, error_message, created_at, updated_at";

fn request_from_tuple(row: RequestTuple) -> Result<IndexingRequest, StoreError> {
    let (
        id,
        player,
        platform,
        start_month,
        end_month,
        status,
        games_indexed,
        error_message,
        created_at,
        updated_at,
    ) = row;
    Ok(IndexingRequest {
        id,
        player,
        platform,
        start_month,
        end_month,
        status: status.parse()?,
        games_indexed,
        error_message,
        created_at,
        updated_at,
    })
}

impl FeatureStore for PgStore {
    async fn upsert(
        &self,
        feature: &GameFeature,
        occurrences: &BTreeMap<Motif, Vec<MotifOccurrence>>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = upsert_sql();
        let mut query = sqlx::query(&sql)
            .bind(&feature.game_url)
            .bind(feature.request_id)
            .bind(&feature.platform)
            .bind(&feature.white_username)
            .bind(&feature.black_username)
            .bind(feature.white_elo)
            .bind(feature.black_elo)
            .bind(&feature.time_class)
            .bind(&feature.eco)
            .bind(&feature.result)
            .bind(feature.played_at)
            .bind(feature.num_moves)
            .bind(&feature.pgn)
            .bind(feature.indexed_at);
        for motif in Motif::ALL {
            query = query.bind(feature.has(motif));
        }
        query.execute(&mut *tx).await?;

        insert_occurrences(&mut tx, &feature.game_url, occurrences).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn replace_occurrences(
        &self,
        game_url: &str,
        num_moves: i32,
        occurrences: &BTreeMap<Motif, Vec<MotifOccurrence>>,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = flags_update_sql();
        let mut query = sqlx::query(&sql).bind(game_url).bind(num_moves);
        for motif in Motif::ALL {
            let present = occurrences.get(&motif).is_some_and(|o| !o.is_empty());
            query = query.bind(present);
        }
        let updated = query.execute(&mut *tx).await?.rows_affected();
        if updated == 0 {
            return Ok(false);
        }

        insert_occurrences(&mut tx, game_url, occurrences).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn query(
        &self,
        query: &CompiledQuery,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GameFeature>, StoreError> {
        let sql = query.paged_sql();
        let mut statement = sqlx::query(&sql);
        for param in &query.params {
            statement = match param {
                SqlValue::Int(n) => statement.bind(*n),
                SqlValue::Text(s) => statement.bind(s.clone()),
            };
        }
        let rows = statement.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        rows.iter().map(game_from_row).collect()
    }

    async fn query_occurrences(
        &self,
        game_urls: &[String],
    ) -> Result<HashMap<String, OccurrencesByMotif>, StoreError> {
        if game_urls.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<OccurrenceTuple> = sqlx::query_as(
            r#"SELECT game_url, motif, move_number, ply, side, description,
                      moved_piece, attacker, target, pin_type, is_discovered, is_mate
               FROM motif_occurrences
               WHERE game_url = ANY($1)
               ORDER BY game_url, ply, id"#,
        )
        .bind(game_urls)
        .fetch_all(&self.pool)
        .await?;

        let mut result: HashMap<String, OccurrencesByMotif> = HashMap::new();
        for row in rows {
            let (game_url, motif, occurrence) = occurrence_from_tuple(row)?;
            result
                .entry(game_url)
                .or_default()
                .entry(motif.name().to_string())
                .or_default()
                .push(occurrence);
        }
        Ok(result)
    }

    async fn fetch_for_reanalysis(
        &self,
        after: Option<&str>,
        limit: i64,
    ) -> Result<Vec<StoredPgn>, StoreError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"SELECT game_url, pgn FROM game_features
               WHERE $1::text IS NULL OR game_url > $1
               ORDER BY game_url
               LIMIT $2"#,
        )
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(game_url, pgn)| StoredPgn { game_url, pgn })
            .collect())
    }

    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM game_features WHERE indexed_at < $1")
            .bind(threshold)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl RequestStore for PgStore {
    async fn create(
        &self,
        player: &str,
        platform: &str,
        start_month: &str,
        end_month: &str,
    ) -> Result<IndexingRequest, StoreError> {
        let sql = format!(
            "INSERT INTO indexing_requests (player, platform, start_month, end_month) \
             VALUES ($1, $2, $3, $4) RETURNING {REQUEST_COLUMNS}"
        );
        let row: RequestTuple = sqlx::query_as(&sql)
            .bind(player)
            .bind(platform)
            .bind(start_month)
            .bind(end_month)
            .fetch_one(&self.pool)
            .await?;
        request_from_tuple(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<IndexingRequest>, StoreError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM indexing_requests WHERE id = $1");
        let row: Option<RequestTuple> =
            sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(request_from_tuple).transpose()
    }

    async fn find_active(
        &self,
        player: &str,
        platform: &str,
        start_month: &str,
        end_month: &str,
    ) -> Result<Option<IndexingRequest>, StoreError> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM indexing_requests \
             WHERE player = $1 AND platform = $2 AND start_month = $3 AND end_month = $4 \
             AND status IN ('PENDING', 'RUNNING') \
             ORDER BY created_at DESC LIMIT 1"
        );
        let row: Option<RequestTuple> = sqlx::query_as(&sql)
            .bind(player)
            .bind(platform)
            .bind(start_month)
            .bind(end_month)
            .fetch_optional(&self.pool)
            .await?;
        row.map(request_from_tuple).transpose()
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<IndexingRequest>, StoreError> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM indexing_requests ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        let rows: Vec<RequestTuple> =
            sqlx::query_as(&sql).bind(limit).fetch_all(&self.pool).await?;
        rows.into_iter().map(request_from_tuple).collect()
    }

    async fn update_status(
        &self,
        id: i64,
        status: RequestStatus,
        error_message: Option<&str>,
        games_indexed: i32,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE indexing_requests
               SET status = $2, error_message = $3, games_indexed = $4, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(error_message)
        .bind(games_indexed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl PeriodStore for PgStore {
    async fn find_complete_period(
        &self,
        player: &str,
        platform: &str,
        month: &str,
    ) -> Result<Option<IndexedPeriod>, StoreError> {
        let row: Option<(String, String, String, DateTime<Utc>, bool, i32)> = sqlx::query_as(
            r#"SELECT player, platform, month, fetched_at, is_complete, games_count
               FROM indexed_periods
               WHERE player = $1 AND platform = $2 AND month = $3 AND is_complete = TRUE"#,
        )
        .bind(player)
        .bind(platform)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(player, platform, month, fetched_at, is_complete, games_count)| IndexedPeriod {
                player,
                platform,
                month,
                fetched_at,
                is_complete,
                games_count,
            },
        ))
    }

    async fn upsert_period(&self, period: &IndexedPeriod) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO indexed_periods (player, platform, month, fetched_at, is_complete, games_count)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (player, platform, month) DO UPDATE SET
                   fetched_at = EXCLUDED.fetched_at,
                   is_complete = EXCLUDED.is_complete,
                   games_count = EXCLUDED.games_count"#,
        )
        .bind(&period.player)
        .bind(&period.platform)
        .bind(&period.month)
        .bind(period.fetched_at)
        .bind(period.is_complete)
        .bind(period.games_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_fetched_before(&self, threshold: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM indexed_periods WHERE fetched_at < $1")
            .bind(threshold)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
