use sqlx::PgPool;

/// Apply the schema. Every statement is idempotent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

pub const SCHEMA_SQL: &str = r#"
-- Indexing requests (one per POST /index)
CREATE TABLE IF NOT EXISTS indexing_requests (
    id            BIGSERIAL PRIMARY KEY,
    player        TEXT NOT NULL,
    platform      TEXT NOT NULL,
    start_month   VARCHAR(7) NOT NULL,
    end_month     VARCHAR(7) NOT NULL,
    status        VARCHAR(20) NOT NULL DEFAULT 'PENDING',
    games_indexed INTEGER NOT NULL DEFAULT 0,
    error_message TEXT,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_indexing_requests_lookup
    ON indexing_requests (player, platform, start_month, end_month, status);

-- Indexed games with one presence flag per motif
CREATE TABLE IF NOT EXISTS game_features (
    id             BIGSERIAL PRIMARY KEY,
    game_url       TEXT NOT NULL UNIQUE,
    request_id     BIGINT REFERENCES indexing_requests(id) ON DELETE SET NULL,
    platform       TEXT NOT NULL,
    white_username TEXT,
    black_username TEXT,
    white_elo      INTEGER,
    black_elo      INTEGER,
    time_class     TEXT,
    eco            VARCHAR(10),
    result         VARCHAR(10),
    played_at      TIMESTAMPTZ,
    num_moves      INTEGER NOT NULL DEFAULT 0,
    has_pin                      BOOLEAN NOT NULL DEFAULT FALSE,
    has_cross_pin                BOOLEAN NOT NULL DEFAULT FALSE,
    has_fork                     BOOLEAN NOT NULL DEFAULT FALSE,
    has_skewer                   BOOLEAN NOT NULL DEFAULT FALSE,
    has_attack                   BOOLEAN NOT NULL DEFAULT FALSE,
    has_discovered_attack        BOOLEAN NOT NULL DEFAULT FALSE,
    has_discovered_check         BOOLEAN NOT NULL DEFAULT FALSE,
    has_check                    BOOLEAN NOT NULL DEFAULT FALSE,
    has_checkmate                BOOLEAN NOT NULL DEFAULT FALSE,
    has_promotion                BOOLEAN NOT NULL DEFAULT FALSE,
    has_promotion_with_check     BOOLEAN NOT NULL DEFAULT FALSE,
    has_promotion_with_checkmate BOOLEAN NOT NULL DEFAULT FALSE,
    has_back_rank_mate           BOOLEAN NOT NULL DEFAULT FALSE,
    has_smothered_mate           BOOLEAN NOT NULL DEFAULT FALSE,
    has_sacrifice                BOOLEAN NOT NULL DEFAULT FALSE,
    has_zugzwang                 BOOLEAN NOT NULL DEFAULT FALSE,
    has_double_check             BOOLEAN NOT NULL DEFAULT FALSE,
    has_interference             BOOLEAN NOT NULL DEFAULT FALSE,
    has_overloaded_piece         BOOLEAN NOT NULL DEFAULT FALSE,
    pgn            TEXT NOT NULL,
    indexed_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_game_features_played_at
    ON game_features (played_at DESC);
CREATE INDEX IF NOT EXISTS idx_game_features_indexed_at
    ON game_features (indexed_at);
CREATE INDEX IF NOT EXISTS idx_game_features_white_lower
    ON game_features (LOWER(white_username));
CREATE INDEX IF NOT EXISTS idx_game_features_black_lower
    ON game_features (LOWER(black_username));

-- One row per detected motif occurrence
CREATE TABLE IF NOT EXISTS motif_occurrences (
    id            BIGSERIAL PRIMARY KEY,
    game_url      TEXT NOT NULL REFERENCES game_features(game_url) ON DELETE CASCADE,
    motif         VARCHAR(40) NOT NULL,
    move_number   INTEGER NOT NULL,
    ply           INTEGER NOT NULL,
    side          VARCHAR(5) NOT NULL,
    description   TEXT NOT NULL,
    moved_piece   TEXT,
    attacker      TEXT,
    target        TEXT,
    pin_type      VARCHAR(10),
    is_discovered BOOLEAN NOT NULL DEFAULT FALSE,
    is_mate       BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE INDEX IF NOT EXISTS idx_motif_occ_game_url ON motif_occurrences (game_url);
CREATE INDEX IF NOT EXISTS idx_motif_occ_motif    ON motif_occurrences (motif);
CREATE INDEX IF NOT EXISTS idx_motif_occ_ply      ON motif_occurrences (game_url, ply);

-- Months already fetched per player
CREATE TABLE IF NOT EXISTS indexed_periods (
    id          BIGSERIAL PRIMARY KEY,
    player      TEXT NOT NULL,
    platform    TEXT NOT NULL,
    month       VARCHAR(7) NOT NULL,
    fetched_at  TIMESTAMPTZ NOT NULL,
    is_complete BOOLEAN NOT NULL,
    games_count INTEGER NOT NULL,
    UNIQUE(player, platform, month)
);
"#;
