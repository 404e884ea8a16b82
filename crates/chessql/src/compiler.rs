//! Lowers a parsed query into Postgres SQL with `$n` bind parameters and a
//! typed predicate for in-memory evaluation.

use std::cmp;

use chess_core::{Motif, Side};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::ast::{CompareOp, Expr, OrderKey, Query, Value};
use crate::error::ChessQlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    WhiteUsername,
    BlackUsername,
    WhiteElo,
    BlackElo,
    TimeClass,
    Eco,
    Result,
    NumMoves,
    Platform,
    GameUrl,
    PlayedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Int,
    Timestamp,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::WhiteUsername,
        Column::BlackUsername,
        Column::WhiteElo,
        Column::BlackElo,
        Column::TimeClass,
        Column::Eco,
        Column::Result,
        Column::NumMoves,
        Column::Platform,
        Column::GameUrl,
        Column::PlayedAt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::WhiteUsername => "white_username",
            Column::BlackUsername => "black_username",
            Column::WhiteElo => "white_elo",
            Column::BlackElo => "black_elo",
            Column::TimeClass => "time_class",
            Column::Eco => "eco",
            Column::Result => "result",
            Column::NumMoves => "num_moves",
            Column::Platform => "platform",
            Column::GameUrl => "game_url",
            Column::PlayedAt => "played_at",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::WhiteElo | Column::BlackElo | Column::NumMoves => ColumnKind::Int,
            Column::PlayedAt => ColumnKind::Timestamp,
            _ => ColumnKind::Text,
        }
    }

    /// Resolves a query field: `white.elo`, `white_elo` and `WHITE.ELO` all
    /// name the same column.
    pub fn resolve(field: &str) -> Result<Column, ChessQlError> {
        let normalized = field.to_ascii_lowercase().replace('.', "_");
        Column::ALL
            .into_iter()
            .find(|c| c.name() == normalized)
            .ok_or_else(|| ChessQlError::UnknownField(field.to_string()))
    }
}

/// Bind parameter for the compiled SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
}

/// A literal checked against its column's type. Text literals are lowercased
/// since text comparisons ignore case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Literal {
    fn to_sql(&self) -> SqlValue {
        match self {
            Literal::Int(n) => SqlValue::Int(*n),
            Literal::Text(s) => SqlValue::Text(s.clone()),
            Literal::Timestamp(ts) => SqlValue::Text(ts.to_rfc3339()),
        }
    }
}

/// Read access to one stored game, for evaluating a [`Predicate`] without SQL.
pub trait GameRow {
    fn text(&self, column: Column) -> Option<&str>;
    fn int(&self, column: Column) -> Option<i64>;
    fn timestamp(&self, column: Column) -> Option<DateTime<Utc>>;
    fn has_motif(&self, motif: Motif) -> bool;
    /// `(ply, side)` of every stored occurrence of `motif`.
    fn occurrence_plies(&self, motif: Motif) -> Vec<(u32, Side)>;

    fn motif_count(&self, motif: Motif) -> usize {
        self.occurrence_plies(motif).len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare { column: Column, op: CompareOp, value: Literal },
    In { column: Column, values: Vec<Literal> },
    Motif(Motif),
    Sequence(Vec<Motif>),
}

impl Predicate {
    pub fn matches(&self, row: &impl GameRow) -> bool {
        self.eval(row) == Some(true)
    }

    /// SQL three-valued logic: `None` stands for NULL, so a comparison against
    /// a missing column is neither true nor false.
    fn eval(&self, row: &impl GameRow) -> Option<bool> {
        match self {
            Predicate::And(operands) => {
                let mut result = Some(true);
                for operand in operands {
                    match operand.eval(row) {
                        Some(false) => return Some(false),
                        None => result = None,
                        Some(true) => {}
                    }
                }
                result
            }
            Predicate::Or(operands) => {
                let mut result = Some(false);
                for operand in operands {
                    match operand.eval(row) {
                        Some(true) => return Some(true),
                        None => result = None,
                        Some(false) => {}
                    }
                }
                result
            }
            Predicate::Not(inner) => inner.eval(row).map(|b| !b),
            Predicate::Compare { column, op, value } => {
                compare_column(row, *column, value).map(|ord| op.holds(ord))
            }
            Predicate::In { column, values } => {
                let mut result = Some(false);
                for value in values {
                    match compare_column(row, *column, value) {
                        Some(cmp::Ordering::Equal) => return Some(true),
                        None => result = None,
                        Some(_) => {}
                    }
                }
                result
            }
            Predicate::Motif(motif) => Some(row.has_motif(*motif)),
            Predicate::Sequence(motifs) => Some(sequence_matches(row, motifs)),
        }
    }
}

fn compare_column(row: &impl GameRow, column: Column, value: &Literal) -> Option<cmp::Ordering> {
    match value {
        Literal::Int(n) => row.int(column).map(|v| v.cmp(n)),
        Literal::Text(s) => row.text(column).map(|v| v.to_lowercase().as_str().cmp(s.as_str())),
        Literal::Timestamp(ts) => row.timestamp(column).map(|v| v.cmp(ts)),
    }
}

fn sequence_matches(row: &impl GameRow, motifs: &[Motif]) -> bool {
    let Some((first, rest)) = motifs.split_first() else {
        return false;
    };
    let later: Vec<Vec<(u32, Side)>> = rest.iter().map(|m| row.occurrence_plies(*m)).collect();

    row.occurrence_plies(*first).into_iter().any(|(ply, side)| {
        later.iter().enumerate().all(|(i, plies)| {
            let want = ply + 2 * (i as u32 + 1);
            plies.iter().any(|&(p, s)| p == want && s == side)
        })
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    MotifCount { motif: Motif, ascending: bool },
    Column { column: Column, ascending: bool },
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Column { column: Column::PlayedAt, ascending: false }
    }
}

impl SortOrder {
    /// Ordering of two rows; missing values sort last in either direction and
    /// ties fall back to the game URL.
    pub fn compare(&self, a: &impl GameRow, b: &impl GameRow) -> cmp::Ordering {
        let primary = match *self {
            SortOrder::MotifCount { motif, ascending } => {
                let ord = a.motif_count(motif).cmp(&b.motif_count(motif));
                if ascending { ord } else { ord.reverse() }
            }
            SortOrder::Column { column, ascending } => match column.kind() {
                ColumnKind::Int => nulls_last(a.int(column), b.int(column), ascending),
                ColumnKind::Text => nulls_last(a.text(column), b.text(column), ascending),
                ColumnKind::Timestamp => {
                    nulls_last(a.timestamp(column), b.timestamp(column), ascending)
                }
            },
        };
        primary.then_with(|| a.text(Column::GameUrl).cmp(&b.text(Column::GameUrl)))
    }

    fn sql(&self) -> String {
        match *self {
            SortOrder::MotifCount { ascending, .. } => {
                format!("COALESCE(cnt.c, 0) {}, g.game_url", direction(ascending))
            }
            SortOrder::Column { column, ascending } => {
                format!("g.{} {} NULLS LAST, g.game_url", column.name(), direction(ascending))
            }
        }
    }
}

fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>, ascending: bool) -> cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            if ascending { a.cmp(&b) } else { b.cmp(&a) }
        }
        (Some(_), None) => cmp::Ordering::Less,
        (None, Some(_)) => cmp::Ordering::Greater,
        (None, None) => cmp::Ordering::Equal,
    }
}

fn direction(ascending: bool) -> &'static str {
    if ascending { "ASC" } else { "DESC" }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// `SELECT g.* FROM game_features g ...` without LIMIT/OFFSET.
    pub sql: String,
    pub params: Vec<SqlValue>,
    pub predicate: Predicate,
    pub order: SortOrder,
}

impl CompiledQuery {
    /// The statement with `LIMIT`/`OFFSET` placeholders following the
    /// WHERE parameters.
    pub fn paged_sql(&self) -> String {
        let n = self.params.len();
        format!("{} LIMIT ${} OFFSET ${}", self.sql, n + 1, n + 2)
    }
}

pub fn compile(query: &Query) -> Result<CompiledQuery, ChessQlError> {
    let mut compiler = Compiler { params: Vec::new() };
    let (where_sql, predicate) = compiler.expr(&query.expr)?;

    let order = match &query.order_by {
        None => SortOrder::default(),
        Some(order_by) => match &order_by.key {
            OrderKey::MotifCount(name) => SortOrder::MotifCount {
                motif: motif(name)?,
                ascending: order_by.ascending,
            },
            OrderKey::Field(field) => SortOrder::Column {
                column: Column::resolve(field)?,
                ascending: order_by.ascending,
            },
        },
    };

    let sql = match order {
        SortOrder::MotifCount { motif, .. } => format!(
            "SELECT g.* FROM game_features g \
             LEFT JOIN (SELECT game_url, COUNT(*) AS c FROM motif_occurrences \
             WHERE motif = '{}' GROUP BY game_url) cnt ON g.game_url = cnt.game_url \
             WHERE {} ORDER BY {}",
            motif.storage_name(),
            where_sql,
            order.sql()
        ),
        SortOrder::Column { .. } => format!(
            "SELECT g.* FROM game_features g WHERE {} ORDER BY {}",
            where_sql,
            order.sql()
        ),
    };

    Ok(CompiledQuery { sql, params: compiler.params, predicate, order })
}

fn motif(name: &str) -> Result<Motif, ChessQlError> {
    name.parse::<Motif>().map_err(|_| ChessQlError::UnknownMotif(name.to_string()))
}

fn literal(field: &str, column: Column, value: &Value) -> Result<Literal, ChessQlError> {
    match (column.kind(), value) {
        (ColumnKind::Int, Value::Int(n)) => Ok(Literal::Int(*n)),
        (ColumnKind::Text, Value::Text(s)) => Ok(Literal::Text(s.to_lowercase())),
        (ColumnKind::Timestamp, Value::Text(s)) => parse_timestamp(s)
            .map(Literal::Timestamp)
            .ok_or_else(|| ChessQlError::InvalidDate {
                field: field.to_string(),
                value: s.clone(),
            }),
        (ColumnKind::Int, _) => {
            Err(ChessQlError::TypeMismatch { field: field.to_string(), expected: "a number" })
        }
        (ColumnKind::Text, _) => {
            Err(ChessQlError::TypeMismatch { field: field.to_string(), expected: "a string" })
        }
        (ColumnKind::Timestamp, _) => {
            Err(ChessQlError::TypeMismatch { field: field.to_string(), expected: "a date string" })
        }
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (both UTC) or RFC 3339.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

struct Compiler {
    params: Vec<SqlValue>,
}

impl Compiler {
    fn bind(&mut self, column: Column, value: &Literal) -> String {
        self.params.push(value.to_sql());
        let placeholder = format!("${}", self.params.len());
        match column.kind() {
            ColumnKind::Timestamp => format!("{}::timestamptz", placeholder),
            _ => placeholder,
        }
    }

    fn column_sql(column: Column) -> String {
        match column.kind() {
            ColumnKind::Text => format!("LOWER(g.{})", column.name()),
            _ => format!("g.{}", column.name()),
        }
    }

    fn expr(&mut self, expr: &Expr) -> Result<(String, Predicate), ChessQlError> {
        match expr {
            Expr::Or(operands) => {
                let (sql, preds) = self.list(operands)?;
                Ok((format!("({})", sql.join(" OR ")), Predicate::Or(preds)))
            }
            Expr::And(operands) => {
                let (sql, preds) = self.list(operands)?;
                Ok((format!("({})", sql.join(" AND ")), Predicate::And(preds)))
            }
            Expr::Not(inner) => {
                let (sql, pred) = self.expr(inner)?;
                Ok((format!("(NOT {})", sql), Predicate::Not(Box::new(pred))))
            }
            Expr::Compare { field, op, value } => {
                let column = Column::resolve(field)?;
                let value = literal(field, column, value)?;
                let placeholder = self.bind(column, &value);
                let sql = format!("{} {} {}", Self::column_sql(column), op.as_sql(), placeholder);
                Ok((sql, Predicate::Compare { column, op: *op, value }))
            }
            Expr::In { field, values } => {
                let column = Column::resolve(field)?;
                let values = values
                    .iter()
                    .map(|v| literal(field, column, v))
                    .collect::<Result<Vec<_>, _>>()?;
                let placeholders: Vec<String> =
                    values.iter().map(|v| self.bind(column, v)).collect();
                let sql = format!("{} IN ({})", Self::column_sql(column), placeholders.join(", "));
                Ok((sql, Predicate::In { column, values }))
            }
            Expr::Motif(name) => {
                let motif = motif(name)?;
                Ok((format!("g.{} = TRUE", motif.column()), Predicate::Motif(motif)))
            }
            Expr::Sequence(names) => {
                if names.len() < 2 {
                    return Err(ChessQlError::ShortSequence);
                }
                let motifs = names.iter().map(|n| motif(n)).collect::<Result<Vec<_>, _>>()?;
                Ok((sequence_sql(&motifs), Predicate::Sequence(motifs)))
            }
        }
    }

    fn list(&mut self, operands: &[Expr]) -> Result<(Vec<String>, Vec<Predicate>), ChessQlError> {
        let mut sql = Vec::with_capacity(operands.len());
        let mut preds = Vec::with_capacity(operands.len());
        for operand in operands {
            let (s, p) = self.expr(operand)?;
            sql.push(s);
            preds.push(p);
        }
        Ok((sql, preds))
    }
}

/// Consecutive occurrences by the same side, one ply pair apart. Motif names
/// are inlined: they come from the closed `Motif` set, never from user text.
fn sequence_sql(motifs: &[Motif]) -> String {
    let mut sql = String::from("EXISTS (SELECT 1 FROM motif_occurrences sq1");
    for (i, motif) in motifs.iter().enumerate().skip(1) {
        let (n, prev) = (i + 1, i);
        sql.push_str(&format!(
            " JOIN motif_occurrences sq{n} ON sq{n}.game_url = sq1.game_url \
             AND sq{n}.side = sq1.side AND sq{n}.ply = sq{prev}.ply + 2 \
             AND sq{n}.motif = '{}'",
            motif.storage_name()
        ));
    }
    sql.push_str(&format!(
        " WHERE sq1.game_url = g.game_url AND sq1.motif = '{}')",
        motifs[0].storage_name()
    ));
    sql
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::parser::parse;

    fn compile_str(input: &str) -> Result<CompiledQuery, ChessQlError> {
        compile(&parse(input)?)
    }

    #[derive(Default)]
    struct Row {
        text: HashMap<Column, String>,
        int: HashMap<Column, i64>,
        played_at: Option<DateTime<Utc>>,
        occurrences: Vec<(Motif, u32, Side)>,
    }

    impl GameRow for Row {
        fn text(&self, column: Column) -> Option<&str> {
            self.text.get(&column).map(String::as_str)
        }

        fn int(&self, column: Column) -> Option<i64> {
            self.int.get(&column).copied()
        }

        fn timestamp(&self, _column: Column) -> Option<DateTime<Utc>> {
            self.played_at
        }

        fn has_motif(&self, motif: Motif) -> bool {
            self.occurrences.iter().any(|(m, _, _)| *m == motif)
        }

        fn occurrence_plies(&self, motif: Motif) -> Vec<(u32, Side)> {
            self.occurrences
                .iter()
                .filter(|(m, _, _)| *m == motif)
                .map(|&(_, ply, side)| (ply, side))
                .collect()
        }
    }

    fn row() -> Row {
        let mut row = Row::default();
        row.text.insert(Column::WhiteUsername, "Hikaru".into());
        row.text.insert(Column::TimeClass, "blitz".into());
        row.text.insert(Column::GameUrl, "https://chess.com/game/1".into());
        row.int.insert(Column::WhiteElo, 2850);
        row.int.insert(Column::NumMoves, 42);
        row.played_at = parse_timestamp("2024-07-15");
        row.occurrences = vec![
            (Motif::Check, 11, Side::White),
            (Motif::Fork, 13, Side::White),
            (Motif::Pin, 15, Side::Black),
        ];
        row
    }

    #[test]
    fn test_comparison_sql() {
        let compiled = compile_str("white.elo >= 2000").unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT g.* FROM game_features g WHERE g.white_elo >= $1 \
             ORDER BY g.played_at DESC NULLS LAST, g.game_url"
        );
        assert_eq!(compiled.params, vec![SqlValue::Int(2000)]);
    }

    #[test]
    fn test_string_comparison_ignores_case() {
        let compiled = compile_str("white.username = \"HIKARU\"").unwrap();
        assert!(compiled.sql.contains("LOWER(g.white_username) = $1"));
        assert_eq!(compiled.params, vec![SqlValue::Text("hikaru".into())]);
        assert!(compiled.predicate.matches(&row()));
    }

    #[test]
    fn test_motif_uses_presence_column() {
        let compiled = compile_str("motif(back_rank_mate)").unwrap();
        assert!(compiled.sql.contains("WHERE g.has_back_rank_mate = TRUE"));
        assert!(compiled.params.is_empty());
        assert_eq!(compiled.predicate, Predicate::Motif(Motif::BackRankMate));
    }

    #[test]
    fn test_boolean_structure_and_parameter_numbering() {
        let compiled =
            compile_str("(white.elo > 2000 OR black.elo > 2000) AND NOT eco = \"B20\"").unwrap();
        assert!(compiled
            .sql
            .contains("((g.white_elo > $1 OR g.black_elo > $2) AND (NOT LOWER(g.eco) = $3))"));
        assert_eq!(
            compiled.params,
            vec![SqlValue::Int(2000), SqlValue::Int(2000), SqlValue::Text("b20".into())]
        );
        assert!(compiled.paged_sql().ends_with("LIMIT $4 OFFSET $5"));
    }

    #[test]
    fn test_in_list() {
        let compiled = compile_str("time.class IN [\"Blitz\", \"rapid\"]").unwrap();
        assert!(compiled.sql.contains("LOWER(g.time_class) IN ($1, $2)"));
        assert!(compiled.predicate.matches(&row()));

        let numeric = compile_str("num_moves IN [10, 20]").unwrap();
        assert!(numeric.sql.contains("g.num_moves IN ($1, $2)"));
        assert!(!numeric.predicate.matches(&row()));
    }

    #[test]
    fn test_played_at_is_cast() {
        let compiled = compile_str("played.at >= \"2024-07-01\"").unwrap();
        assert!(compiled.sql.contains("g.played_at >= $1::timestamptz"));
        assert_eq!(compiled.params, vec![SqlValue::Text("2024-07-01T00:00:00+00:00".into())]);
        assert!(compiled.predicate.matches(&row()));
        assert!(!compile_str("played_at > \"2024-08-01\"").unwrap().predicate.matches(&row()));
    }

    #[test]
    fn test_type_errors() {
        assert!(matches!(
            compile_str("white.elo = \"high\""),
            Err(ChessQlError::TypeMismatch { expected: "a number", .. })
        ));
        assert!(matches!(
            compile_str("eco = 20"),
            Err(ChessQlError::TypeMismatch { expected: "a string", .. })
        ));
        assert!(matches!(
            compile_str("played_at > \"last tuesday\""),
            Err(ChessQlError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_unknown_field_and_motif() {
        assert_eq!(
            compile_str("white.rating > 5"),
            Err(ChessQlError::UnknownField("white.rating".into()))
        );
        assert_eq!(
            compile_str("motif(windmill)"),
            Err(ChessQlError::UnknownMotif("windmill".into()))
        );
        assert_eq!(
            compile_str("motif(pin) ORDER BY motif_count(windmill)"),
            Err(ChessQlError::UnknownMotif("windmill".into()))
        );
    }

    #[test]
    fn test_sequence_sql() {
        let compiled = compile_str("sequence(check THEN fork)").unwrap();
        assert!(compiled.sql.contains(
            "EXISTS (SELECT 1 FROM motif_occurrences sq1 \
             JOIN motif_occurrences sq2 ON sq2.game_url = sq1.game_url \
             AND sq2.side = sq1.side AND sq2.ply = sq1.ply + 2 AND sq2.motif = 'FORK' \
             WHERE sq1.game_url = g.game_url AND sq1.motif = 'CHECK')"
        ));
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn test_sequence_predicate() {
        let row = row();
        assert!(compile_str("sequence(check THEN fork)").unwrap().predicate.matches(&row));
        // Wrong order.
        assert!(!compile_str("sequence(fork THEN check)").unwrap().predicate.matches(&row));
        // Consecutive plies but different sides.
        assert!(!compile_str("sequence(fork THEN pin)").unwrap().predicate.matches(&row));
    }

    #[test]
    fn test_order_by_motif_count() {
        let compiled = compile_str("motif(fork) ORDER BY motif_count(fork) DESC").unwrap();
        assert!(compiled.sql.contains(
            "LEFT JOIN (SELECT game_url, COUNT(*) AS c FROM motif_occurrences \
             WHERE motif = 'FORK' GROUP BY game_url) cnt ON g.game_url = cnt.game_url"
        ));
        assert!(compiled.sql.ends_with("ORDER BY COALESCE(cnt.c, 0) DESC, g.game_url"));
        assert_eq!(compiled.order, SortOrder::MotifCount { motif: Motif::Fork, ascending: false });
    }

    #[test]
    fn test_order_by_field() {
        let compiled = compile_str("motif(fork) ORDER BY white.elo ASC").unwrap();
        assert!(compiled.sql.ends_with("ORDER BY g.white_elo ASC NULLS LAST, g.game_url"));
    }

    #[test]
    fn test_sort_order_puts_missing_values_last() {
        let mut low = row();
        low.int.insert(Column::WhiteElo, 1200);
        let mut missing = row();
        missing.int.remove(&Column::WhiteElo);
        let high = row();

        let desc = SortOrder::Column { column: Column::WhiteElo, ascending: false };
        assert_eq!(desc.compare(&high, &low), cmp::Ordering::Less);
        assert_eq!(desc.compare(&missing, &low), cmp::Ordering::Greater);

        let asc = SortOrder::Column { column: Column::WhiteElo, ascending: true };
        assert_eq!(asc.compare(&low, &high), cmp::Ordering::Less);
        assert_eq!(asc.compare(&missing, &high), cmp::Ordering::Greater);
    }

    #[test]
    fn test_null_comparisons_are_not_negated() {
        // black_elo is absent: neither the comparison nor its negation holds.
        let row = row();
        assert!(!compile_str("black.elo > 1000").unwrap().predicate.matches(&row));
        assert!(!compile_str("NOT black.elo > 1000").unwrap().predicate.matches(&row));
        assert!(compile_str("black.elo > 1000 OR motif(check)").unwrap().predicate.matches(&row));
    }

    #[test]
    fn test_neq() {
        let compiled = compile_str("time.class != \"bullet\"").unwrap();
        assert!(compiled.sql.contains("LOWER(g.time_class) != $1"));
        assert!(compiled.predicate.matches(&row()));
    }
}
