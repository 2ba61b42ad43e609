use crate::model::{MatchReport, StorageError};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

/// One batch run as kept in the history table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub run_at: DateTime<Utc>,
    pub total_deals: usize,
    pub total_recipes: usize,
    pub skipped_deals: usize,
    pub skipped_recipes: usize,
    pub recipes_with_matches: usize,
    pub average_match_percentage: f64,
    pub duration_ms: i64,
}

impl RunRecord {
    pub fn from_report(report: &MatchReport, duration_ms: i64) -> Self {
        let with_matches = report.recipes.iter().filter(|r| r.matched_count > 0).count();
        let average = if report.recipes.is_empty() {
            0.0
        } else {
            report.recipes.iter().map(|r| r.match_percentage).sum::<f64>() / report.recipes.len() as f64
        };

        Self {
            run_at: report.last_updated,
            total_deals: report.total_deals,
            total_recipes: report.total_recipes,
            skipped_deals: report.skipped_deals,
            skipped_recipes: report.skipped_recipes,
            recipes_with_matches: with_matches,
            average_match_percentage: average,
            duration_ms,
        }
    }
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the history database and brings the schema up to date.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS match_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_at TEXT NOT NULL,
                total_deals INTEGER NOT NULL,
                total_recipes INTEGER NOT NULL,
                recipes_with_matches INTEGER NOT NULL,
                average_match_percentage REAL NOT NULL
            );
            ",
        )?;

        // Columns added after the first schema version
        Self::migrate_add_column_if_missing(&conn, "match_runs", "skipped_deals", "INTEGER NOT NULL DEFAULT 0")?;
        Self::migrate_add_column_if_missing(&conn, "match_runs", "skipped_recipes", "INTEGER NOT NULL DEFAULT 0")?;
        Self::migrate_add_column_if_missing(&conn, "match_runs", "duration_ms", "INTEGER NOT NULL DEFAULT 0")?;

        Ok(Self { conn })
    }

    fn migrate_add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        column_def: &str,
    ) -> Result<(), StorageError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let existing_columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if !existing_columns.iter().any(|c| c == column) {
            let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
            conn.execute(&alter_sql, [])?;
        }

        Ok(())
    }

    pub fn record_run(&self, run: &RunRecord) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO match_runs (
                run_at, total_deals, total_recipes, recipes_with_matches,
                average_match_percentage, skipped_deals, skipped_recipes, duration_ms
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &run.run_at.to_rfc3339(),
                &run.total_deals,
                &run.total_recipes,
                &run.recipes_with_matches,
                &run.average_match_percentage,
                &run.skipped_deals,
                &run.skipped_recipes,
                &run.duration_ms,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// The most recently recorded run, if any.
    pub fn last_run(&self) -> Result<Option<RunRecord>, StorageError> {
        Ok(self.recent_runs(1)?.into_iter().next())
    }

    /// Newest first.
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT run_at, total_deals, total_recipes, skipped_deals, skipped_recipes,
                    recipes_with_matches, average_match_percentage, duration_ms
             FROM match_runs ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], Self::map_run)?;
        let mut runs = Vec::new();
        for run in rows {
            runs.push(run?);
        }

        Ok(runs)
    }

    fn map_run(row: &Row) -> Result<RunRecord, rusqlite::Error> {
        let run_at_str: String = row.get(0)?;
        let run_at = run_at_str.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(RunRecord {
            run_at,
            total_deals: row.get(1)?,
            total_recipes: row.get(2)?,
            skipped_deals: row.get(3)?,
            skipped_recipes: row.get(4)?,
            recipes_with_matches: row.get(5)?,
            average_match_percentage: row.get(6)?,
            duration_ms: row.get(7)?,
        })
    }
}
