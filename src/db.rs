use crate::entities::author::fio_contains;
use crate::entities::{Author, BudgetEntry, BudgetRecord, BudgetType};
use crate::error::{Error, Result};
use crate::repository::BudgetRepository;
use crate::stats::{self, StatsQuery, StatsSnapshot, YearStats};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, Value, ValueRef};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Upper bound on bound parameters per author lookup, well below SQLite's
/// variable limit.
const LOOKUP_CHUNK: usize = 500;

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Readers of a file database do not block the writer
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // author_id must point at a stored author
    conn.pragma_update(None, "foreign_keys", "ON")?;

    register_functions(conn)?;

    // ==========================================================================
    // authors: id, fio, creation_time (RFC 3339 text)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS authors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fio TEXT NOT NULL,
            creation_time TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // budget_entries: one row per income or expense, author optional
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS budget_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            amount INTEGER NOT NULL,
            budget_type TEXT NOT NULL,
            author_id INTEGER REFERENCES authors(id)
        )",
        [],
    )?;

    // ==========================================================================
    // Year scans and author joins
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_budget_year ON budget_entries(year, month)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_budget_author ON budget_entries(author_id)",
        [],
    )?;

    Ok(())
}

/// `fio_contains(fio, filter)` lets the author-name filter run inside the
/// page query with the same Unicode-aware matching as the in-memory store.
/// SQLite's own `lower()` and `LIKE` only fold ASCII.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "fio_contains",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let fio: String = ctx.get(0)?;
            let filter: String = ctx.get(1)?;
            Ok(fio_contains(&fio, &filter))
        },
    )?;
    Ok(())
}

// ============================================================================
// COLUMN MAPPING
// ============================================================================

impl ToSql for BudgetType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BudgetType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: Error| FromSqlError::Other(Box::new(e)))
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<BudgetEntry> {
    Ok(BudgetEntry {
        id: row.get(0)?,
        year: row.get(1)?,
        month: row.get(2)?,
        amount: row.get(3)?,
        budget_type: row.get(4)?,
        author_id: row.get(5)?,
    })
}

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    let creation_time_str: String = row.get(2)?;
    let creation_time = DateTime::parse_from_rfc3339(&creation_time_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(Author {
        id: row.get(0)?,
        fio: row.get(1)?,
        creation_time,
    })
}

// ============================================================================
// SQLITE REPOSITORY
// ============================================================================

/// Budget storage backed by one SQLite connection
///
/// Every operation holds the connection for the length of its transaction,
/// which is what keeps a stats query's count, sums and page consistent.
#[derive(Clone)]
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Opens (or creates) the database file and ensures the schema exists.
    /// `:memory:` gives a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteRepository {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }
}

impl BudgetRepository for SqliteRepository {
    fn add_author(&self, fio: &str, creation_time: DateTime<Utc>) -> Result<Author> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO authors (fio, creation_time) VALUES (?1, ?2)",
            params![fio, creation_time.to_rfc3339()],
        )?;

        Ok(Author {
            id: conn.last_insert_rowid(),
            fio: fio.to_string(),
            creation_time,
        })
    }

    fn add_entry(&self, record: &BudgetRecord) -> Result<BudgetEntry> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if let Some(author_id) = record.author {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?1)",
                [author_id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(Error::UnknownAuthor(author_id));
            }
        }

        tx.execute(
            "INSERT INTO budget_entries (year, month, amount, budget_type, author_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.year,
                record.month,
                record.amount,
                record.budget_type,
                record.author,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(BudgetEntry {
            id,
            year: record.year,
            month: record.month,
            amount: record.amount,
            budget_type: record.budget_type,
            author_id: record.author,
        })
    }

    fn year_stats(&self, query: &StatsQuery) -> Result<YearStats> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let stats = stats::year_stats(&SqliteSnapshot { conn: &tx }, query)?;
        tx.commit()?;
        Ok(stats)
    }

    fn entry_count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM budget_entries", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn reset(&self) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM budget_entries", [])?;
        tx.execute("DELETE FROM authors", [])?;
        tx.commit()?;
        Ok(())
    }
}

// ============================================================================
// READ SNAPSHOT
// ============================================================================

/// Stats primitives over an open transaction
struct SqliteSnapshot<'c> {
    conn: &'c Connection,
}

impl StatsSnapshot for SqliteSnapshot<'_> {
    fn count_year(&self, year: i32) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM budget_entries WHERE year = ?1",
            [year],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn year_amounts(&self, year: i32) -> Result<Vec<(BudgetType, i64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT budget_type, amount FROM budget_entries WHERE year = ?1")?;

        let amounts = stmt
            .query_map([year], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(amounts)
    }

    fn authors_by_id(&self, ids: &[i64]) -> Result<HashMap<i64, Author>> {
        let mut authors = HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(LOOKUP_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT id, fio, creation_time FROM authors WHERE id IN ({})",
                placeholders
            );
            let mut stmt = self.conn.prepare(&sql)?;

            for author in stmt.query_map(params_from_iter(chunk.iter()), author_from_row)? {
                let author = author?;
                authors.insert(author.id, author);
            }
        }

        Ok(authors)
    }

    fn sorted_page(
        &self,
        year: i32,
        fio_filter: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BudgetEntry>> {
        let mut sql = String::from(
            "SELECT id, year, month, amount, budget_type, author_id
             FROM budget_entries
             WHERE year = ?",
        );
        let mut values = vec![Value::Integer(year.into())];

        if let Some(filter) = fio_filter {
            sql.push_str(" AND author_id IN (SELECT id FROM authors WHERE fio_contains(fio, ?))");
            values.push(Value::Text(filter.to_string()));
        }

        sql.push_str(" ORDER BY month ASC, amount DESC, id ASC LIMIT ? OFFSET ?");
        values.push(Value::Integer(limit.into()));
        values.push(Value::Integer(offset.into()));

        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params_from_iter(values.iter()), entry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }
}
