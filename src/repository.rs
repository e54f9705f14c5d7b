// Repository interface over the two persisted collections
//
// The service and the HTTP layer hold an `Arc<dyn BudgetRepository>`; nothing
// reaches storage through global state. `SqliteRepository` (db.rs) is the
// production backend, `MemoryRepository` keeps the engine testable without a
// database.

use crate::entities::{Author, BudgetEntry, BudgetRecord, BudgetType};
use crate::error::{Error, Result};
use crate::stats::{self, StatsQuery, StatsSnapshot, YearStats};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

pub trait BudgetRepository: Send + Sync {
    fn add_author(&self, fio: &str, creation_time: DateTime<Utc>) -> Result<Author>;

    /// Stores the entry. Fails with [`Error::UnknownAuthor`] if the record
    /// references a missing author; the check and the insert are atomic.
    fn add_entry(&self, record: &BudgetRecord) -> Result<BudgetEntry>;

    /// Runs the stats pipeline inside one read snapshot
    fn year_stats(&self, query: &StatsQuery) -> Result<YearStats>;

    fn entry_count(&self) -> Result<u64>;

    /// Drops every entry and author
    fn reset(&self) -> Result<()>;
}

// ============================================================================
// IN-MEMORY REPOSITORY
// ============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    authors: Vec<Author>,
    entries: Vec<BudgetEntry>,
    next_author_id: i64,
    next_entry_id: i64,
}

/// Append-only in-memory storage behind a single lock
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BudgetRepository for MemoryRepository {
    fn add_author(&self, fio: &str, creation_time: DateTime<Utc>) -> Result<Author> {
        let mut state = self.state.write().map_err(|_| Error::LockPoisoned)?;
        state.next_author_id += 1;
        let author = Author {
            id: state.next_author_id,
            fio: fio.to_string(),
            creation_time,
        };
        state.authors.push(author.clone());
        Ok(author)
    }

    fn add_entry(&self, record: &BudgetRecord) -> Result<BudgetEntry> {
        let mut state = self.state.write().map_err(|_| Error::LockPoisoned)?;
        if let Some(author_id) = record.author {
            if !state.authors.iter().any(|a| a.id == author_id) {
                return Err(Error::UnknownAuthor(author_id));
            }
        }

        state.next_entry_id += 1;
        let entry = BudgetEntry {
            id: state.next_entry_id,
            year: record.year,
            month: record.month,
            amount: record.amount,
            budget_type: record.budget_type,
            author_id: record.author,
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }

    fn year_stats(&self, query: &StatsQuery) -> Result<YearStats> {
        let state = self.state.read().map_err(|_| Error::LockPoisoned)?;
        stats::year_stats(&*state, query)
    }

    fn entry_count(&self) -> Result<u64> {
        let state = self.state.read().map_err(|_| Error::LockPoisoned)?;
        Ok(state.entries.len() as u64)
    }

    fn reset(&self) -> Result<()> {
        let mut state = self.state.write().map_err(|_| Error::LockPoisoned)?;
        state.authors.clear();
        state.entries.clear();
        Ok(())
    }
}

impl StatsSnapshot for MemoryState {
    fn count_year(&self, year: i32) -> Result<u64> {
        Ok(self.entries.iter().filter(|e| e.year == year).count() as u64)
    }

    fn year_amounts(&self, year: i32) -> Result<Vec<(BudgetType, i64)>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.year == year)
            .map(|e| (e.budget_type, e.amount))
            .collect())
    }

    fn authors_by_id(&self, ids: &[i64]) -> Result<HashMap<i64, Author>> {
        Ok(self
            .authors
            .iter()
            .filter(|a| ids.contains(&a.id))
            .map(|a| (a.id, a.clone()))
            .collect())
    }

    fn sorted_page(
        &self,
        year: i32,
        fio_filter: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BudgetEntry>> {
        let matching: Option<HashSet<i64>> = fio_filter.map(|filter| {
            self.authors
                .iter()
                .filter(|a| a.matches_fio(filter))
                .map(|a| a.id)
                .collect()
        });

        let mut working: Vec<&BudgetEntry> = self
            .entries
            .iter()
            .filter(|e| e.year == year)
            .filter(|e| match &matching {
                Some(ids) => e.author_id.map_or(false, |id| ids.contains(&id)),
                None => true,
            })
            .collect();
        working.sort_by(|a, b| stats::page_order(a, b));

        Ok(working
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
