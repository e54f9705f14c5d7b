// Budget service - validation and logging in front of an injected repository

use crate::entities::{AuthorRecord, AuthorRecordResponse, BudgetRecord};
use crate::error::{Error, Result};
use crate::repository::BudgetRepository;
use crate::stats::{StatsQuery, YearStats};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct BudgetService {
    repo: Arc<dyn BudgetRepository>,
}

impl BudgetService {
    pub fn new(repo: Arc<dyn BudgetRepository>) -> Self {
        BudgetService { repo }
    }

    pub fn add_author(&self, record: &AuthorRecord) -> Result<AuthorRecordResponse> {
        record.validate()?;
        let author = self.repo.add_author(&record.fio, Utc::now())?;
        info!(author_id = author.id, "author added");
        Ok(AuthorRecordResponse::from(&author))
    }

    /// Validates and stores one record, echoing what was stored
    pub fn add_record(&self, record: &BudgetRecord) -> Result<BudgetRecord> {
        let entry = record
            .validate()
            .and_then(|_| self.repo.add_entry(record))
            .inspect_err(|e| {
                if e.is_client_error() {
                    warn!(error = %e, "rejected budget entry");
                }
            })?;
        debug!(entry_id = entry.id, year = entry.year, "budget entry added");
        Ok(BudgetRecord::from(&entry))
    }

    pub fn year_stats(&self, query: &StatsQuery) -> Result<YearStats> {
        self.repo.year_stats(query)
    }

    /// Inserts records in order, stopping at the first failure.
    /// Rows before the failing one stay stored.
    pub fn import_records(&self, records: &[BudgetRecord]) -> Result<usize> {
        for (index, record) in records.iter().enumerate() {
            self.add_record(record).map_err(|source| Error::Import {
                // Row 1 is the CSV header
                row: index + 2,
                source: Box::new(source),
            })?;
        }
        info!(count = records.len(), "import finished");
        Ok(records.len())
    }

    pub fn entry_count(&self) -> Result<u64> {
        self.repo.entry_count()
    }

    pub fn reset(&self) -> Result<()> {
        warn!("resetting budget storage");
        self.repo.reset()
    }
}
