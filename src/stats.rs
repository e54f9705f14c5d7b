// Stats Query Engine - yearly totals plus one sorted, filtered page of entries
//
// The pipeline runs against a read snapshot so count, sums and page are
// mutually consistent:
//
//   1. base set B = entries of the year
//   2. total = |B|
//   3. totalByType = sum(amount) grouped by type over B
//   4. optional fio filter narrows the working set to matching authors
//      (applied by the snapshot, so no id list is materialized)
//   5. sort by month ASC, amount DESC (id ASC on ties)
//   6. skip offset, take limit
//   7. attach authors
//
// total and totalByType ignore the fio filter; only the page honors it.

pub use crate::entities::author::fio_contains;
use crate::entities::{Author, BudgetEntry, BudgetItem, BudgetType};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// QUERY / RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    pub year: i32,
    pub limit: u32,
    pub offset: u32,
    pub fio_filter: Option<String>,
}

impl StatsQuery {
    pub fn new(year: i32, limit: u32, offset: u32) -> Self {
        StatsQuery {
            year,
            limit,
            offset,
            fio_filter: None,
        }
    }

    pub fn with_fio_filter(mut self, filter: impl Into<String>) -> Self {
        self.fio_filter = Some(filter.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearStats {
    pub total: u64,
    pub total_by_type: BTreeMap<String, i64>,
    pub items: Vec<BudgetItem>,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Read primitives the engine composes. Implementations must answer every
/// call from the same consistent view of storage.
pub trait StatsSnapshot {
    fn count_year(&self, year: i32) -> Result<u64>;

    /// Type and amount of every entry of the year
    fn year_amounts(&self, year: i32) -> Result<Vec<(BudgetType, i64)>>;

    fn authors_by_id(&self, ids: &[i64]) -> Result<HashMap<i64, Author>>;

    /// Entries of `year` ordered by [`page_order`], skipping `offset` and
    /// taking at most `limit`. With a filter, only entries whose author
    /// satisfies [`fio_contains`] are considered.
    fn sorted_page(
        &self,
        year: i32,
        fio_filter: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BudgetEntry>>;
}

/// Sums amounts per type. Types without entries are absent; a sum that does
/// not fit in i64 is an error rather than a wrapped or clamped value.
pub fn sum_by_type(
    amounts: impl IntoIterator<Item = (BudgetType, i64)>,
) -> Result<BTreeMap<BudgetType, i64>> {
    let mut sums: BTreeMap<BudgetType, i64> = BTreeMap::new();
    for (budget_type, amount) in amounts {
        let sum = sums.entry(budget_type).or_insert(0);
        *sum = sum
            .checked_add(amount)
            .ok_or(Error::SumOverflow(budget_type))?;
    }
    Ok(sums)
}

/// Page ordering: month ascending, amount descending, id ascending
pub fn page_order(a: &BudgetEntry, b: &BudgetEntry) -> Ordering {
    a.month
        .cmp(&b.month)
        .then_with(|| b.amount.cmp(&a.amount))
        .then_with(|| a.id.cmp(&b.id))
}

// ============================================================================
// ENGINE
// ============================================================================

pub fn year_stats(snapshot: &dyn StatsSnapshot, query: &StatsQuery) -> Result<YearStats> {
    let total = snapshot.count_year(query.year)?;

    let total_by_type = sum_by_type(snapshot.year_amounts(query.year)?)?
        .into_iter()
        .map(|(budget_type, sum)| (budget_type.as_str().to_string(), sum))
        .collect();

    let page = snapshot.sorted_page(
        query.year,
        query.fio_filter.as_deref(),
        query.limit,
        query.offset,
    )?;

    let mut referenced: Vec<i64> = page.iter().filter_map(|e| e.author_id).collect();
    referenced.sort_unstable();
    referenced.dedup();
    let authors = if referenced.is_empty() {
        HashMap::new()
    } else {
        snapshot.authors_by_id(&referenced)?
    };

    let items = page
        .iter()
        .map(|entry| BudgetItem::new(entry, entry.author_id.and_then(|id| authors.get(&id))))
        .collect();

    tracing::debug!(
        year = query.year,
        total,
        fio_filter = query.fio_filter.as_deref(),
        "computed year stats"
    );

    Ok(YearStats {
        total,
        total_by_type,
        items,
    })
}
