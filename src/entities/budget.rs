// Budget Entry Entity - one monthly amount of a given type within a year
//
// Entries are immutable once stored. The author link is a weak reference
// (an id), resolved only when a stats page is built.

use super::author::{Author, AuthorSummary};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_MONTH: i32 = 1;
pub const MAX_MONTH: i32 = 12;

// ============================================================================
// BUDGET TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BudgetType {
    /// Money coming in
    Income,

    /// Money going out
    Expense,
}

impl BudgetType {
    pub const ALL: [BudgetType; 2] = [BudgetType::Income, BudgetType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetType::Income => "Income",
            BudgetType::Expense => "Expense",
        }
    }
}

impl fmt::Display for BudgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BudgetType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::Validation(format!("unknown budget type '{}'", s)))
    }
}

// ============================================================================
// BUDGET ENTRY
// ============================================================================

/// Stored budget entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetEntry {
    pub id: i64,
    pub year: i32,
    /// 1..=12
    pub month: i32,
    pub amount: i64,
    pub budget_type: BudgetType,
    pub author_id: Option<i64>,
}

// ============================================================================
// REQUEST / RESPONSE SHAPES
// ============================================================================

/// Body of `POST /budget/add`, also its echo response and the CSV row shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub year: i32,
    pub month: i32,
    pub amount: i64,
    #[serde(rename = "type")]
    pub budget_type: BudgetType,
    #[serde(default)]
    pub author: Option<i64>,
}

impl BudgetRecord {
    pub fn new(year: i32, month: i32, amount: i64, budget_type: BudgetType) -> Self {
        BudgetRecord {
            year,
            month,
            amount,
            budget_type,
            author: None,
        }
    }

    pub fn with_author(mut self, author_id: i64) -> Self {
        self.author = Some(author_id);
        self
    }

    /// Field checks that do not need storage. Author existence is checked
    /// by the repository inside the insert transaction.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_MONTH..=MAX_MONTH).contains(&self.month) {
            return Err(Error::Validation(format!(
                "month must be between {} and {}, got {}",
                MIN_MONTH, MAX_MONTH, self.month
            )));
        }
        Ok(())
    }
}

impl From<&BudgetEntry> for BudgetRecord {
    fn from(entry: &BudgetEntry) -> Self {
        BudgetRecord {
            year: entry.year,
            month: entry.month,
            amount: entry.amount,
            budget_type: entry.budget_type,
            author: entry.author_id,
        }
    }
}

/// One row of a stats page, with the author resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub year: i32,
    pub month: i32,
    pub amount: i64,
    #[serde(rename = "type")]
    pub budget_type: BudgetType,
    pub author: Option<AuthorSummary>,
}

impl BudgetItem {
    pub fn new(entry: &BudgetEntry, author: Option<&Author>) -> Self {
        BudgetItem {
            year: entry.year,
            month: entry.month,
            amount: entry.amount,
            budget_type: entry.budget_type,
            author: author.map(Author::summary),
        }
    }
}
