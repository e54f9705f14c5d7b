// Entity Models
//
// Authors and budget entries, plus the request/response shapes built from them.

pub mod author;
pub mod budget;

pub use author::{Author, AuthorRecord, AuthorRecordResponse, AuthorSummary};
pub use budget::{BudgetEntry, BudgetItem, BudgetRecord, BudgetType, MAX_MONTH, MIN_MONTH};
