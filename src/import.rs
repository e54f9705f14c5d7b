// CSV import of budget records
//
// Expected header: year,month,amount,type,author (author may be empty)

use crate::entities::BudgetRecord;
use crate::error::Result;
use std::path::Path;

pub fn load_csv(csv_path: &Path) -> Result<Vec<BudgetRecord>> {
    let rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)?;
    read_records(rdr)
}

pub fn read_records<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<Vec<BudgetRecord>> {
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: BudgetRecord = result?;
        records.push(record);
    }
    Ok(records)
}
