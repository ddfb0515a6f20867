//! File-based assumption loader
//!
//! Plan assumptions are read from JSON; one-off CAPEX schedules can be kept in a
//! separate CSV file with `name,purchase_month,cost` columns.

use super::{CapexItem, PlanAssumptions};
use crate::error::PlanError;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Default location of the plan assumptions file
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions.json";

/// Load and validate plan assumptions from a JSON file
pub fn load_assumptions(path: &Path) -> Result<PlanAssumptions, PlanError> {
    let file = File::open(path)?;
    let assumptions: PlanAssumptions = serde_json::from_reader(BufReader::new(file))?;
    assumptions.validate()?;
    Ok(assumptions)
}

/// Load a CAPEX schedule from a CSV file
pub fn load_capex_items(path: &Path) -> Result<Vec<CapexItem>, PlanError> {
    let file = File::open(path)?;
    load_capex_items_from_reader(file)
}

/// Load a CAPEX schedule from any CSV reader
pub fn load_capex_items_from_reader<R: Read>(reader: R) -> Result<Vec<CapexItem>, PlanError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut items = Vec::new();

    for result in reader.deserialize() {
        let item: CapexItem = result?;
        items.push(item);
    }

    log::debug!("Loaded {} CAPEX items", items.len());
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_capex_items_from_csv() {
        let data = "name,purchase_month,cost\nlaptops,2,12000\nservers,7,30000.5\n";
        let items = load_capex_items_from_reader(data.as_bytes()).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], CapexItem::new("laptops", 2, 12_000.0));
        assert_eq!(items[1].purchase_month, 7);
        assert_eq!(items[1].cost, 30_000.5);
    }

    #[test]
    fn test_bad_csv_is_an_error() {
        let data = "name,purchase_month,cost\nlaptops,soon,12000\n";
        assert!(matches!(
            load_capex_items_from_reader(data.as_bytes()),
            Err(PlanError::Csv(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_assumptions(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(PlanError::Io(_))));
    }
}
