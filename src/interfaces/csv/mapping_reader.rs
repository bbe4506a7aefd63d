use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

/// The owner columns of one mapping row; the remaining columns are not needed
/// by the enrichment stage and are skipped on read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnerEntry {
    pub payment_id: String,
    pub account_id: String,
    pub account_name: String,
}

/// Loads the payment-to-owner mapping produced by the `map` stage, keyed by
/// payment id.
pub fn load_mapping<R: Read>(source: R) -> Result<HashMap<String, OwnerEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);
    let mut mapping = HashMap::new();
    for entry in reader.deserialize() {
        let entry: OwnerEntry = entry?;
        mapping.insert(entry.payment_id.clone(), entry);
    }
    Ok(mapping)
}
