use super::payment::{SettlementStatus, SettlementTransaction};
use super::resolution::ResolutionResult;
use crate::eastern;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel account name for ids no account returned.
pub const NOT_FOUND_NAME: &str = "NOT FOUND";

/// One row of the intermediate mapping artifact, exactly the columns the
/// downstream enrichment stage consumes. Dates are rendered in US Eastern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRow {
    pub payment_id: String,
    pub account_id: String,
    pub account_name: String,
    pub customer_name: String,
    pub event_name: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub transaction_date_est: String,
    pub payout_status: String,
    pub payout_date: String,
}

impl MappingRow {
    pub fn from_resolution(result: &ResolutionResult) -> Self {
        match result {
            ResolutionResult::Resolved(record) => {
                let (payout_status, payout_date) = settlement_columns(record.settlement.as_ref());
                Self {
                    payment_id: record.payment_id.clone(),
                    account_id: record.owner.id.clone(),
                    account_name: record.owner.display_name.clone(),
                    customer_name: record.customer_name.clone().unwrap_or_default(),
                    event_name: record.event_label.clone().unwrap_or_default(),
                    amount: Decimal::new(record.amount_minor, 2),
                    currency: record.currency.clone(),
                    status: record.status.to_string(),
                    transaction_date_est: eastern::datetime_label(record.created_at),
                    payout_status,
                    payout_date,
                }
            }
            ResolutionResult::Unresolved { payment_id, .. } => Self {
                payment_id: payment_id.clone(),
                account_id: String::new(),
                account_name: NOT_FOUND_NAME.to_string(),
                customer_name: String::new(),
                event_name: String::new(),
                amount: Decimal::ZERO,
                currency: String::new(),
                status: String::new(),
                transaction_date_est: String::new(),
                payout_status: String::new(),
                payout_date: String::new(),
            },
        }
    }
}

/// `(payout_status, payout_date)` columns from a settlement, mirroring the
/// availability estimate: the date is tentative until a payout is correlated.
fn settlement_columns(settlement: Option<&SettlementTransaction>) -> (String, String) {
    let Some(settlement) = settlement else {
        return (String::new(), String::new());
    };
    let available_date = settlement
        .available_on
        .map(eastern::date_label)
        .unwrap_or_default();
    let status = match settlement.status {
        SettlementStatus::Available => format!("Available ({available_date})"),
        SettlementStatus::Pending => "Pending".to_string(),
        SettlementStatus::Unknown => "Unknown".to_string(),
    };
    (status, available_date)
}

/// Per-account totals, grouped by display name and sorted by amount
/// descending. Order of equal totals follows first appearance.
pub fn account_totals(rows: &[MappingRow]) -> Vec<(String, Decimal)> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: std::collections::HashMap<String, Decimal> = std::collections::HashMap::new();
    for row in rows {
        if !totals.contains_key(&row.account_name) {
            order.push(row.account_name.clone());
        }
        *totals.entry(row.account_name.clone()).or_default() += row.amount;
    }
    let mut out: Vec<(String, Decimal)> = order
        .into_iter()
        .map(|name| {
            let total = totals[&name];
            (name, total)
        })
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}
