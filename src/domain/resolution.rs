use super::account::{AccountRef, BankRef};
use super::payment::{Payment, PaymentStatus, SettlementTransaction};
use chrono::{DateTime, NaiveDate, Utc};

/// A payment with its ownership attached: the terminal product of the
/// resolver for a single id.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub owner: AccountRef,
    pub amount_minor: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub event_label: Option<String>,
    pub settlement: Option<SettlementTransaction>,
}

impl PaymentRecord {
    pub fn from_payment(payment: Payment, owner: AccountRef, customer_name: Option<String>) -> Self {
        let event_label = payment.event_label();
        Self {
            payment_id: payment.id,
            owner,
            amount_minor: payment.amount_minor,
            currency: payment.currency,
            status: payment.status,
            created_at: payment.created_at,
            customer_name,
            event_label,
            settlement: payment.settlement,
        }
    }
}

/// Why a payment id could not be resolved to an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// No probed account returned the payment.
    NotFound,
    /// The connected-account listing failed, so only the platform was probed.
    ListingError,
}

/// Outcome of resolving one payment id.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionResult {
    Resolved(PaymentRecord),
    Unresolved {
        payment_id: String,
        reason: FailureReason,
    },
}

impl ResolutionResult {
    pub fn payment_id(&self) -> &str {
        match self {
            ResolutionResult::Resolved(record) => &record.payment_id,
            ResolutionResult::Unresolved { payment_id, .. } => payment_id,
        }
    }

    pub fn record(&self) -> Option<&PaymentRecord> {
        match self {
            ResolutionResult::Resolved(record) => Some(record),
            ResolutionResult::Unresolved { .. } => None,
        }
    }
}

/// A correlation sub-step that degraded instead of producing its field.
/// Recorded explicitly rather than swallowed, so callers can log or audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrelationSkip {
    PayoutListing(String),
    BankLookup(String),
    DefaultBank(String),
}

/// Best-effort settlement-to-payout correlation for one payment.
///
/// Any field can be absent; `skips` names the sub-steps that failed. The
/// payout match itself is a heuristic (arrival within a fixed window of the
/// settlement's availability, first listed match wins) with no exactness
/// guarantee when several payouts fall in the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Correlation {
    pub transfer_id: Option<String>,
    pub bank: Option<BankRef>,
    pub deposit_date: Option<NaiveDate>,
    pub skips: Vec<CorrelationSkip>,
}

impl Correlation {
    pub fn bank_label(&self) -> String {
        self.bank.as_ref().map(|b| b.to_string()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::Payment;
    use std::collections::HashMap;

    fn owner() -> AccountRef {
        AccountRef {
            id: "acct_1".to_string(),
            display_name: "Acme Events".to_string(),
            is_platform: false,
        }
    }

    #[test]
    fn test_record_carries_event_label_from_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert("event".to_string(), "Winter Ball".to_string());
        let payment = Payment {
            id: "pi_1".to_string(),
            amount_minor: 5000,
            currency: "USD".to_string(),
            status: PaymentStatus::Succeeded,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            customer_id: None,
            metadata,
            settlement: None,
        };

        let record = PaymentRecord::from_payment(payment, owner(), Some("Jo Client".to_string()));
        assert_eq!(record.event_label.as_deref(), Some("Winter Ball"));
        assert_eq!(record.customer_name.as_deref(), Some("Jo Client"));
        assert_eq!(record.owner.id, "acct_1");
    }

    #[test]
    fn test_resolution_result_accessors() {
        let unresolved = ResolutionResult::Unresolved {
            payment_id: "pi_X".to_string(),
            reason: FailureReason::NotFound,
        };
        assert_eq!(unresolved.payment_id(), "pi_X");
        assert!(unresolved.record().is_none());
    }

    #[test]
    fn test_empty_correlation_bank_label() {
        assert_eq!(Correlation::default().bank_label(), "");
    }
}
