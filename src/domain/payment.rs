use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Payment intent status on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Succeeded,
    Processing,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    RequiresCapture,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Processing => "processing",
            PaymentStatus::RequiresPaymentMethod => "requires_payment_method",
            PaymentStatus::RequiresConfirmation => "requires_confirmation",
            PaymentStatus::RequiresAction => "requires_action",
            PaymentStatus::RequiresCapture => "requires_capture",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Available,
    Pending,
    #[serde(other)]
    Unknown,
}

/// Ledger entry for funds becoming available from a captured payment.
/// Associated 1:1 with the payment's latest charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementTransaction {
    pub id: String,
    pub status: SettlementStatus,
    pub available_on: Option<DateTime<Utc>>,
}

/// A payment snapshot as fetched from one account's namespace, before
/// ownership is attached. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: String,
    pub amount_minor: i64,
    /// Uppercased ISO currency code.
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub customer_id: Option<String>,
    pub metadata: HashMap<String, String>,
    pub settlement: Option<SettlementTransaction>,
}

impl Payment {
    /// Event label from metadata, first match wins: `event`, `event_name`,
    /// `Event Name`.
    pub fn event_label(&self) -> Option<String> {
        ["event", "event_name", "Event Name"]
            .iter()
            .find_map(|key| self.metadata.get(*key))
            .filter(|v| !v.is_empty())
            .cloned()
    }
}

/// A disbursement of available funds to an external bank destination.
/// `destination` is the external-account id, resolved to a bank lazily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    pub id: String,
    pub arrival_at: DateTime<Utc>,
    pub destination: Option<String>,
}
