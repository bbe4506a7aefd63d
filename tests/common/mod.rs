#![allow(dead_code)]

use chrono::DateTime;
use payfind::domain::account::{AccountProfile, AccountRef};
use payfind::domain::payment::{Payment, PaymentStatus, SettlementStatus, SettlementTransaction};
use std::collections::HashMap;

pub fn profile(id: &str, name: &str) -> AccountProfile {
    AccountProfile {
        id: id.to_string(),
        email: None,
        business_name: Some(name.to_string()),
        business_support_email: None,
    }
}

pub fn account(id: &str, name: &str, is_platform: bool) -> AccountRef {
    AccountRef {
        id: id.to_string(),
        display_name: name.to_string(),
        is_platform,
    }
}

pub fn payment(id: &str, amount_minor: i64) -> Payment {
    Payment {
        id: id.to_string(),
        amount_minor,
        currency: "USD".to_string(),
        status: PaymentStatus::Succeeded,
        created_at: DateTime::from_timestamp(1_735_783_200, 0).unwrap(),
        customer_id: None,
        metadata: HashMap::new(),
        settlement: None,
    }
}

pub fn settled_payment(id: &str, amount_minor: i64, available_on: i64) -> Payment {
    let mut payment = payment(id, amount_minor);
    payment.settlement = Some(SettlementTransaction {
        id: format!("txn_{id}"),
        status: SettlementStatus::Available,
        available_on: Some(DateTime::from_timestamp(available_on, 0).unwrap()),
    });
    payment
}

pub fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}
