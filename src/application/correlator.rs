use crate::config::Config;
use crate::domain::ports::PaymentsApi;
use crate::domain::resolution::{Correlation, CorrelationSkip, PaymentRecord};
use crate::eastern;
use tracing::debug;

/// Matches a resolved payment's settlement to the payout that disbursed it
/// and the destination bank, best-effort.
///
/// There is no settlement-to-payout foreign key in the platform's data model,
/// so the match is a time-window heuristic: the first recently-listed payout
/// whose arrival lies within the window of the settlement's availability.
/// When several payouts fall in the window the first listed wins; no global
/// minimum is sought. Every sub-step degrades to an empty field on failure
/// and records why.
pub struct SettlementCorrelator<'a> {
    api: &'a dyn PaymentsApi,
    window_secs: i64,
    payout_limit: u8,
}

impl<'a> SettlementCorrelator<'a> {
    pub fn new(api: &'a dyn PaymentsApi, config: &Config) -> Self {
        Self {
            api,
            window_secs: config.correlation_window.as_secs() as i64,
            payout_limit: config.payout_search_limit,
        }
    }

    pub async fn correlate(&self, record: &PaymentRecord) -> Correlation {
        let mut correlation = Correlation::default();
        let Some(settlement) = &record.settlement else {
            return correlation;
        };

        // Availability is the tentative deposit date until a payout confirms
        // the funded date.
        correlation.deposit_date = settlement.available_on.map(eastern::date);

        if let Some(available_on) = settlement.available_on {
            match self
                .api
                .list_payouts(record.owner.scope(), self.payout_limit)
                .await
            {
                Ok(payouts) => {
                    let matched = payouts.iter().find(|payout| {
                        (payout.arrival_at - available_on).num_seconds().abs() <= self.window_secs
                    });
                    if let Some(payout) = matched {
                        correlation.transfer_id = Some(payout.id.clone());
                        correlation.deposit_date = Some(eastern::date(payout.arrival_at));
                        if let Some(destination) = &payout.destination {
                            match self.api.external_account(&record.owner.id, destination).await {
                                Ok(bank) => correlation.bank = Some(bank),
                                Err(e) => {
                                    debug!(payout = %payout.id, error = %e, "bank lookup failed");
                                    correlation
                                        .skips
                                        .push(CorrelationSkip::BankLookup(e.to_string()));
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    debug!(account = %record.owner.id, error = %e, "payout listing failed");
                    correlation
                        .skips
                        .push(CorrelationSkip::PayoutListing(e.to_string()));
                }
            }
        }

        // Default bank guess: the account's first listed external account.
        // Approximate when the account has several destinations.
        if correlation.bank.is_none() {
            match self.api.list_external_accounts(&record.owner.id, 1).await {
                Ok(banks) => correlation.bank = banks.into_iter().next(),
                Err(e) => {
                    debug!(account = %record.owner.id, error = %e, "default bank lookup failed");
                    correlation
                        .skips
                        .push(CorrelationSkip::DefaultBank(e.to_string()));
                }
            }
        }

        correlation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountProfile, AccountRef, BankRef};
    use crate::domain::payment::{
        Payment, PaymentStatus, Payout, SettlementStatus, SettlementTransaction,
    };
    use crate::infrastructure::in_memory::InMemoryPlatform;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;

    const AVAILABLE_ON: i64 = 1_735_862_400; // 2025-01-03 00:00 UTC
    const WINDOW: i64 = 3 * 86_400;

    fn owner() -> AccountRef {
        AccountRef {
            id: "acct_1".to_string(),
            display_name: "Acme Events".to_string(),
            is_platform: false,
        }
    }

    fn record_with_settlement(available_on: Option<i64>) -> PaymentRecord {
        let payment = Payment {
            id: "pi_1".to_string(),
            amount_minor: 5000,
            currency: "USD".to_string(),
            status: PaymentStatus::Succeeded,
            created_at: DateTime::from_timestamp(1_735_783_200, 0).unwrap(),
            customer_id: None,
            metadata: HashMap::new(),
            settlement: Some(SettlementTransaction {
                id: "txn_1".to_string(),
                status: SettlementStatus::Available,
                available_on: available_on.map(|s| DateTime::from_timestamp(s, 0).unwrap()),
            }),
        };
        PaymentRecord::from_payment(payment, owner(), None)
    }

    fn payout(id: &str, arrival: i64, destination: Option<&str>) -> Payout {
        Payout {
            id: id.to_string(),
            arrival_at: DateTime::from_timestamp(arrival, 0).unwrap(),
            destination: destination.map(str::to_string),
        }
    }

    fn platform() -> AccountProfile {
        AccountProfile {
            id: "acct_p".to_string(),
            ..Default::default()
        }
    }

    fn correlator_config() -> Config {
        Config::default()
    }

    #[tokio::test]
    async fn test_window_boundary_inclusive() {
        let api = InMemoryPlatform::new(platform())
            .with_payout(Some("acct_1"), payout("po_edge", AVAILABLE_ON + WINDOW, None));
        let cfg = correlator_config();
        let correlator = SettlementCorrelator::new(&api, &cfg);

        let correlation = correlator.correlate(&record_with_settlement(Some(AVAILABLE_ON))).await;
        assert_eq!(correlation.transfer_id.as_deref(), Some("po_edge"));
    }

    #[tokio::test]
    async fn test_one_second_past_window_rejected() {
        let api = InMemoryPlatform::new(platform()).with_payout(
            Some("acct_1"),
            payout("po_late", AVAILABLE_ON + WINDOW + 1, None),
        );
        let cfg = correlator_config();
        let correlator = SettlementCorrelator::new(&api, &cfg);

        let correlation = correlator.correlate(&record_with_settlement(Some(AVAILABLE_ON))).await;
        assert_eq!(correlation.transfer_id, None);
        // Tentative deposit date from availability survives.
        let available: DateTime<Utc> = DateTime::from_timestamp(AVAILABLE_ON, 0).unwrap();
        assert_eq!(correlation.deposit_date, Some(eastern::date(available)));
    }

    #[tokio::test]
    async fn test_first_listed_match_wins() {
        // po_b is closer in time but listed second; the heuristic is listing
        // order, not nearest arrival.
        let api = InMemoryPlatform::new(platform())
            .with_payout(Some("acct_1"), payout("po_a", AVAILABLE_ON + 86_400, None))
            .with_payout(Some("acct_1"), payout("po_b", AVAILABLE_ON + 3_600, None));
        let cfg = correlator_config();
        let correlator = SettlementCorrelator::new(&api, &cfg);

        let correlation = correlator.correlate(&record_with_settlement(Some(AVAILABLE_ON))).await;
        assert_eq!(correlation.transfer_id.as_deref(), Some("po_a"));
    }

    #[tokio::test]
    async fn test_matched_payout_overrides_deposit_date_and_resolves_bank() {
        let arrival = AVAILABLE_ON + 2 * 86_400;
        let api = InMemoryPlatform::new(platform())
            .with_payout(Some("acct_1"), payout("po_1", arrival, Some("ba_1")))
            .with_external_account(
                "acct_1",
                "ba_1",
                BankRef {
                    bank_name: "First National".to_string(),
                    last4: "6789".to_string(),
                },
            );
        let cfg = correlator_config();
        let correlator = SettlementCorrelator::new(&api, &cfg);

        let correlation = correlator.correlate(&record_with_settlement(Some(AVAILABLE_ON))).await;
        let arrival_ts: DateTime<Utc> = DateTime::from_timestamp(arrival, 0).unwrap();
        assert_eq!(correlation.deposit_date, Some(eastern::date(arrival_ts)));
        assert_eq!(
            correlation.bank_label(),
            "First National \u{2022}\u{2022}\u{2022}\u{2022} 6789"
        );
        assert!(correlation.skips.is_empty());
    }

    #[tokio::test]
    async fn test_bank_failure_degrades_without_error() {
        let api = InMemoryPlatform::new(platform())
            .with_payout(Some("acct_1"), payout("po_1", AVAILABLE_ON, Some("ba_1")))
            .failing_external_accounts();
        let cfg = correlator_config();
        let correlator = SettlementCorrelator::new(&api, &cfg);

        let correlation = correlator.correlate(&record_with_settlement(Some(AVAILABLE_ON))).await;
        assert_eq!(correlation.transfer_id.as_deref(), Some("po_1"));
        assert_eq!(correlation.bank, None);
        assert_eq!(correlation.skips.len(), 2); // bank lookup + default bank
    }

    #[tokio::test]
    async fn test_payout_listing_failure_falls_back_to_default_bank() {
        let api = InMemoryPlatform::new(platform())
            .failing_payout_listing()
            .with_external_account(
                "acct_1",
                "ba_default",
                BankRef {
                    bank_name: "Community Credit".to_string(),
                    last4: "0001".to_string(),
                },
            );
        let cfg = correlator_config();
        let correlator = SettlementCorrelator::new(&api, &cfg);

        let correlation = correlator.correlate(&record_with_settlement(Some(AVAILABLE_ON))).await;
        assert_eq!(correlation.transfer_id, None);
        assert_eq!(
            correlation.bank,
            Some(BankRef {
                bank_name: "Community Credit".to_string(),
                last4: "0001".to_string(),
            })
        );
        assert!(matches!(
            correlation.skips.as_slice(),
            [CorrelationSkip::PayoutListing(_)]
        ));
    }

    #[tokio::test]
    async fn test_no_settlement_yields_empty_correlation() {
        let api = InMemoryPlatform::new(platform());
        let cfg = correlator_config();
        let correlator = SettlementCorrelator::new(&api, &cfg);

        let mut record = record_with_settlement(Some(AVAILABLE_ON));
        record.settlement = None;
        let correlation = correlator.correlate(&record).await;
        assert_eq!(correlation, Correlation::default());
    }
}
