//! Report enrichment stage: joins a tabular report against the mapping
//! produced by the `map` stage and appends ownership, payout and bank columns.
//! The payment-id column is auto-detected rather than configured.

use crate::application::correlator::SettlementCorrelator;
use crate::config::Config;
use crate::domain::account::AccountRef;
use crate::domain::ports::PaymentsApi;
use crate::domain::report::NOT_FOUND_NAME;
use crate::domain::resolution::PaymentRecord;
use crate::error::{Error, Result};
use crate::interfaces::csv::mapping_reader::OwnerEntry;
use std::collections::HashMap;
use std::io::{Read, Write};
use tracing::{info, warn};

pub const ENRICHED_HEADERS: [&str; 4] = [
    "Stripe Account Name",
    "Transfer/Payout ID",
    "Bank Account",
    "Bank Deposit Date",
];

/// Payment identifier prefix used for column detection.
const ID_PREFIX: &str = "pi_";
/// How many leading rows are sampled per column when detecting ids.
const SAMPLE_ROWS: usize = 10;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichSummary {
    pub rows_total: usize,
    pub rows_mapped: usize,
    pub rows_enriched: usize,
    /// Non-empty account names by row count, largest first.
    pub account_distribution: Vec<(String, usize)>,
}

pub struct ReportEnricher<'a> {
    /// `None` when no credential is configured: the account-name column is
    /// still filled from the mapping, payout and bank columns stay empty.
    api: Option<&'a dyn PaymentsApi>,
    config: &'a Config,
    mapping: HashMap<String, OwnerEntry>,
}

impl<'a> ReportEnricher<'a> {
    pub fn new(
        api: Option<&'a dyn PaymentsApi>,
        config: &'a Config,
        mapping: HashMap<String, OwnerEntry>,
    ) -> Self {
        Self {
            api,
            config,
            mapping,
        }
    }

    pub async fn enrich<R: Read, W: Write>(&self, input: R, output: W) -> Result<EnrichSummary> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(input);
        let headers = reader.headers()?.clone();
        let mut records = Vec::new();
        for record in reader.records() {
            records.push(record?);
        }

        let id_column = detect_payment_column(&headers, &records).ok_or_else(|| {
            Error::Report("could not find a column holding payment ids".to_string())
        })?;
        info!(column = headers.get(id_column).unwrap_or(""), "found payment id column");

        let platform_id = self.platform_id().await;

        let mut writer = csv::Writer::from_writer(output);
        let mut out_header = headers.clone();
        for added in ENRICHED_HEADERS {
            out_header.push_field(added);
        }
        writer.write_record(&out_header)?;

        let mut summary = EnrichSummary {
            rows_total: records.len(),
            ..EnrichSummary::default()
        };
        let mut distribution: HashMap<String, usize> = HashMap::new();

        for record in &records {
            let payment_id = record.get(id_column).unwrap_or("").trim().to_string();
            let mut extras: [String; 4] = Default::default();

            if payment_id.starts_with(ID_PREFIX) {
                if let Some(entry) = self.mapping.get(&payment_id) {
                    summary.rows_mapped += 1;
                    extras[0] = entry.account_name.clone();
                    *distribution.entry(entry.account_name.clone()).or_default() += 1;

                    if entry.account_name != NOT_FOUND_NAME {
                        if let (Some(api), Some(platform_id)) = (self.api, platform_id.as_deref()) {
                            if self
                                .fill_correlation(api, platform_id, entry, &mut extras)
                                .await
                            {
                                summary.rows_enriched += 1;
                            }
                            // Crude rate limiting between per-row API bursts.
                            if !self.config.enrich_delay.is_zero() {
                                tokio::time::sleep(self.config.enrich_delay).await;
                            }
                        }
                    }
                }
            }

            let mut out = record.clone();
            for extra in &extras {
                out.push_field(extra);
            }
            writer.write_record(&out)?;
        }
        writer.flush()?;

        let mut account_distribution: Vec<(String, usize)> = distribution.into_iter().collect();
        account_distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        summary.account_distribution = account_distribution;
        Ok(summary)
    }

    async fn platform_id(&self) -> Option<String> {
        let api = self.api?;
        match api.platform_account().await {
            Ok(profile) => Some(profile.id),
            Err(e) => {
                warn!(error = %e, "cannot identify platform account, enrichment degraded");
                None
            }
        }
    }

    /// Re-fetches the payment scoped to its recorded owner and correlates.
    /// Returns whether any enrichment column was produced.
    async fn fill_correlation(
        &self,
        api: &dyn PaymentsApi,
        platform_id: &str,
        entry: &OwnerEntry,
        extras: &mut [String; 4],
    ) -> bool {
        let owner = AccountRef {
            id: entry.account_id.clone(),
            display_name: entry.account_name.clone(),
            is_platform: entry.account_id == platform_id,
        };
        let payment = match api.retrieve_payment(&entry.payment_id, owner.scope()).await {
            Ok(payment) => payment,
            Err(e) => {
                warn!(payment_id = %entry.payment_id, error = %e, "payment re-fetch failed");
                return false;
            }
        };
        let record = PaymentRecord::from_payment(payment, owner, None);
        let correlation = SettlementCorrelator::new(api, self.config)
            .correlate(&record)
            .await;

        if let Some(transfer_id) = &correlation.transfer_id {
            extras[1] = transfer_id.clone();
        }
        if let Some(bank) = &correlation.bank {
            extras[2] = bank.to_string();
        }
        if let Some(date) = correlation.deposit_date {
            extras[3] = date.format("%Y-%m-%d").to_string();
        }
        extras[1..].iter().any(|v| !v.is_empty())
    }
}

/// Any column whose first [`SAMPLE_ROWS`] values contain a `pi_` fragment is
/// taken as the payment-id column; first such column wins.
fn detect_payment_column(headers: &csv::StringRecord, records: &[csv::StringRecord]) -> Option<usize> {
    (0..headers.len()).find(|&col| {
        records
            .iter()
            .take(SAMPLE_ROWS)
            .any(|record| record.get(col).is_some_and(|v| v.contains(ID_PREFIX)))
    })
}
