use super::correlator::SettlementCorrelator;
use super::directory::AccountDirectory;
use super::resolver::OwnershipResolver;
use crate::config::Config;
use crate::domain::ports::PaymentsApi;
use crate::domain::report::{account_totals, MappingRow};
use crate::domain::resolution::{Correlation, ResolutionResult};
use crate::error::Result;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{info, warn};

/// One processed payment id: its resolution plus, when enabled, the
/// settlement correlation.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub resolution: ResolutionResult,
    pub correlation: Option<Correlation>,
}

/// The batch's terminal artifact, rows in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn mapping_rows(&self) -> Vec<MappingRow> {
        self.entries
            .iter()
            .map(|entry| MappingRow::from_resolution(&entry.resolution))
            .collect()
    }

    /// Per-account totals in dollars, grouped by display name, largest first.
    pub fn totals(&self) -> Vec<(String, Decimal)> {
        account_totals(&self.mapping_rows())
    }
}

/// Drives the resolver (and optionally the correlator) over an ordered id
/// list. Sequential by design: one outstanding call at a time, with a small
/// pause between correlated ids to stay under the platform's rate limits.
pub struct BatchOrchestrator<'a> {
    resolver: OwnershipResolver<'a>,
    correlator: Option<SettlementCorrelator<'a>>,
    delay: Duration,
}

impl<'a> BatchOrchestrator<'a> {
    /// Builds the directory and resolver. A platform lookup failure is fatal;
    /// a connected-listing failure is reported once and degrades resolution.
    pub async fn prepare(
        api: &'a dyn PaymentsApi,
        config: &Config,
        correlate: bool,
    ) -> Result<BatchOrchestrator<'a>> {
        let directory = AccountDirectory::new(api);
        let platform = directory.platform().await?;
        let connected = match directory.connected().await {
            Ok(accounts) => {
                info!(count = accounts.len(), "fetched connected accounts");
                Some(accounts)
            }
            Err(e) => {
                warn!(error = %e, "cannot list connected accounts, resolution degraded");
                None
            }
        };
        Ok(Self {
            resolver: OwnershipResolver::new(api, platform, connected),
            correlator: correlate.then(|| SettlementCorrelator::new(api, config)),
            delay: config.enrich_delay,
        })
    }

    pub fn new(
        resolver: OwnershipResolver<'a>,
        correlator: Option<SettlementCorrelator<'a>>,
        delay: Duration,
    ) -> Self {
        Self {
            resolver,
            correlator,
            delay,
        }
    }

    /// Attempts every id exactly once, in input order. Per-id failures never
    /// abort the batch.
    pub async fn run(&self, payment_ids: &[String]) -> BatchReport {
        let total = payment_ids.len();
        let mut entries = Vec::with_capacity(total);
        for (idx, payment_id) in payment_ids.iter().enumerate() {
            let resolution = self.resolver.resolve(payment_id).await;
            match &resolution {
                ResolutionResult::Resolved(record) => info!(
                    "[{}/{}] {} -> {}",
                    idx + 1,
                    total,
                    payment_id,
                    record.owner.display_name
                ),
                ResolutionResult::Unresolved { reason, .. } => {
                    info!("[{}/{}] {} -> not found ({reason:?})", idx + 1, total, payment_id)
                }
            }

            let correlation = match (&self.correlator, resolution.record()) {
                (Some(correlator), Some(record)) => {
                    let correlation = correlator.correlate(record).await;
                    if !self.delay.is_zero() && idx + 1 < total {
                        tokio::time::sleep(self.delay).await;
                    }
                    Some(correlation)
                }
                _ => None,
            };

            entries.push(BatchEntry {
                resolution,
                correlation,
            });
        }
        BatchReport { entries }
    }
}
