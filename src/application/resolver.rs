use crate::domain::account::AccountRef;
use crate::domain::ports::PaymentsApi;
use crate::domain::resolution::{FailureReason, PaymentRecord, ResolutionResult};
use tracing::{debug, warn};

/// Determines which account owns a payment id by exhaustive scoped probing.
///
/// The platform offers no owner-of-id lookup, so the resolver fetches the
/// payment under each candidate scope until one succeeds: platform first, then
/// connected accounts in directory order. Payment ids partition disjointly
/// across accounts, so the first hit is the owner and probing stops there.
/// Worst case is one call per account (platform miss plus a full scan).
pub struct OwnershipResolver<'a> {
    api: &'a dyn PaymentsApi,
    platform: AccountRef,
    /// `None` means the connected-account listing failed; resolution then
    /// degrades to `ListingError` after the platform probe.
    connected: Option<Vec<AccountRef>>,
}

impl<'a> OwnershipResolver<'a> {
    pub fn new(
        api: &'a dyn PaymentsApi,
        platform: AccountRef,
        connected: Option<Vec<AccountRef>>,
    ) -> Self {
        Self {
            api,
            platform,
            connected,
        }
    }

    pub async fn resolve(&self, payment_id: &str) -> ResolutionResult {
        if let Some(record) = self.probe(payment_id, &self.platform).await {
            return ResolutionResult::Resolved(record);
        }

        let Some(connected) = &self.connected else {
            return ResolutionResult::Unresolved {
                payment_id: payment_id.to_string(),
                reason: FailureReason::ListingError,
            };
        };

        for account in connected {
            if let Some(record) = self.probe(payment_id, account).await {
                return ResolutionResult::Resolved(record);
            }
        }

        ResolutionResult::Unresolved {
            payment_id: payment_id.to_string(),
            reason: FailureReason::NotFound,
        }
    }

    /// One scoped fetch. Not-found is a silent miss; any other fault is
    /// logged and also treated as a miss so the scan keeps moving.
    async fn probe(&self, payment_id: &str, account: &AccountRef) -> Option<PaymentRecord> {
        match self.api.retrieve_payment(payment_id, account.scope()).await {
            Ok(payment) => {
                let customer_name = match payment.customer_id.as_deref() {
                    Some(customer_id) => self.lookup_customer(customer_id, account).await,
                    None => None,
                };
                Some(PaymentRecord::from_payment(
                    payment,
                    account.clone(),
                    customer_name,
                ))
            }
            Err(e) if e.is_not_found() => {
                debug!(payment_id, account = %account.id, "probe miss");
                None
            }
            Err(e) => {
                warn!(payment_id, account = %account.id, error = %e, "probe fault, treating as miss");
                None
            }
        }
    }

    async fn lookup_customer(&self, customer_id: &str, account: &AccountRef) -> Option<String> {
        match self.api.customer_name(customer_id, account.scope()).await {
            Ok(name) => name,
            Err(e) => {
                debug!(customer_id, error = %e, "customer lookup failed");
                None
            }
        }
    }
}
