use super::account::{AccountProfile, BankRef};
use super::payment::{Payment, Payout};
use crate::error::ApiError;
use async_trait::async_trait;

/// One page of a paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub has_more: bool,
}

/// Read-only access to the payments platform.
///
/// `scope` selects the namespace a call runs in: `None` is the platform
/// account, `Some(account_id)` a connected account. The platform exposes no
/// "which account owns this id" lookup, which is what forces the resolver's
/// exhaustive scoped probing.
#[async_trait]
pub trait PaymentsApi: Send + Sync {
    /// The platform's own account.
    async fn platform_account(&self) -> Result<AccountProfile, ApiError>;

    /// One page of connected accounts, at most `limit` entries, continuing
    /// after `starting_after` when given.
    async fn list_accounts(
        &self,
        limit: u8,
        starting_after: Option<&str>,
    ) -> Result<Page<AccountProfile>, ApiError>;

    /// A payment by id within `scope`, with its settlement expanded.
    /// `ApiError::NotFound` means the payment does not exist in that scope.
    async fn retrieve_payment(
        &self,
        payment_id: &str,
        scope: Option<&str>,
    ) -> Result<Payment, ApiError>;

    /// A customer's display name (name, falling back to email) within `scope`.
    async fn customer_name(
        &self,
        customer_id: &str,
        scope: Option<&str>,
    ) -> Result<Option<String>, ApiError>;

    /// The most recent payouts of `scope`, newest first, at most `limit`.
    async fn list_payouts(&self, scope: Option<&str>, limit: u8) -> Result<Vec<Payout>, ApiError>;

    /// A specific external (bank) account registered against `account_id`.
    async fn external_account(
        &self,
        account_id: &str,
        external_account_id: &str,
    ) -> Result<BankRef, ApiError>;

    /// The external accounts registered against `account_id`, at most `limit`.
    async fn list_external_accounts(
        &self,
        account_id: &str,
        limit: u8,
    ) -> Result<Vec<BankRef>, ApiError>;
}
