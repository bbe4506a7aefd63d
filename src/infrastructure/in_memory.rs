//! In-memory stand-in for the remote platform. Backs unit and integration
//! tests; records every payment probe so tests can assert on probing order
//! and early exit.

use crate::domain::account::{AccountProfile, BankRef};
use crate::domain::payment::{Payment, Payout};
use crate::domain::ports::{Page, PaymentsApi};
use crate::error::ApiError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Scope = Option<String>;

fn scope_key(scope: Option<&str>) -> Scope {
    scope.map(str::to_string)
}

#[derive(Default)]
pub struct InMemoryPlatform {
    platform: AccountProfile,
    connected: Vec<AccountProfile>,
    payments: HashMap<Scope, HashMap<String, Payment>>,
    customers: HashMap<(Scope, String), String>,
    payouts: HashMap<Scope, Vec<Payout>>,
    external_accounts: HashMap<String, Vec<(String, BankRef)>>,
    account_page_size: Option<u8>,
    fail_listing: bool,
    fail_payouts: bool,
    fail_external: bool,
    faulty_scopes: Vec<Scope>,
    probes: Arc<RwLock<Vec<Scope>>>,
}

impl InMemoryPlatform {
    pub fn new(platform: AccountProfile) -> Self {
        Self {
            platform,
            ..Self::default()
        }
    }

    pub fn with_connected(mut self, account: AccountProfile) -> Self {
        self.connected.push(account);
        self
    }

    pub fn with_payment(mut self, scope: Option<&str>, payment: Payment) -> Self {
        self.payments
            .entry(scope_key(scope))
            .or_default()
            .insert(payment.id.clone(), payment);
        self
    }

    pub fn with_customer(mut self, scope: Option<&str>, customer_id: &str, name: &str) -> Self {
        self.customers
            .insert((scope_key(scope), customer_id.to_string()), name.to_string());
        self
    }

    pub fn with_payout(mut self, scope: Option<&str>, payout: Payout) -> Self {
        self.payouts.entry(scope_key(scope)).or_default().push(payout);
        self
    }

    pub fn with_external_account(mut self, account_id: &str, id: &str, bank: BankRef) -> Self {
        self.external_accounts
            .entry(account_id.to_string())
            .or_default()
            .push((id.to_string(), bank));
        self
    }

    /// Forces the account listing to page at `size` regardless of the
    /// caller's limit, to exercise continuation.
    pub fn with_account_page_size(mut self, size: u8) -> Self {
        self.account_page_size = Some(size);
        self
    }

    pub fn failing_account_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn failing_payout_listing(mut self) -> Self {
        self.fail_payouts = true;
        self
    }

    pub fn failing_external_accounts(mut self) -> Self {
        self.fail_external = true;
        self
    }

    /// Payment fetches in `scope` fail with a transport error instead of a
    /// clean not-found.
    pub fn faulty_payment_scope(mut self, scope: Option<&str>) -> Self {
        self.faulty_scopes.push(scope_key(scope));
        self
    }

    /// Scopes probed by `retrieve_payment`, in call order. `None` entries are
    /// platform probes.
    pub async fn probed_scopes(&self) -> Vec<Scope> {
        self.probes.read().await.clone()
    }
}

#[async_trait]
impl PaymentsApi for InMemoryPlatform {
    async fn platform_account(&self) -> Result<AccountProfile, ApiError> {
        Ok(self.platform.clone())
    }

    async fn list_accounts(
        &self,
        limit: u8,
        starting_after: Option<&str>,
    ) -> Result<Page<AccountProfile>, ApiError> {
        if self.fail_listing {
            return Err(ApiError::Transport("account listing unavailable".to_string()));
        }
        let page_size = self.account_page_size.unwrap_or(limit).min(limit) as usize;
        let start = match starting_after {
            Some(cursor) => self
                .connected
                .iter()
                .position(|a| a.id == cursor)
                .map(|i| i + 1)
                .unwrap_or(self.connected.len()),
            None => 0,
        };
        let data: Vec<AccountProfile> = self
            .connected
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();
        let has_more = start + data.len() < self.connected.len();
        Ok(Page { data, has_more })
    }

    async fn retrieve_payment(
        &self,
        payment_id: &str,
        scope: Option<&str>,
    ) -> Result<Payment, ApiError> {
        let key = scope_key(scope);
        self.probes.write().await.push(key.clone());
        if self.faulty_scopes.contains(&key) {
            return Err(ApiError::Transport("connection reset".to_string()));
        }
        self.payments
            .get(&key)
            .and_then(|by_id| by_id.get(payment_id))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(payment_id.to_string()))
    }

    async fn customer_name(
        &self,
        customer_id: &str,
        scope: Option<&str>,
    ) -> Result<Option<String>, ApiError> {
        Ok(self
            .customers
            .get(&(scope_key(scope), customer_id.to_string()))
            .cloned())
    }

    async fn list_payouts(&self, scope: Option<&str>, limit: u8) -> Result<Vec<Payout>, ApiError> {
        if self.fail_payouts {
            return Err(ApiError::Transport("payout listing unavailable".to_string()));
        }
        Ok(self
            .payouts
            .get(&scope_key(scope))
            .map(|p| p.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn external_account(
        &self,
        account_id: &str,
        external_account_id: &str,
    ) -> Result<BankRef, ApiError> {
        if self.fail_external {
            return Err(ApiError::Transport("bank lookup unavailable".to_string()));
        }
        self.external_accounts
            .get(account_id)
            .and_then(|banks| banks.iter().find(|(id, _)| id == external_account_id))
            .map(|(_, bank)| bank.clone())
            .ok_or_else(|| ApiError::NotFound(external_account_id.to_string()))
    }

    async fn list_external_accounts(
        &self,
        account_id: &str,
        limit: u8,
    ) -> Result<Vec<BankRef>, ApiError> {
        if self.fail_external {
            return Err(ApiError::Transport("bank listing unavailable".to_string()));
        }
        Ok(self
            .external_accounts
            .get(account_id)
            .map(|banks| {
                banks
                    .iter()
                    .take(limit as usize)
                    .map(|(_, bank)| bank.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}
