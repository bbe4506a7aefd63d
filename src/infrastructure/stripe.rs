//! `reqwest`-backed implementation of [`PaymentsApi`] against the Stripe REST
//! API. Connected-account scoping rides on the `Stripe-Account` header; the
//! settlement is pulled alongside the payment via
//! `expand[]=latest_charge.balance_transaction`.

use crate::config::Config;
use crate::domain::account::{AccountProfile, BankRef};
use crate::domain::payment::{
    Payment, PaymentStatus, Payout, SettlementStatus, SettlementTransaction,
};
use crate::domain::ports::{Page, PaymentsApi};
use crate::error::{ApiError, Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

const EXPAND_SETTLEMENT: &str = "latest_charge.balance_transaction";

pub struct StripeClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl StripeClient {
    /// Fails when the configuration carries no API key.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("STRIPE_SECRET_KEY is not set".to_string()))?;
        Ok(Self {
            http: Client::new(),
            base_url: config.api_base.clone(),
            api_key,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        scope: Option<&str>,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url).bearer_auth(&self.api_key).query(query);
        if let Some(account) = scope {
            request = request.header("Stripe-Account", account);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap_or_default();
        let code = envelope.error.code.unwrap_or_else(|| status.as_u16().to_string());
        let message = envelope
            .error
            .message
            .unwrap_or_else(|| format!("GET {path} failed with {status}"));
        if status == reqwest::StatusCode::NOT_FOUND || code == "resource_missing" {
            Err(ApiError::NotFound(message))
        } else {
            Err(ApiError::Api { code, message })
        }
    }
}

#[async_trait]
impl PaymentsApi for StripeClient {
    async fn platform_account(&self) -> Result<AccountProfile, ApiError> {
        let dto: AccountDto = self.get("/v1/account", None, &[]).await?;
        Ok(dto.into())
    }

    async fn list_accounts(
        &self,
        limit: u8,
        starting_after: Option<&str>,
    ) -> Result<Page<AccountProfile>, ApiError> {
        let limit = limit.to_string();
        let mut query: Vec<(&str, &str)> = vec![("limit", limit.as_str())];
        if let Some(cursor) = starting_after {
            query.push(("starting_after", cursor));
        }
        let dto: ListDto<AccountDto> = self.get("/v1/accounts", None, &query).await?;
        Ok(Page {
            data: dto.data.into_iter().map(Into::into).collect(),
            has_more: dto.has_more,
        })
    }

    async fn retrieve_payment(
        &self,
        payment_id: &str,
        scope: Option<&str>,
    ) -> Result<Payment, ApiError> {
        let path = format!("/v1/payment_intents/{payment_id}");
        let dto: PaymentIntentDto = self
            .get(&path, scope, &[("expand[]", EXPAND_SETTLEMENT)])
            .await?;
        Ok(dto.into())
    }

    async fn customer_name(
        &self,
        customer_id: &str,
        scope: Option<&str>,
    ) -> Result<Option<String>, ApiError> {
        let path = format!("/v1/customers/{customer_id}");
        let dto: CustomerDto = self.get(&path, scope, &[]).await?;
        Ok(dto.name.or(dto.email).filter(|s| !s.is_empty()))
    }

    async fn list_payouts(&self, scope: Option<&str>, limit: u8) -> Result<Vec<Payout>, ApiError> {
        let limit = limit.to_string();
        let dto: ListDto<PayoutDto> = self
            .get("/v1/payouts", scope, &[("limit", limit.as_str())])
            .await?;
        Ok(dto.data.into_iter().map(Into::into).collect())
    }

    async fn external_account(
        &self,
        account_id: &str,
        external_account_id: &str,
    ) -> Result<BankRef, ApiError> {
        let path = format!("/v1/accounts/{account_id}/external_accounts/{external_account_id}");
        let dto: ExternalAccountDto = self.get(&path, None, &[]).await?;
        dto.into_bank()
            .ok_or_else(|| ApiError::NotFound(external_account_id.to_string()))
    }

    async fn list_external_accounts(
        &self,
        account_id: &str,
        limit: u8,
    ) -> Result<Vec<BankRef>, ApiError> {
        let limit = limit.to_string();
        let path = format!("/v1/accounts/{account_id}/external_accounts");
        let dto: ListDto<ExternalAccountDto> =
            self.get(&path, None, &[("limit", limit.as_str())]).await?;
        Ok(dto
            .data
            .into_iter()
            .filter_map(ExternalAccountDto::into_bank)
            .collect())
    }
}

fn instant(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Fields that arrive either as a bare id or as an expanded object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Expandable<T> {
    Object(T),
    Id(String),
}

impl<T> Expandable<T> {
    fn object(self) -> Option<T> {
        match self {
            Expandable::Object(object) => Some(object),
            Expandable::Id(_) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListDto<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct AccountDto {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    business_profile: Option<BusinessProfileDto>,
}

#[derive(Debug, Default, Deserialize)]
struct BusinessProfileDto {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    support_email: Option<String>,
}

impl From<AccountDto> for AccountProfile {
    fn from(dto: AccountDto) -> Self {
        let profile = dto.business_profile.unwrap_or_default();
        AccountProfile {
            id: dto.id,
            email: dto.email.filter(|s| !s.is_empty()),
            business_name: profile.name.filter(|s| !s.is_empty()),
            business_support_email: profile.support_email.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PaymentIntentDto {
    id: String,
    amount: i64,
    currency: String,
    status: PaymentStatus,
    created: i64,
    #[serde(default)]
    customer: Option<Expandable<CustomerDto>>,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default)]
    latest_charge: Option<Expandable<ChargeDto>>,
}

#[derive(Debug, Deserialize)]
struct ChargeDto {
    #[serde(default)]
    balance_transaction: Option<Expandable<BalanceTransactionDto>>,
}

#[derive(Debug, Deserialize)]
struct BalanceTransactionDto {
    id: String,
    #[serde(default)]
    status: Option<SettlementStatus>,
    #[serde(default)]
    available_on: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CustomerDto {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl From<PaymentIntentDto> for Payment {
    fn from(dto: PaymentIntentDto) -> Self {
        let settlement = dto
            .latest_charge
            .and_then(Expandable::object)
            .and_then(|charge| charge.balance_transaction)
            .and_then(Expandable::object)
            .map(|bt| SettlementTransaction {
                id: bt.id,
                status: bt.status.unwrap_or(SettlementStatus::Unknown),
                available_on: bt.available_on.map(instant),
            });
        let customer_id = dto.customer.and_then(|c| match c {
            Expandable::Id(id) => Some(id),
            Expandable::Object(customer) => customer.id,
        });
        Payment {
            id: dto.id,
            amount_minor: dto.amount,
            currency: dto.currency.to_uppercase(),
            status: dto.status,
            created_at: instant(dto.created),
            customer_id,
            metadata: dto.metadata,
            settlement,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PayoutDto {
    id: String,
    arrival_date: i64,
    #[serde(default)]
    destination: Option<serde_json::Value>,
}

impl From<PayoutDto> for Payout {
    fn from(dto: PayoutDto) -> Self {
        let destination = dto.destination.and_then(|d| match d {
            serde_json::Value::String(id) => Some(id),
            serde_json::Value::Object(object) => object
                .get("id")
                .and_then(|id| id.as_str())
                .map(str::to_string),
            _ => None,
        });
        Payout {
            id: dto.id,
            arrival_at: instant(dto.arrival_date),
            destination,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExternalAccountDto {
    #[serde(default)]
    bank_name: Option<String>,
    #[serde(default)]
    last4: Option<String>,
}

impl ExternalAccountDto {
    /// Card destinations carry no `bank_name` and are not bank references.
    fn into_bank(self) -> Option<BankRef> {
        let bank_name = self.bank_name.filter(|s| !s.is_empty())?;
        Some(BankRef {
            bank_name,
            last4: self.last4.unwrap_or_else(|| "****".to_string()),
        })
    }
}
