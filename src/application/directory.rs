use crate::domain::account::AccountRef;
use crate::domain::ports::PaymentsApi;
use crate::error::ApiError;

/// Page cap for one account-listing call.
pub const ACCOUNT_PAGE_LIMIT: u8 = 100;

/// Enumerates the platform account and every connected account under it.
pub struct AccountDirectory<'a> {
    api: &'a dyn PaymentsApi,
}

impl<'a> AccountDirectory<'a> {
    pub fn new(api: &'a dyn PaymentsApi) -> Self {
        Self { api }
    }

    pub async fn platform(&self) -> Result<AccountRef, ApiError> {
        let profile = self.api.platform_account().await?;
        Ok(profile.into_account_ref(true))
    }

    /// All connected accounts, in listing order. Pagination is transparent:
    /// pages of [`ACCOUNT_PAGE_LIMIT`] are followed until the platform reports
    /// no more.
    pub async fn connected(&self) -> Result<Vec<AccountRef>, ApiError> {
        let mut accounts = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .api
                .list_accounts(ACCOUNT_PAGE_LIMIT, cursor.as_deref())
                .await?;
            let last_id = page.data.last().map(|a| a.id.clone());
            accounts.extend(page.data.into_iter().map(|p| p.into_account_ref(false)));
            if !page.has_more {
                break;
            }
            match last_id {
                Some(id) => cursor = Some(id),
                // An empty page claiming more would loop forever.
                None => break,
            }
        }
        Ok(accounts)
    }
}
