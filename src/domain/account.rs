use serde::{Deserialize, Serialize};
use std::fmt;

/// A platform or connected account, as returned by the account listing.
///
/// Identity is `id`. `is_platform` decides how API calls are scoped: platform
/// fetches carry no account scoping, connected fetches are scoped to `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: String,
    pub display_name: String,
    pub is_platform: bool,
}

impl AccountRef {
    /// Scoping context for API calls against this account: `None` targets the
    /// platform namespace, `Some(id)` a connected account's.
    pub fn scope(&self) -> Option<&str> {
        if self.is_platform {
            None
        } else {
            Some(&self.id)
        }
    }
}

/// Raw account fields needed to build an [`AccountRef`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountProfile {
    pub id: String,
    pub email: Option<String>,
    pub business_name: Option<String>,
    pub business_support_email: Option<String>,
}

impl AccountProfile {
    /// Display name fallback chain: business profile name, business profile
    /// support email, account email, then the literal "Unknown".
    pub fn display_name(&self) -> String {
        self.business_name
            .clone()
            .or_else(|| self.business_support_email.clone())
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn into_account_ref(self, is_platform: bool) -> AccountRef {
        let display_name = self.display_name();
        AccountRef {
            id: self.id,
            display_name,
            is_platform,
        }
    }
}

/// A bank destination registered against an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankRef {
    pub bank_name: String,
    pub last4: String,
}

impl fmt::Display for BankRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \u{2022}\u{2022}\u{2022}\u{2022} {}", self.bank_name, self.last4)
    }
}
