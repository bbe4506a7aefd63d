use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Runtime configuration, threaded explicitly through the directory, resolver
/// and correlator instead of living in module-level state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret API key. `None` degrades bank/transfer enrichment to empty
    /// fields; the `map` stage refuses to run without it.
    pub api_key: Option<String>,
    pub api_base: String,
    /// How many recent payouts to scan when correlating a settlement.
    /// Older payouts are invisible to the correlator; accepted limitation.
    pub payout_search_limit: u8,
    /// Tolerance between a settlement's availability and a payout's arrival.
    pub correlation_window: Duration,
    /// Pause between per-payment enrichment calls (crude rate limiting).
    pub enrich_delay: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let api_key = std::env::var("STRIPE_SECRET_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        let api_base =
            std::env::var("STRIPE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self {
            api_key,
            api_base,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            payout_search_limit: 20,
            correlation_window: Duration::from_secs(3 * 86_400),
            enrich_delay: Duration::from_millis(100),
        }
    }
}
