use common::config::{optional, parse_or};
use common::errors::ConfigError;

const DEFAULT_QUOTE_ASSETS: &[&str] = &[
    "USDT", "USDC", "FDUSD", "BUSD", "TUSD", "DAI", "BTC", "ETH", "BNB", "EUR", "TRY",
];

/// Trading policy applied by the signal service. Defaults are the live settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EnginePolicy {
    /// Minimum |score| for a BUY/SELL to be acted upon.
    pub confidence_threshold: f64,
    /// Quote balance required before any BUY.
    pub min_quote_balance: f64,
    /// Accounts below this quote balance are sized with `small_account_allocation_pct`.
    pub capital_tier_threshold: f64,
    pub large_account_allocation_pct: f64,
    pub small_account_allocation_pct: f64,
    /// A SELL needs strictly more base balance than this.
    pub dust_threshold: f64,
    /// Quote assets recognised when splitting concatenated symbols like `BTCUSDT`.
    pub quote_assets: Vec<String>,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.15,
            min_quote_balance: 10.0,
            capital_tier_threshold: 1000.0,
            large_account_allocation_pct: 10.0,
            small_account_allocation_pct: 50.0,
            dust_threshold: 0.0001,
            quote_assets: DEFAULT_QUOTE_ASSETS.iter().map(|q| q.to_string()).collect(),
        }
    }
}

impl EnginePolicy {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let policy = Self {
            confidence_threshold: parse_or("SIGNAL_THRESHOLD", defaults.confidence_threshold)?,
            min_quote_balance: parse_or("MIN_QUOTE_BALANCE", defaults.min_quote_balance)?,
            capital_tier_threshold: parse_or(
                "CAPITAL_TIER_THRESHOLD",
                defaults.capital_tier_threshold,
            )?,
            large_account_allocation_pct: parse_or(
                "LARGE_ACCOUNT_PCT",
                defaults.large_account_allocation_pct,
            )?,
            small_account_allocation_pct: parse_or(
                "SMALL_ACCOUNT_PCT",
                defaults.small_account_allocation_pct,
            )?,
            dust_threshold: parse_or("DUST_THRESHOLD", defaults.dust_threshold)?,
            quote_assets: optional("QUOTE_ASSETS")
                .map(|raw| parse_quote_assets(&raw))
                .unwrap_or(defaults.quote_assets),
        };

        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check("SIGNAL_THRESHOLD", self.confidence_threshold, |v| {
            (0.0..=1.0).contains(&v)
        })?;
        check("MIN_QUOTE_BALANCE", self.min_quote_balance, |v| v >= 0.0)?;
        check("CAPITAL_TIER_THRESHOLD", self.capital_tier_threshold, |v| v >= 0.0)?;
        check("LARGE_ACCOUNT_PCT", self.large_account_allocation_pct, |v| {
            v > 0.0 && v <= 100.0
        })?;
        check("SMALL_ACCOUNT_PCT", self.small_account_allocation_pct, |v| {
            v > 0.0 && v <= 100.0
        })?;
        check("DUST_THRESHOLD", self.dust_threshold, |v| v >= 0.0)?;

        if self.quote_assets.is_empty() {
            return Err(ConfigError::Invalid {
                var: "QUOTE_ASSETS".to_string(),
                value: String::new(),
            });
        }
        Ok(())
    }
}

fn check(var: &str, value: f64, ok: impl Fn(f64) -> bool) -> Result<(), ConfigError> {
    if value.is_finite() && ok(value) {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        var: var.to_string(),
        value: value.to_string(),
    })
}

fn parse_quote_assets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|q| q.trim().to_ascii_uppercase())
        .filter(|q| !q.is_empty())
        .collect()
}
