use common::config::{flag, optional, parse_or, required};
use common::errors::ConfigError;

pub const MAINNET_URL: &str = "https://api.binance.com";
pub const TESTNET_URL: &str = "https://testnet.binance.vision";

#[derive(Clone)]
pub struct BinanceConfig {
    pub api_key: String,
    pub secret_key: String,
    pub base_url: String,
    pub recv_window: u64,
}

impl BinanceConfig {
    /// `BINANCE_BASE_URL` overrides the url picked by `USE_TESTNET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = required("BINANCE_API_KEY")?;
        let secret_key = required("BINANCE_SECRET_KEY")?;

        let base_url = optional("BINANCE_BASE_URL").unwrap_or_else(|| {
            if flag("USE_TESTNET") {
                TESTNET_URL.to_string()
            } else {
                MAINNET_URL.to_string()
            }
        });

        Ok(Self {
            api_key,
            secret_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            recv_window: parse_or("BINANCE_RECV_WINDOW", 5000)?,
        })
    }

    pub fn is_testnet(&self) -> bool {
        self.base_url == TESTNET_URL
    }
}

impl std::fmt::Debug for BinanceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceConfig")
            .field("api_key", &"***")
            .field("secret_key", &"***")
            .field("base_url", &self.base_url)
            .field("recv_window", &self.recv_window)
            .finish()
    }
}
