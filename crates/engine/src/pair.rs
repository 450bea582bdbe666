use common::models::OrderSide;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
}

impl TradingPair {
    /// Accepts `BTC/USDT`, `BTC-USDT`, `BTC_USDT` or a concatenated `BTCUSDT`.
    /// Concatenated symbols are split on the longest matching known quote asset.
    pub fn parse(symbol: &str, quote_assets: &[String]) -> Option<Self> {
        let symbol = symbol.trim().to_ascii_uppercase();

        if let Some((base, quote)) = symbol.split_once(['/', '-', '_']) {
            if is_asset(base) && is_asset(quote) {
                return Some(Self {
                    base: base.to_string(),
                    quote: quote.to_string(),
                });
            }
            return None;
        }

        if !is_asset(&symbol) {
            return None;
        }

        let mut candidates: Vec<String> = quote_assets
            .iter()
            .map(|q| q.to_ascii_uppercase())
            .collect();
        candidates.sort_by_key(|q| std::cmp::Reverse(q.len()));

        candidates.into_iter().find_map(|quote| {
            let base = symbol.strip_suffix(quote.as_str())?;
            is_asset(base).then(|| Self {
                base: base.to_string(),
                quote,
            })
        })
    }

    /// BUY spends quote, SELL spends base.
    pub fn balance_asset(&self, side: OrderSide) -> &str {
        match side {
            OrderSide::Buy => &self.quote,
            OrderSide::Sell => &self.base,
        }
    }
}

fn is_asset(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnginePolicy;

    fn parse(symbol: &str) -> Option<TradingPair> {
        TradingPair::parse(symbol, &EnginePolicy::default().quote_assets)
    }

    fn pair(base: &str, quote: &str) -> Option<TradingPair> {
        Some(TradingPair {
            base: base.into(),
            quote: quote.into(),
        })
    }

    #[test]
    fn test_separated_symbols() {
        assert_eq!(parse("BTC/USDT"), pair("BTC", "USDT"));
        assert_eq!(parse("eth-btc"), pair("ETH", "BTC"));
        assert_eq!(parse(" sol_usdc "), pair("SOL", "USDC"));
        assert_eq!(parse("BTC/"), None);
        assert_eq!(parse("/USDT"), None);
    }

    #[test]
    fn test_concatenated_symbols() {
        assert_eq!(parse("BTCUSDT"), pair("BTC", "USDT"));
        assert_eq!(parse("btcusdt"), pair("BTC", "USDT"));
        assert_eq!(parse("ETHBTC"), pair("ETH", "BTC"));
        // FDUSD must win over a shorter suffix match
        assert_eq!(parse("BNBFDUSD"), pair("BNB", "FDUSD"));
        assert_eq!(parse("USDT"), None);
        assert_eq!(parse("FOOBAR"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_balance_asset_by_side() {
        let pair = parse("BTC/USDT").unwrap();
        assert_eq!(pair.balance_asset(OrderSide::Buy), "USDT");
        assert_eq!(pair.balance_asset(OrderSide::Sell), "BTC");
    }
}
