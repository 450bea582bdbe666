use common::models::{OrderSide, SignalAction};

use crate::config::EnginePolicy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingError {
    /// Balance below the policy minimum for the side being traded.
    Shortfall { required: f64 },
    /// Sizing produced a quantity that cannot be ordered (zero, negative, NaN or infinite).
    InvalidAmount(f64),
}

impl EnginePolicy {
    /// Side to trade, or `None` for HOLD and for scores that do not clear the threshold.
    pub fn actionable_side(&self, action: SignalAction, score: f64) -> Option<OrderSide> {
        let threshold = self.confidence_threshold;
        match action {
            SignalAction::Buy if score >= threshold => Some(OrderSide::Buy),
            SignalAction::Sell if score <= -threshold => Some(OrderSide::Sell),
            SignalAction::Buy | SignalAction::Sell | SignalAction::Hold => None,
        }
    }

    /// Order amount in base units. `price` must already be validated as positive.
    ///
    /// BUY spends a share of the quote balance (the larger share for small accounts),
    /// SELL exits the whole base position. The result is always positive and finite.
    pub fn size_order(
        &self,
        side: OrderSide,
        balance: f64,
        price: f64,
    ) -> Result<f64, SizingError> {
        let amount = match side {
            OrderSide::Buy => {
                if balance < self.min_quote_balance {
                    return Err(SizingError::Shortfall {
                        required: self.min_quote_balance,
                    });
                }
                let pct = if balance < self.capital_tier_threshold {
                    self.small_account_allocation_pct
                } else {
                    self.large_account_allocation_pct
                };
                let notional = (balance * pct) / 100.0;
                notional / price
            }
            OrderSide::Sell => {
                if balance <= self.dust_threshold {
                    return Err(SizingError::Shortfall {
                        required: self.dust_threshold,
                    });
                }
                balance
            }
        };

        if amount.is_finite() && amount > 0.0 {
            Ok(amount)
        } else {
            Err(SizingError::InvalidAmount(amount))
        }
    }
}

pub fn validate_price(price: f64) -> Result<(), String> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(format!("signal price must be a positive number, got {price}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_weak_signals_are_not_actionable() {
        let policy = EnginePolicy::default();

        assert_eq!(policy.actionable_side(SignalAction::Hold, 0.99), None);
        assert_eq!(policy.actionable_side(SignalAction::Buy, 0.05), None);
        assert_eq!(policy.actionable_side(SignalAction::Buy, -0.9), None);
        assert_eq!(policy.actionable_side(SignalAction::Sell, -0.1), None);
        assert_eq!(policy.actionable_side(SignalAction::Sell, 0.9), None);
    }

    #[test]
    fn test_threshold_boundary_is_actionable() {
        let policy = EnginePolicy::default();

        assert_eq!(
            policy.actionable_side(SignalAction::Buy, 0.15),
            Some(OrderSide::Buy)
        );
        assert_eq!(
            policy.actionable_side(SignalAction::Sell, -0.15),
            Some(OrderSide::Sell)
        );
        assert_eq!(
            policy.actionable_side(SignalAction::Buy, 0.5),
            Some(OrderSide::Buy)
        );
    }

    #[test]
    fn test_buy_sizing_small_account() {
        let amount = EnginePolicy::default()
            .size_order(OrderSide::Buy, 500.0, 50_000.0)
            .unwrap();
        assert!(approx(amount, 0.005), "got {amount}");
    }

    #[test]
    fn test_buy_sizing_large_account() {
        let amount = EnginePolicy::default()
            .size_order(OrderSide::Buy, 5_000.0, 50_000.0)
            .unwrap();
        assert!(approx(amount, 0.01), "got {amount}");
    }

    #[test]
    fn test_buy_tier_boundary_uses_large_account_share() {
        let amount = EnginePolicy::default()
            .size_order(OrderSide::Buy, 1_000.0, 100.0)
            .unwrap();
        assert!(approx(amount, 1.0), "got {amount}");
    }

    #[test]
    fn test_buy_below_minimum() {
        let policy = EnginePolicy::default();

        assert_eq!(
            policy.size_order(OrderSide::Buy, 9.99, 50_000.0),
            Err(SizingError::Shortfall { required: 10.0 })
        );
        assert!(policy.size_order(OrderSide::Buy, 10.0, 50_000.0).is_ok());
    }

    #[test]
    fn test_sell_exits_full_balance() {
        let policy = EnginePolicy::default();

        assert_eq!(policy.size_order(OrderSide::Sell, 0.05, 50_000.0), Ok(0.05));
        assert_eq!(
            policy.size_order(OrderSide::Sell, 0.0001, 50_000.0),
            Err(SizingError::Shortfall { required: 0.0001 })
        );
        assert!(policy.size_order(OrderSide::Sell, 0.00005, 50_000.0).is_err());
    }

    #[test]
    fn test_sizing_is_deterministic() {
        let policy = EnginePolicy::default();
        let first = policy.size_order(OrderSide::Buy, 1234.56, 321.0).unwrap();
        for _ in 0..10 {
            assert_eq!(policy.size_order(OrderSide::Buy, 1234.56, 321.0).unwrap(), first);
        }
    }

    #[test]
    fn test_tiny_price_cannot_produce_infinite_amount() {
        let policy = EnginePolicy::default();

        assert!(validate_price(1e-308).is_ok());
        assert!(matches!(
            policy.size_order(OrderSide::Buy, 500.0, 1e-308),
            Err(SizingError::InvalidAmount(amount)) if amount.is_infinite()
        ));
    }

    #[test]
    fn test_non_finite_balance_is_not_sized() {
        let policy = EnginePolicy::default();

        assert!(matches!(
            policy.size_order(OrderSide::Sell, f64::INFINITY, 50_000.0),
            Err(SizingError::InvalidAmount(_))
        ));
        assert!(matches!(
            policy.size_order(OrderSide::Buy, f64::INFINITY, 50_000.0),
            Err(SizingError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(50_000.0).is_ok());
        assert!(validate_price(0.0).is_err());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }
}
