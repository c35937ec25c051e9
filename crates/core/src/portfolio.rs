//! Portfolio context: open positions, working orders, and the order being
//! evaluated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::OptionType;

/// Buy or sell side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Broker order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "TRIGGER PENDING")]
    TriggerPending,
    #[serde(rename = "PENDING", alias = "OPEN PENDING", alias = "VALIDATION PENDING")]
    Pending,
    #[serde(rename = "COMPLETE")]
    Complete,
    #[serde(rename = "CANCELLED")]
    Cancelled,
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl OrderStatus {
    /// True while the order can still fill.
    #[must_use]
    pub const fn is_working(self) -> bool {
        matches!(self, Self::Open | Self::TriggerPending | Self::Pending)
    }
}

/// An open position as reported by the broker. `quantity` is signed:
/// positive for long, negative for short, zero once squared off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub tradingsymbol: String,
    pub quantity: i64,
    pub average_price: Decimal,
    pub unrealised_pnl: Decimal,
}

impl Position {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.quantity != 0
    }

    /// Side that opened this position, `None` when flat.
    #[must_use]
    pub const fn side(&self) -> Option<TransactionType> {
        if self.quantity > 0 {
            Some(TransactionType::Buy)
        } else if self.quantity < 0 {
            Some(TransactionType::Sell)
        } else {
            None
        }
    }
}

/// A working or historical order from the order book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    pub tradingsymbol: String,
    pub transaction_type: TransactionType,
    pub quantity: i64,
    pub status: OrderStatus,
}

/// Positions and orders fetched together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub orders: Vec<OpenOrder>,
}

impl PortfolioSnapshot {
    /// Positions with non-zero quantity.
    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.is_open())
    }

    /// Open position on `tradingsymbol`, if any.
    #[must_use]
    pub fn position_for(&self, tradingsymbol: &str) -> Option<&Position> {
        self.open_positions()
            .find(|p| p.tradingsymbol.eq_ignore_ascii_case(tradingsymbol))
    }

    /// Working orders on `tradingsymbol`.
    pub fn working_orders_for<'a>(
        &'a self,
        tradingsymbol: &'a str,
    ) -> impl Iterator<Item = &'a OpenOrder> + 'a {
        self.orders.iter().filter(move |o| {
            o.status.is_working() && o.tradingsymbol.eq_ignore_ascii_case(tradingsymbol)
        })
    }
}

/// The order a trader is about to place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub tradingsymbol: String,
    /// Underlying index or stock, e.g. `NIFTY`.
    pub underlying: String,
    pub transaction_type: TransactionType,
    /// Explicit option type; inferred from the tradingsymbol when absent.
    #[serde(default)]
    pub option_type: Option<OptionType>,
    #[serde(default)]
    pub strike: Option<f64>,
    pub quantity: i64,
}

impl OrderRequest {
    /// Option type of the instrument, `None` for futures and equity.
    #[must_use]
    pub fn resolved_option_type(&self) -> Option<OptionType> {
        self.option_type
            .or_else(|| OptionType::from_tradingsymbol(&self.tradingsymbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(symbol: &str, quantity: i64) -> Position {
        Position {
            tradingsymbol: symbol.to_string(),
            quantity,
            average_price: dec!(100),
            unrealised_pnl: dec!(0),
        }
    }

    #[test]
    fn flat_positions_are_not_open() {
        let portfolio = PortfolioSnapshot {
            positions: vec![position("A", 50), position("B", 0), position("C", -25)],
            orders: vec![],
        };
        assert_eq!(portfolio.open_positions().count(), 2);
        assert!(portfolio.position_for("B").is_none());
        assert_eq!(
            portfolio.position_for("c").and_then(Position::side),
            Some(TransactionType::Sell)
        );
    }

    #[test]
    fn only_working_orders_match() {
        let order = |status| OpenOrder {
            tradingsymbol: "NIFTY24O1725000CE".to_string(),
            transaction_type: TransactionType::Buy,
            quantity: 25,
            status,
        };
        let portfolio = PortfolioSnapshot {
            positions: vec![],
            orders: vec![
                order(OrderStatus::Complete),
                order(OrderStatus::TriggerPending),
                order(OrderStatus::Rejected),
            ],
        };
        assert_eq!(portfolio.working_orders_for("NIFTY24O1725000CE").count(), 1);
    }

    #[test]
    fn order_status_parses_broker_strings() {
        let status: OrderStatus = serde_json::from_str("\"TRIGGER PENDING\"").unwrap();
        assert_eq!(status, OrderStatus::TriggerPending);
        let status: OrderStatus = serde_json::from_str("\"OPEN PENDING\"").unwrap();
        assert!(status.is_working());
    }

    #[test]
    fn option_type_falls_back_to_symbol_suffix() {
        let request = OrderRequest {
            tradingsymbol: "NIFTY24O1725000PE".to_string(),
            underlying: "NIFTY".to_string(),
            transaction_type: TransactionType::Buy,
            option_type: None,
            strike: None,
            quantity: 25,
        };
        assert_eq!(request.resolved_option_type(), Some(OptionType::Put));
    }
}
