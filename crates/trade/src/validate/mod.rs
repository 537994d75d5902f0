//! CLI 입력 검증
//!
//! 네트워크 호출 전에 모든 필드를 정규화/검증하고 `OrderRequest`를 만든다.
//! 여기서 실패하면 주문은 거래소로 나가지 않는다.

use exchanges::binance::{OrderSide, OrderType, TimeInForce};
use thiserror::Error;
use tracing::warn;

use crate::order::{OrderInput, OrderKind, OrderRequest};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Symbol must not be empty.")]
    EmptySymbol,
    #[error("Symbol must contain only letters and digits, with an optional single '_' suffix (got '{0}').")]
    InvalidSymbol(String),
    #[error("Side must be either BUY or SELL (got '{0}').")]
    InvalidSide(String),
    #[error("Order type must be one of: MARKET, LIMIT, STOP_LIMIT (got '{0}').")]
    InvalidOrderType(String),
    #[error("Time in force must be one of: GTC, IOC, FOK (got '{0}').")]
    InvalidTimeInForce(String),
    #[error("{field} must be a number (got '{value}').")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be greater than 0 (got '{value}').")]
    NotPositive { field: &'static str, value: String },
    #[error("Price is required for {0} orders.")]
    MissingPrice(OrderType),
    #[error("Stop price is required for STOP_LIMIT orders.")]
    MissingStopPrice,
}

pub fn normalize_symbol(symbol: &str) -> Result<String, ValidationError> {
    let s = symbol.trim().to_ascii_uppercase();
    if s.is_empty() {
        return Err(ValidationError::EmptySymbol);
    }
    if !is_valid_symbol(&s) {
        return Err(ValidationError::InvalidSymbol(symbol.to_string()));
    }
    Ok(s)
}

/// `BTCUSDT`, 또는 분기 선물처럼 `_` 하나로 만기를 붙인 `BTCUSDT_250926`
fn is_valid_symbol(s: &str) -> bool {
    let parts: Vec<&str> = s.split('_').collect();
    parts.len() <= 2
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

pub fn parse_side(side: &str) -> Result<OrderSide, ValidationError> {
    side.parse()
        .map_err(|_| ValidationError::InvalidSide(side.to_string()))
}

pub fn parse_order_type(order_type: &str) -> Result<OrderType, ValidationError> {
    order_type
        .parse()
        .map_err(|_| ValidationError::InvalidOrderType(order_type.to_string()))
}

pub fn parse_time_in_force(tif: &str) -> Result<TimeInForce, ValidationError> {
    tif.parse()
        .map_err(|_| ValidationError::InvalidTimeInForce(tif.to_string()))
}

/// 양수 숫자 검증. NaN/inf도 숫자로 보지 않는다.
pub fn parse_positive(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw
        .trim()
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })?;

    if value <= 0.0 {
        return Err(ValidationError::NotPositive {
            field,
            value: raw.to_string(),
        });
    }

    Ok(value)
}

fn parse_optional(field: &'static str, raw: Option<&str>) -> Result<Option<f64>, ValidationError> {
    raw.map(|r| parse_positive(field, r)).transpose()
}

/// 모든 주문 필드를 검증하고 정규화된 `OrderRequest`를 돌려준다.
///
/// - LIMIT: price 필수
/// - STOP_LIMIT: price, stop price 필수
/// - 해당 타입에서 쓰지 않는 price/stop price는 버린다 (경고 로그만 남김)
pub fn validate_order_request(input: &OrderInput) -> Result<OrderRequest, ValidationError> {
    let symbol = normalize_symbol(&input.symbol)?;
    let side = parse_side(&input.side)?;
    let order_type = parse_order_type(&input.order_type)?;
    let quantity = parse_positive("Quantity", &input.quantity)?;
    let price = parse_optional("Price", input.price.as_deref())?;
    let stop_price = parse_optional("Stop price", input.stop_price.as_deref())?;
    let time_in_force = input
        .time_in_force
        .as_deref()
        .map(parse_time_in_force)
        .transpose()?
        .unwrap_or_default();

    let kind = match order_type {
        OrderType::Market => {
            if price.is_some() || stop_price.is_some() {
                warn!("Ignoring price/stop price for MARKET order");
            }
            OrderKind::Market
        }
        OrderType::Limit => {
            let price = price.ok_or(ValidationError::MissingPrice(order_type))?;
            if stop_price.is_some() {
                warn!("Ignoring stop price for LIMIT order");
            }
            OrderKind::Limit {
                price,
                time_in_force,
            }
        }
        OrderType::StopLimit => {
            let price = price.ok_or(ValidationError::MissingPrice(order_type))?;
            let stop_price = stop_price.ok_or(ValidationError::MissingStopPrice)?;
            OrderKind::StopLimit {
                price,
                stop_price,
                time_in_force,
            }
        }
    };

    Ok(OrderRequest {
        symbol,
        side,
        quantity,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(order_type: &str, price: Option<&str>, stop_price: Option<&str>) -> OrderInput {
        OrderInput {
            symbol: "btcusdt".to_string(),
            side: "buy".to_string(),
            order_type: order_type.to_string(),
            quantity: "0.01".to_string(),
            price: price.map(str::to_string),
            stop_price: stop_price.map(str::to_string),
            time_in_force: None,
        }
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("  btcusdt ").unwrap(), "BTCUSDT");
        assert_eq!(normalize_symbol("   "), Err(ValidationError::EmptySymbol));
        assert!(matches!(
            normalize_symbol("BTC/USDT"),
            Err(ValidationError::InvalidSymbol(_))
        ));
    }

    #[test]
    fn test_normalize_delivery_symbol() {
        assert_eq!(normalize_symbol("btcusdt_250926").unwrap(), "BTCUSDT_250926");

        for bad in ["_BTC", "BTC_", "BTC__X", "BTC_USDT_250926", "BTC-USDT"] {
            assert!(
                matches!(normalize_symbol(bad), Err(ValidationError::InvalidSymbol(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_side_and_type() {
        assert_eq!(parse_side("sell").unwrap(), OrderSide::Sell);
        assert!(matches!(parse_side("long"), Err(ValidationError::InvalidSide(_))));
        assert_eq!(parse_order_type("stop_limit").unwrap(), OrderType::StopLimit);
        assert!(matches!(
            parse_order_type("TAKE_PROFIT"),
            Err(ValidationError::InvalidOrderType(_))
        ));
    }

    #[test]
    fn test_parse_positive_rejects_bad_numbers() {
        assert_eq!(parse_positive("Quantity", "0.5").unwrap(), 0.5);

        for raw in ["abc", "", "NaN", "inf", "1,5"] {
            assert!(
                matches!(
                    parse_positive("Quantity", raw),
                    Err(ValidationError::NotANumber { .. })
                ),
                "{raw} should be rejected as non-numeric"
            );
        }

        for raw in ["0", "-1", "-0.0001", "0.0"] {
            assert!(
                matches!(
                    parse_positive("Quantity", raw),
                    Err(ValidationError::NotPositive { .. })
                ),
                "{raw} should be rejected as non-positive"
            );
        }
    }

    #[test]
    fn test_limit_requires_price() {
        let err = validate_order_request(&input("LIMIT", None, None)).unwrap_err();
        assert_eq!(err, ValidationError::MissingPrice(OrderType::Limit));
        assert_eq!(err.to_string(), "Price is required for LIMIT orders.");
    }

    #[test]
    fn test_stop_limit_requires_price_and_stop_price() {
        let err = validate_order_request(&input("STOP_LIMIT", None, Some("100"))).unwrap_err();
        assert_eq!(err, ValidationError::MissingPrice(OrderType::StopLimit));

        let err = validate_order_request(&input("STOP_LIMIT", Some("100"), None)).unwrap_err();
        assert_eq!(err, ValidationError::MissingStopPrice);
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let err = validate_order_request(&input("LIMIT", Some("-5"), None)).unwrap_err();
        assert!(matches!(err, ValidationError::NotPositive { field: "Price", .. }));

        let err =
            validate_order_request(&input("STOP_LIMIT", Some("100"), Some("0"))).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NotPositive {
                field: "Stop price",
                ..
            }
        ));
    }

    #[test]
    fn test_market_drops_prices() {
        let req = validate_order_request(&input("market", Some("100"), Some("90"))).unwrap();
        assert_eq!(req.symbol, "BTCUSDT");
        assert_eq!(req.side, OrderSide::Buy);
        assert_eq!(req.kind, OrderKind::Market);
        assert_eq!(req.price(), None);
        assert_eq!(req.stop_price(), None);
    }

    #[test]
    fn test_stop_limit_ok() {
        let mut raw = input("STOP_LIMIT", Some("61000"), Some("60500"));
        raw.time_in_force = Some("fok".to_string());

        let req = validate_order_request(&raw).unwrap();
        assert_eq!(
            req.kind,
            OrderKind::StopLimit {
                price: 61000.0,
                stop_price: 60500.0,
                time_in_force: TimeInForce::Fok,
            }
        );
    }

    #[test]
    fn test_invalid_time_in_force() {
        let mut raw = input("LIMIT", Some("100"), None);
        raw.time_in_force = Some("DAY".to_string());
        assert!(matches!(
            validate_order_request(&raw),
            Err(ValidationError::InvalidTimeInForce(_))
        ));
    }
}
