use std::fmt;

use exchanges::binance::{
    FuturesOrderClient, NewOrder, OrderResponse, OrderSide, OrderType, TimeInForce,
};
use exchanges::ExchangeError;
use thiserror::Error;
use tracing::{error, info};

use crate::validate::{validate_order_request, ValidationError};

/// 검증 전 CLI 원본 입력
#[derive(Debug, Clone, Default)]
pub struct OrderInput {
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub quantity: String,
    pub price: Option<String>,
    pub stop_price: Option<String>,
    pub time_in_force: Option<String>,
}

/// 주문 타입별 가격 정보.
/// LIMIT/STOP_LIMIT만 price를, STOP_LIMIT만 stop price를 갖는다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderKind {
    Market,
    Limit {
        price: f64,
        time_in_force: TimeInForce,
    },
    StopLimit {
        price: f64,
        stop_price: f64,
        time_in_force: TimeInForce,
    },
}

/// 검증을 통과한 주문
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: f64,
    pub kind: OrderKind,
}

impl OrderRequest {
    pub fn order_type(&self) -> OrderType {
        match self.kind {
            OrderKind::Market => OrderType::Market,
            OrderKind::Limit { .. } => OrderType::Limit,
            OrderKind::StopLimit { .. } => OrderType::StopLimit,
        }
    }

    pub fn price(&self) -> Option<f64> {
        match self.kind {
            OrderKind::Market => None,
            OrderKind::Limit { price, .. } | OrderKind::StopLimit { price, .. } => Some(price),
        }
    }

    pub fn stop_price(&self) -> Option<f64> {
        match self.kind {
            OrderKind::StopLimit { stop_price, .. } => Some(stop_price),
            _ => None,
        }
    }

    pub fn time_in_force(&self) -> Option<TimeInForce> {
        match self.kind {
            OrderKind::Market => None,
            OrderKind::Limit { time_in_force, .. }
            | OrderKind::StopLimit { time_in_force, .. } => Some(time_in_force),
        }
    }

    /// 거래소 주문 파라미터로 변환
    pub fn to_new_order(&self) -> NewOrder {
        NewOrder {
            symbol: self.symbol.clone(),
            side: self.side,
            order_type: self.order_type(),
            quantity: self.quantity,
            price: self.price(),
            stop_price: self.stop_price(),
            time_in_force: self.time_in_force(),
        }
    }
}

impl fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "symbol={} side={} type={} quantity={}",
            self.symbol,
            self.side,
            self.order_type(),
            self.quantity
        )?;
        if let Some(price) = self.price() {
            write!(f, " price={price}")?;
        }
        if let Some(stop_price) = self.stop_price() {
            write!(f, " stopPrice={stop_price}")?;
        }
        if let Some(tif) = self.time_in_force() {
            write!(f, " timeInForce={tif}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// 입력 검증 → 요청 로그 → 주문 전송.
/// 검증에 실패하면 클라이언트는 호출되지 않는다.
pub async fn place_order_with_validation<C>(
    client: &C,
    input: &OrderInput,
) -> Result<OrderResponse, OrderError>
where
    C: FuturesOrderClient + ?Sized,
{
    let request = validate_order_request(input)
        .inspect_err(|e| error!("Order validation failed: {}", e))?;

    info!("Placing order: {}", request);

    let response = client
        .place_order(&request.to_new_order())
        .await
        .inspect_err(|e| error!("Order placement failed: {}", e))?;

    info!(
        "Order placed successfully: orderId={} status={} executedQty={} avgPrice={}",
        display_or_dash(response.order_id),
        display_or_dash(response.status.as_deref()),
        display_or_dash(response.executed_qty.as_deref()),
        display_or_dash(response.avg_price.as_deref()),
    );

    Ok(response)
}

fn display_or_dash<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn format_order_summary(input: &OrderInput) -> String {
    format!(
        "Symbol: {}, Side: {}, Type: {}, Qty: {}, Price: {}, StopPrice: {}",
        input.symbol,
        input.side,
        input.order_type,
        input.quantity,
        display_or_dash(input.price.as_deref()),
        display_or_dash(input.stop_price.as_deref()),
    )
}

/// 응답 필드 표 (orderId, status, executedQty, avgPrice)
pub fn format_order_response(response: &OrderResponse) -> String {
    let rows = [
        ("orderId", display_or_dash(response.order_id)),
        ("status", display_or_dash(response.status.as_deref())),
        ("executedQty", display_or_dash(response.executed_qty.as_deref())),
        ("avgPrice", display_or_dash(response.avg_price.as_deref())),
    ];

    let mut out = String::from("=== Order Response ===");
    for (field, value) in rows {
        out.push_str(&format!("\n  {:<12} {}", field, value));
    }
    out
}

pub fn print_order_summary(input: &OrderInput) {
    println!("Order request summary");
    println!("{}", format_order_summary(input));
}

pub fn print_order_response(response: &OrderResponse) {
    println!("{}", format_order_response(response));
}
