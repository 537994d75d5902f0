use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

use super::types::{OrderResponse, OrderSide, OrderType, TimeInForce};
use super::BinanceFuturesClient;
use crate::ExchangeError;

const ORDER_ENDPOINT: &str = "/fapi/v1/order";

/// 거래소로 보낼 신규 주문 파라미터
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: f64,
    pub price: Option<f64>,
    pub stop_price: Option<f64>,
    pub time_in_force: Option<TimeInForce>,
}

impl NewOrder {
    /// 서명 전 주문 파라미터.
    /// MARKET 주문에는 price/stopPrice/timeInForce를 넣지 않는다.
    pub fn to_params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("symbol", self.symbol.clone());
        params.insert("side", self.side.as_str().to_string());
        params.insert("type", self.order_type.wire_type().to_string());
        params.insert("quantity", self.quantity.to_string());

        if self.order_type.requires_price() {
            if let Some(price) = self.price {
                params.insert("price", price.to_string());
            }
            let tif = self.time_in_force.unwrap_or_default();
            params.insert("timeInForce", tif.as_str().to_string());
        }

        if self.order_type.requires_stop_price() {
            if let Some(stop_price) = self.stop_price {
                params.insert("stopPrice", stop_price.to_string());
            }
        }

        params
    }
}

/// 주문 클라이언트 트레이트. 테스트에서는 가짜 구현체로 바꿔 끼운다.
#[async_trait]
pub trait FuturesOrderClient: Send + Sync {
    async fn place_order(&self, order: &NewOrder) -> Result<OrderResponse, ExchangeError>;
}

impl BinanceFuturesClient {
    /// USDT-M 선물 주문 (`POST /fapi/v1/order`)
    pub async fn place_order(&self, order: &NewOrder) -> Result<OrderResponse, ExchangeError> {
        let data = self
            .signed_request(Method::POST, ORDER_ENDPOINT, order.to_params())
            .await?;

        let order: OrderResponse = serde_json::from_value(data)?;

        info!(
            "place_order response: orderId={:?} status={:?} executedQty={:?} avgPrice={:?}",
            order.order_id, order.status, order.executed_qty, order.avg_price
        );

        Ok(order)
    }
}

#[async_trait]
impl FuturesOrderClient for BinanceFuturesClient {
    async fn place_order(&self, order: &NewOrder) -> Result<OrderResponse, ExchangeError> {
        BinanceFuturesClient::place_order(self, order).await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::binance::{ClientConfig, Credentials};

    fn market_order() -> NewOrder {
        NewOrder {
            symbol: "BTCUSDT".to_string(),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            quantity: 0.01,
            price: Some(60000.0),
            stop_price: Some(59000.0),
            time_in_force: None,
        }
    }

    fn test_client(server: &MockServer) -> BinanceFuturesClient {
        let config = ClientConfig {
            base_url: server.base_url(),
            ..Default::default()
        };
        BinanceFuturesClient::new(Credentials::new("test-key", "test-secret"), config).unwrap()
    }

    #[test]
    fn test_market_params_omit_prices() {
        let params = market_order().to_params();

        assert_eq!(params.get("type").map(String::as_str), Some("MARKET"));
        assert_eq!(params.get("quantity").map(String::as_str), Some("0.01"));
        assert!(!params.contains_key("price"));
        assert!(!params.contains_key("stopPrice"));
        assert!(!params.contains_key("timeInForce"));
    }

    #[test]
    fn test_limit_params() {
        let order = NewOrder {
            order_type: OrderType::Limit,
            stop_price: None,
            ..market_order()
        };
        let params = order.to_params();

        assert_eq!(params.get("type").map(String::as_str), Some("LIMIT"));
        assert_eq!(params.get("price").map(String::as_str), Some("60000"));
        assert_eq!(params.get("timeInForce").map(String::as_str), Some("GTC"));
        assert!(!params.contains_key("stopPrice"));
    }

    #[test]
    fn test_stop_limit_params() {
        let order = NewOrder {
            side: OrderSide::Sell,
            order_type: OrderType::StopLimit,
            time_in_force: Some(TimeInForce::Ioc),
            ..market_order()
        };
        let params = order.to_params();

        assert_eq!(params.get("side").map(String::as_str), Some("SELL"));
        assert_eq!(params.get("type").map(String::as_str), Some("STOP"));
        assert_eq!(params.get("price").map(String::as_str), Some("60000"));
        assert_eq!(params.get("stopPrice").map(String::as_str), Some("59000"));
        assert_eq!(params.get("timeInForce").map(String::as_str), Some("IOC"));
    }

    #[tokio::test]
    async fn test_place_order_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/fapi/v1/order")
                    .header("x-mbx-apikey", "test-key")
                    .query_param("symbol", "BTCUSDT")
                    .query_param("side", "BUY")
                    .query_param("type", "MARKET")
                    .query_param("quantity", "0.01")
                    .query_param("recvWindow", "5000")
                    .query_param_exists("timestamp")
                    .query_param_exists("signature");
                then.status(200).json_body(json!({
                    "orderId": 12345,
                    "symbol": "BTCUSDT",
                    "status": "FILLED",
                    "executedQty": "0.010",
                    "avgPrice": "60123.40",
                    "type": "MARKET",
                    "side": "BUY"
                }));
            })
            .await;

        let client = test_client(&server);
        let order = client.place_order(&market_order()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(order.order_id, Some(12345));
        assert_eq!(order.status.as_deref(), Some("FILLED"));
        assert_eq!(order.executed_qty.as_deref(), Some("0.010"));
        assert_eq!(order.avg_price.as_deref(), Some("60123.40"));
    }

    #[tokio::test]
    async fn test_place_order_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/fapi/v1/order");
                then.status(400)
                    .json_body(json!({"code": -2019, "msg": "Margin is insufficient."}));
            })
            .await;

        let client = test_client(&server);
        let err = client.place_order(&market_order()).await.unwrap_err();

        match err {
            ExchangeError::Api { status, code, msg } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(-2019));
                assert_eq!(msg, "Margin is insufficient.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_place_order_network_error() {
        // 아무도 듣지 않는 포트
        let config = ClientConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let client =
            BinanceFuturesClient::new(Credentials::new("test-key", "test-secret"), config).unwrap();

        let err = client.place_order(&market_order()).await.unwrap_err();
        assert!(err.is_network(), "expected network error, got {:?}", err);
    }
}
