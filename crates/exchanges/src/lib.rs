use thiserror::Error;

pub mod binance;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// 거래소가 거절한 요청 (HTTP 4xx/5xx, 또는 200 응답 안의 에러 코드)
    #[error("Binance API error (status {status}, code {}): {msg}", code_label(.code))]
    Api {
        status: u16,
        code: Option<i64>,
        msg: String,
    },
    #[error("credentials error: {0}")]
    Credentials(String),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ExchangeError {
    /// 네트워크/전송 계층 에러 여부
    pub fn is_network(&self) -> bool {
        matches!(self, ExchangeError::Http(_))
    }
}

fn code_label(code: &Option<i64>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "none".to_string(),
    }
}

// Convenience re-exports
pub use binance::{BinanceFuturesClient, ClientConfig, Credentials, FuturesOrderClient};
