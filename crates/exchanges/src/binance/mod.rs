use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;
use tracing::{error, info};

use super::ExchangeError;

pub mod order;
pub mod types;

pub use order::{FuturesOrderClient, NewOrder};
pub use types::{OrderResponse, OrderSide, OrderType, TimeInForce};

pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";
pub const DEFAULT_RECV_WINDOW: u64 = 5_000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const API_KEY_VAR: &str = "BINANCE_API_KEY";
pub const API_SECRET_VAR: &str = "BINANCE_API_SECRET";

const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// API 키/시크릿. Debug 출력에서 시크릿은 가린다.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// `BINANCE_API_KEY` / `BINANCE_API_SECRET` 값으로 생성. 비어 있으면 에러.
    pub fn from_vars(
        api_key: Option<String>,
        api_secret: Option<String>,
    ) -> Result<Self, ExchangeError> {
        let api_key = non_empty(api_key).ok_or_else(|| missing_var(API_KEY_VAR))?;
        let api_secret = non_empty(api_secret).ok_or_else(|| missing_var(API_SECRET_VAR))?;
        Ok(Self::new(api_key, api_secret))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn missing_var(name: &str) -> ExchangeError {
    ExchangeError::Credentials(format!(
        "{name} must be set (e.g. in a .env file or the environment)"
    ))
}

/// 클라이언트 설정
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub recv_window: u64,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: TESTNET_BASE_URL.to_string(),
            recv_window: DEFAULT_RECV_WINDOW,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Binance USDT-M Futures 클라이언트 (서명이 필요한 주문 API 전용)
pub struct BinanceFuturesClient {
    http: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    recv_window: u64,
}

impl BinanceFuturesClient {
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self, ExchangeError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            credentials,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            recv_window: config.recv_window,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 서명된 요청을 보내고 JSON 본문을 돌려준다.
    /// `recvWindow`, `timestamp`, `signature`는 여기서 붙인다.
    pub(crate) async fn signed_request(
        &self,
        method: Method,
        path: &str,
        mut params: BTreeMap<&'static str, String>,
    ) -> Result<serde_json::Value, ExchangeError> {
        params.insert("recvWindow", self.recv_window.to_string());

        let (query_string, signed_query) = self.sign_params(params, get_timestamp());
        let url = format!("{}{}", self.base_url, path);

        // 시크릿/서명은 로그에 남기지 않는다
        info!("Sending request to Binance: {} {}?{}", method, url, query_string);

        let response = self
            .http
            .request(method, format!("{url}?{signed_query}"))
            .header(API_KEY_HEADER, self.credentials.api_key())
            .send()
            .await
            .inspect_err(|e| error!("Network error during Binance request: {}", e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .inspect_err(|e| error!("Network error while reading Binance response: {}", e))?;

        info!(
            "Received response from Binance: status={} body={}",
            status.as_u16(),
            response_text
        );

        parse_response(status.as_u16(), &response_text)
    }

    /// `timestamp`를 붙여 서명한다.
    /// (서명 전 쿼리, `signature`까지 붙은 쿼리)를 돌려준다.
    pub(crate) fn sign_params(
        &self,
        mut params: BTreeMap<&'static str, String>,
        timestamp: u64,
    ) -> (String, String) {
        params.insert("timestamp", timestamp.to_string());

        let query_string = build_query_string(&params);
        let signature = generate_signature(&query_string, &self.credentials.api_secret);
        let signed_query = format!("{query_string}&signature={signature}");
        (query_string, signed_query)
    }
}

/// 응답 본문을 해석한다.
/// 4xx/5xx, 그리고 200 응답이라도 0이 아닌 `code`가 있으면 에러로 본다.
pub(crate) fn parse_response(status: u16, body: &str) -> Result<serde_json::Value, ExchangeError> {
    let data: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => {
            return Err(ExchangeError::Api {
                status,
                code: None,
                msg: format!(
                    "Non-JSON response: {}",
                    body.chars().take(200).collect::<String>()
                ),
            });
        }
    };

    let code = data.get("code").and_then(|v| v.as_i64());
    let msg = || {
        data.get("msg")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.chars().take(200).collect())
    };

    if status >= 400 {
        return Err(ExchangeError::Api {
            status,
            code,
            msg: msg(),
        });
    }

    if let Some(code) = code.filter(|c| *c != 0) {
        return Err(ExchangeError::Api {
            status,
            code: Some(code),
            msg: msg(),
        });
    }

    Ok(data)
}

/// 파라미터를 키 순서대로 `k=v&...` 형태로 이어 붙인다.
pub fn build_query_string(params: &BTreeMap<&'static str, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

type HmacSha256 = Hmac<Sha256>;

/// Binance API 서명 생성
/// query_string: 쿼리 파라미터 문자열 (예: "symbol=BTCUSDT&timestamp=1234567890")
/// api_secret: API Secret Key
pub fn generate_signature(query_string: &str, api_secret: &str) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(api_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(query_string.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// 타임스탬프 생성 (밀리초)
pub fn get_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
