use std::env;
use std::path::PathBuf;

use exchanges::binance::{API_KEY_VAR, API_SECRET_VAR, DEFAULT_RECV_WINDOW, TESTNET_BASE_URL};
use exchanges::{ClientConfig, Credentials, ExchangeError};
use thiserror::Error;

pub const BASE_URL_VAR: &str = "BINANCE_FUTURES_BASE_URL";
pub const RECV_WINDOW_VAR: &str = "BINANCE_RECV_WINDOW";
pub const LOG_DIR_VAR: &str = "TRADE_LOG_DIR";

pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Credentials(#[from] ExchangeError),
    #[error("BINANCE_RECV_WINDOW must be a positive integer (got '{0}')")]
    InvalidRecvWindow(String),
    #[error("BINANCE_FUTURES_BASE_URL must start with http:// or https:// (got '{0}')")]
    InvalidBaseUrl(String),
}

/// 실행 설정 (credential + 클라이언트 설정)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub client: ClientConfig,
}

impl AppConfig {
    /// 환경변수에서 설정을 읽는다.
    /// .env는 main에서 미리 로드된다.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_vars(lookup(API_KEY_VAR), lookup(API_SECRET_VAR))?;

        let base_url = match lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            Some(url) => {
                let url = url.trim().to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidBaseUrl(url));
                }
                url
            }
            None => TESTNET_BASE_URL.to_string(),
        };

        let recv_window = match lookup(RECV_WINDOW_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(v) if v > 0 => v,
                _ => return Err(ConfigError::InvalidRecvWindow(raw)),
            },
            None => DEFAULT_RECV_WINDOW,
        };

        Ok(Self {
            credentials,
            client: ClientConfig {
                base_url,
                recv_window,
                ..Default::default()
            },
        })
    }
}

/// 로그 디렉터리 (`TRADE_LOG_DIR`, 기본값 `logs`)
pub fn log_dir() -> PathBuf {
    env::var(LOG_DIR_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
}
