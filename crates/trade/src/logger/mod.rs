use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILE: &str = "trading_bot.log";

/// 보관할 로그 파일 수. tracing-appender는 현재 파일도 센다 (이전 파일 3개 + 현재 파일)
const MAX_LOG_FILES: usize = 4;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("log file must be a plain file name inside the log directory (got '{0}')")]
    InvalidFileName(String),
    #[error("failed to create log directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to open log file: {0}")]
    Appender(#[from] InitError),
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Tracing guards를 보관하는 구조체
/// 이 구조체가 drop되기 전까지 로깅이 계속 작동합니다
pub struct TracingGuards {
    _file: non_blocking::WorkerGuard,
    _stdout: non_blocking::WorkerGuard,
}

/// 로그 파일 위치
#[derive(Debug, Clone, PartialEq)]
pub struct LogOptions {
    pub dir: PathBuf,
    pub prefix: String,
    pub suffix: Option<String>,
}

impl LogOptions {
    /// `--log-file` 값은 디렉터리 안의 파일 이름으로만 받는다.
    /// `trading_bot.log` → prefix `trading_bot`, suffix `log`
    pub fn new(dir: impl Into<PathBuf>, log_file: Option<&str>) -> Result<Self, LoggerError> {
        let name = log_file.map(str::trim).unwrap_or(DEFAULT_LOG_FILE);

        let path = Path::new(name);
        let is_plain = !name.is_empty()
            && path.file_name().and_then(|f| f.to_str()) == Some(name)
            && !name.starts_with('.');
        if !is_plain {
            return Err(LoggerError::InvalidFileName(name.to_string()));
        }

        let (prefix, suffix) = match (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|s| s.to_str()),
        ) {
            (Some(stem), Some(ext)) => (stem.to_string(), Some(ext.to_string())),
            _ => (name.to_string(), None),
        };

        Ok(Self {
            dir: dir.into(),
            prefix,
            suffix,
        })
    }

    fn file_appender(&self) -> Result<RollingFileAppender, LoggerError> {
        fs::create_dir_all(&self.dir)?;

        let mut builder = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(self.prefix.as_str())
            .max_log_files(MAX_LOG_FILES);
        if let Some(suffix) = &self.suffix {
            builder = builder.filename_suffix(suffix.as_str());
        }

        Ok(builder.build(&self.dir)?)
    }
}

/// Tracing 초기화
/// 파일 로깅과 stdout 로깅을 모두 설정합니다
/// (파일은 `logs/trading_bot.2025-11-29.log` 처럼 날짜별로 회전)
pub fn init_tracing(options: &LogOptions) -> Result<TracingGuards, LoggerError> {
    // 1) 파일 appender
    let (file_writer, file_guard) = non_blocking(options.file_appender()?);

    // 2) stdout도 non-blocking
    let (stdout_writer, stdout_guard) = non_blocking(std::io::stdout());

    // 3) EnvFilter (RUST_LOG, 기본 info)
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // 파일 로깅: INFO 레벨 이상만 기록
    let file_filter = EnvFilter::new("info");

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(file_filter),
        )
        .with(fmt::layer().with_writer(stdout_writer).with_ansi(true))
        .try_init()?;

    // guards를 리턴해서 main에서 들고 있게 만들기
    Ok(TracingGuards {
        _file: file_guard,
        _stdout: stdout_guard,
    })
}
