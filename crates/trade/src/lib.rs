//! Binance Futures Testnet 주문 봇
//!
//! - `validate`: CLI 입력 검증
//! - `order`: 주문 생성/전송 및 응답 출력
//! - `config`: 환경변수 설정
//! - `logger`: stdout + 파일 로깅
//! - `cli`: 커맨드라인 정의 및 실행 결과 → 종료 코드

pub mod cli;
pub mod config;
pub mod logger;
pub mod order;
pub mod validate;
