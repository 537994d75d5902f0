use std::process::ExitCode;

use color_eyre::eyre;
use structopt::StructOpt;
use tracing::{error, info};

use exchanges::BinanceFuturesClient;
use trade::cli::{self, Command, OrderArgs};
use trade::config::{self, AppConfig};
use trade::logger::{self, LogOptions};
use trade::order;

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<ExitCode> {
    // init error reporting
    color_eyre::install()?;

    // .env가 있으면 환경변수로 로드 (없어도 무시)
    dotenv::dotenv().ok();

    let cmd = Command::from_args();

    match cmd {
        Command::Order(args) => run_order(args).await,
    }
}

async fn run_order(args: OrderArgs) -> eyre::Result<ExitCode> {
    // init logging (guard는 함수 끝까지 들고 있어야 파일에 flush된다)
    let log_options = LogOptions::new(config::log_dir(), args.log_file.as_deref())?;
    let _guards = logger::init_tracing(&log_options)?;

    let input = args.to_input();
    order::print_order_summary(&input);

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Configuration error: {e}");
            return Ok(ExitCode::from(cli::EXIT_FAILURE));
        }
    };

    let client = BinanceFuturesClient::new(config.credentials, config.client)?;
    info!("Using Binance Futures endpoint {}", client.base_url());

    let code = cli::handle_order(&client, &input).await;
    Ok(ExitCode::from(code))
}
