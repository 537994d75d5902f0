use exchanges::binance::FuturesOrderClient;
use structopt::clap::AppSettings;
use structopt::StructOpt;

use crate::order::{self, OrderError, OrderInput};

#[derive(Debug, StructOpt)]
#[structopt(name = "trade", about = "Simple Binance Futures Testnet trading bot CLI")]
pub enum Command {
    /// Place an order on Binance Futures Testnet (USDT-M)
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Order(OrderArgs),
}

/// 숫자 인자도 문자열로 받는다. 숫자 검증은 `validate`에서 한다.
#[derive(Debug, StructOpt)]
pub struct OrderArgs {
    /// Trading pair symbol, e.g. BTCUSDT
    pub symbol: String,

    /// Order side: BUY or SELL
    pub side: String,

    /// Order type: MARKET, LIMIT, or STOP_LIMIT
    pub order_type: String,

    /// Order quantity
    pub quantity: String,

    /// Price (required for LIMIT and STOP_LIMIT orders)
    #[structopt(short = "p", long)]
    pub price: Option<String>,

    /// Trigger price for STOP_LIMIT orders
    #[structopt(long)]
    pub stop_price: Option<String>,

    /// Time in force for LIMIT and STOP_LIMIT orders: GTC (default), IOC, or FOK
    #[structopt(long)]
    pub time_in_force: Option<String>,

    /// Log file name inside the log directory (default: trading_bot.log)
    #[structopt(short = "l", long)]
    pub log_file: Option<String>,
}

impl OrderArgs {
    pub fn to_input(&self) -> OrderInput {
        OrderInput {
            symbol: self.symbol.clone(),
            side: self.side.clone(),
            order_type: self.order_type.clone(),
            quantity: self.quantity.clone(),
            price: self.price.clone(),
            stop_price: self.stop_price.clone(),
            time_in_force: self.time_in_force.clone(),
        }
    }
}

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// 주문 한 건을 처리하고 프로세스 종료 코드를 돌려준다.
/// 어떤 실패도 패닉 없이 종료 코드 1로 끝난다.
pub async fn handle_order<C>(client: &C, input: &OrderInput) -> u8
where
    C: FuturesOrderClient + ?Sized,
{
    match order::place_order_with_validation(client, input).await {
        Ok(response) => {
            order::print_order_response(&response);
            println!("Order placed successfully on Binance Futures Testnet.");
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("{}", error_message(&e));
            EXIT_FAILURE
        }
    }
}

/// 사용자에게 보여줄 에러 문구
pub fn error_message(e: &OrderError) -> String {
    match e {
        OrderError::Validation(_) => e.to_string(),
        OrderError::Exchange(inner) if inner.is_network() => {
            format!("Network error while calling Binance: {inner}")
        }
        OrderError::Exchange(inner) => inner.to_string(),
    }
}
