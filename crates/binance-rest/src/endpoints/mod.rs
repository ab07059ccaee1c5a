//! API endpoint implementations

pub mod account;
pub mod market;
pub mod trading;

pub use account::AccountEndpoints;
pub use market::MarketEndpoints;
pub use trading::TradingEndpoints;
