pub mod config_loader;
pub mod domain;
pub mod infrastructure;
pub mod strategies;

pub use domain::constants::*;
pub use domain::enums::*;
pub use domain::errors::*;
pub use domain::model::exchange::*;
pub use domain::model::order::*;
pub use domain::model::report::*;
pub use domain::traits::ExchangeApi;
pub use infrastructure::exchange::bybit::*;
pub use strategies::spot_market_entry::*;
