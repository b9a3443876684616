pub mod spot_market_entry;
