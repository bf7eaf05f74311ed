pub mod binance;
pub mod core;
pub mod csv_source;
pub mod mock;
pub mod observability;
pub mod persistence;
