pub mod trade_levels;
