pub mod indicator_row;
pub mod timeframe;
