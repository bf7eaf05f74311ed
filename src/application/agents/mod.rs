pub mod ai_switch;
pub mod trading_loop;
