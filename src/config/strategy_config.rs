//! Indicator and decision-layer parameters.

use super::{EnvLookup, parse_var};
use crate::application::market_data::indicator_pipeline::IndicatorConfig;
use crate::application::risk_management::trade_levels::TradeLevelConfig;
use anyhow::Result;

#[derive(Debug, Clone)]
pub struct StrategyEnvConfig {
    pub indicators: IndicatorConfig,

    /// Scaled rows fed to the model per prediction
    pub sequence_length: usize,
    pub atr_lookback: usize,

    pub stop_loss_atr_multiplier: f64,
    pub take_profit_atr_multiplier: f64,
    pub entry_trigger_pct: f64,
    pub advisory_take_profit_pct: f64,
}

impl StrategyEnvConfig {
    pub fn from_lookup(lookup: EnvLookup) -> Result<Self> {
        let defaults = IndicatorConfig::default();
        let indicators = IndicatorConfig {
            sma_period: parse_var(lookup, "SMA_PERIOD", defaults.sma_period)?,
            ema_period: parse_var(lookup, "EMA_PERIOD", defaults.ema_period)?,
            rsi_period: parse_var(lookup, "RSI_PERIOD", defaults.rsi_period)?,
            macd_fast_period: parse_var(lookup, "MACD_FAST_PERIOD", defaults.macd_fast_period)?,
            macd_slow_period: parse_var(lookup, "MACD_SLOW_PERIOD", defaults.macd_slow_period)?,
            macd_signal_period: parse_var(
                lookup,
                "MACD_SIGNAL_PERIOD",
                defaults.macd_signal_period,
            )?,
            bb_period: parse_var(lookup, "BB_PERIOD", defaults.bb_period)?,
            bb_std_dev: parse_var(lookup, "BB_STD_DEV", defaults.bb_std_dev)?,
            adx_period: parse_var(lookup, "ADX_PERIOD", defaults.adx_period)?,
            atr_period: parse_var(lookup, "ATR_PERIOD", defaults.atr_period)?,
        };

        let levels = TradeLevelConfig::default();
        let config = Self {
            indicators,
            sequence_length: parse_var(lookup, "SEQUENCE_LENGTH", 10usize)?,
            atr_lookback: parse_var(lookup, "ATR_LOOKBACK", levels.atr_lookback)?,
            stop_loss_atr_multiplier: parse_var(
                lookup,
                "STOP_LOSS_ATR_MULTIPLIER",
                levels.stop_loss_atr_multiplier,
            )?,
            take_profit_atr_multiplier: parse_var(
                lookup,
                "TAKE_PROFIT_ATR_MULTIPLIER",
                levels.take_profit_atr_multiplier,
            )?,
            entry_trigger_pct: parse_var(lookup, "ENTRY_TRIGGER_PCT", levels.entry_trigger_pct)?,
            advisory_take_profit_pct: parse_var(
                lookup,
                "ADVISORY_TAKE_PROFIT_PCT",
                levels.advisory_take_profit_pct,
            )?,
        };

        if config.sequence_length == 0 {
            anyhow::bail!("SEQUENCE_LENGTH must be greater than 0");
        }
        if config.atr_lookback == 0 {
            anyhow::bail!("ATR_LOOKBACK must be greater than 0");
        }

        Ok(config)
    }

    pub fn trade_levels(&self) -> TradeLevelConfig {
        TradeLevelConfig {
            stop_loss_atr_multiplier: self.stop_loss_atr_multiplier,
            take_profit_atr_multiplier: self.take_profit_atr_multiplier,
            entry_trigger_pct: self.entry_trigger_pct,
            advisory_take_profit_pct: self.advisory_take_profit_pct,
            atr_lookback: self.atr_lookback,
        }
    }
}
