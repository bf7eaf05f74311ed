use crate::domain::market::indicator_row::IndicatorRow;
use crate::domain::trading::types::{Direction, TradeIntent};

/// Multipliers and thresholds for deriving trade levels from a forecast
#[derive(Debug, Clone, PartialEq)]
pub struct TradeLevelConfig {
    pub stop_loss_atr_multiplier: f64,
    pub take_profit_atr_multiplier: f64,
    /// Forecast must exceed the current price by this fraction to open a trade
    pub entry_trigger_pct: f64,
    /// Advisory take-profit offset applied to the forecast
    pub advisory_take_profit_pct: f64,
    pub atr_lookback: usize,
}

impl Default for TradeLevelConfig {
    fn default() -> Self {
        Self {
            stop_loss_atr_multiplier: 1.5,
            take_profit_atr_multiplier: 2.5,
            entry_trigger_pct: 0.01,
            advisory_take_profit_pct: 0.02,
            atr_lookback: 10,
        }
    }
}

/// Stop-loss / take-profit pair frozen when a simulated trade opens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Mean ATR over the last `lookback` rows that have one.
///
/// Returns `None` when no row carries an ATR yet.
pub fn average_true_range(rows: &[IndicatorRow], lookback: usize) -> Option<f64> {
    let recent: Vec<f64> = rows
        .iter()
        .rev()
        .filter_map(|r| r.atr)
        .take(lookback.max(1))
        .collect();

    if recent.is_empty() {
        return None;
    }
    Some(recent.iter().sum::<f64>() / recent.len() as f64)
}

pub fn advisory_levels(
    config: &TradeLevelConfig,
    pair: &str,
    forecast: f64,
    current: f64,
    atr: f64,
) -> TradeIntent {
    let stop_distance = config.stop_loss_atr_multiplier * atr;

    let (direction, stop_loss, take_profit) = if forecast > current {
        (
            Direction::Long,
            current - stop_distance,
            forecast * (1.0 + config.advisory_take_profit_pct),
        )
    } else {
        (
            Direction::Short,
            current + stop_distance,
            forecast * (1.0 - config.advisory_take_profit_pct),
        )
    };

    TradeIntent {
        pair: pair.to_string(),
        direction,
        entry: current,
        stop_loss,
        take_profit,
        predicted: forecast,
    }
}

/// Long-only entry trigger of the polling loop
pub fn should_enter(config: &TradeLevelConfig, forecast: f64, current: f64) -> bool {
    forecast > current * (1.0 + config.entry_trigger_pct)
}

pub fn entry_bracket(config: &TradeLevelConfig, current: f64, atr: f64) -> Bracket {
    Bracket {
        stop_loss: current - config.stop_loss_atr_multiplier * atr,
        take_profit: current + config.take_profit_atr_multiplier * atr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_with_atr(values: &[Option<f64>]) -> Vec<IndicatorRow> {
        values
            .iter()
            .map(|atr| IndicatorRow {
                atr: *atr,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_average_true_range_uses_last_rows() {
        let mut values = vec![None, None];
        values.extend((1..=12).map(|v| Some(v as f64)));
        let rows = rows_with_atr(&values);

        // last 10 of 1..=12 are 3..=12, mean 7.5
        assert_eq!(average_true_range(&rows, 10), Some(7.5));
        assert_eq!(average_true_range(&rows, 2), Some(11.5));
        assert_eq!(average_true_range(&rows_with_atr(&[None, None]), 10), None);
    }

    #[test]
    fn test_advisory_long_levels() {
        let config = TradeLevelConfig::default();
        let intent = advisory_levels(&config, "BTC/USDT", 105.0, 100.0, 2.0);

        assert_eq!(intent.direction, Direction::Long);
        assert_eq!(intent.entry, 100.0);
        assert!((intent.stop_loss - 97.0).abs() < 1e-9);
        assert!((intent.take_profit - 107.1).abs() < 1e-9);
        assert_eq!(intent.predicted, 105.0);
    }

    #[test]
    fn test_advisory_short_levels() {
        let config = TradeLevelConfig::default();
        let intent = advisory_levels(&config, "ETH/USDT", 95.0, 100.0, 2.0);

        assert_eq!(intent.direction, Direction::Short);
        assert!((intent.stop_loss - 103.0).abs() < 1e-9);
        assert!((intent.take_profit - 93.1).abs() < 1e-9);

        // A flat forecast is not a long signal
        let flat = advisory_levels(&config, "ETH/USDT", 100.0, 100.0, 2.0);
        assert_eq!(flat.direction, Direction::Short);
    }

    #[test]
    fn test_entry_trigger_threshold() {
        let config = TradeLevelConfig::default();
        assert!(!should_enter(&config, 101.0, 100.0));
        assert!(should_enter(&config, 101.5, 100.0));
        assert!(!should_enter(&config, 90.0, 100.0));
    }

    #[test]
    fn test_entry_bracket() {
        let bracket = entry_bracket(&TradeLevelConfig::default(), 100.0, 2.0);
        assert!((bracket.stop_loss - 97.0).abs() < 1e-9);
        assert!((bracket.take_profit - 105.0).abs() < 1e-9);
    }
}
