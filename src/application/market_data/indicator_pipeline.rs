use super::adx::WilderAdx;
use crate::domain::errors::IndicatorError;
use crate::domain::market::indicator_row::IndicatorRow;
use crate::domain::trading::types::Candle;
use rust_decimal::prelude::ToPrimitive;
use ta::Next;
use ta::indicators::{
    AverageTrueRange, BollingerBands, ExponentialMovingAverage, MovingAverageConvergenceDivergence,
    RelativeStrengthIndex, SimpleMovingAverage,
};
use tracing::debug;

/// Indicator periods used by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub sma_period: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub adx_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_period: 14,
            ema_period: 14,
            rsi_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            bb_period: 5,
            bb_std_dev: 2.0,
            adx_period: 14,
            atr_period: 14,
        }
    }
}

/// Indicator state for a single pass over one candle window
struct IndicatorSet {
    sma: SimpleMovingAverage,
    ema: ExponentialMovingAverage,
    rsi: RelativeStrengthIndex,
    macd: MovingAverageConvergenceDivergence,
    bb: BollingerBands,
    atr: AverageTrueRange,
    adx: WilderAdx,
}

fn invalid(indicator: &'static str) -> impl Fn(ta::errors::TaError) -> IndicatorError {
    move |e| IndicatorError::InvalidParameter {
        indicator,
        reason: format!("{:?}", e),
    }
}

impl IndicatorSet {
    fn new(config: &IndicatorConfig) -> Result<Self, IndicatorError> {
        if config.macd_fast_period >= config.macd_slow_period {
            return Err(IndicatorError::InvalidParameter {
                indicator: "MACD",
                reason: format!(
                    "fast period {} must be shorter than slow period {}",
                    config.macd_fast_period, config.macd_slow_period
                ),
            });
        }

        Ok(Self {
            sma: SimpleMovingAverage::new(config.sma_period).map_err(invalid("SMA"))?,
            ema: ExponentialMovingAverage::new(config.ema_period).map_err(invalid("EMA"))?,
            rsi: RelativeStrengthIndex::new(config.rsi_period).map_err(invalid("RSI"))?,
            macd: MovingAverageConvergenceDivergence::new(
                config.macd_fast_period,
                config.macd_slow_period,
                config.macd_signal_period,
            )
            .map_err(invalid("MACD"))?,
            bb: BollingerBands::new(config.bb_period, config.bb_std_dev)
                .map_err(invalid("Bollinger Bands"))?,
            atr: AverageTrueRange::new(config.atr_period).map_err(invalid("ATR"))?,
            adx: WilderAdx::new(config.adx_period).ok_or(IndicatorError::InvalidParameter {
                indicator: "ADX",
                reason: "period must be > 0".to_string(),
            })?,
        })
    }
}

/// Computes the fixed indicator set over a candle window.
///
/// Every call starts from fresh indicator state: the window is replaced on each
/// fetch, never appended to.
#[derive(Debug, Clone, Default)]
pub struct IndicatorPipeline {
    config: IndicatorConfig,
}

impl IndicatorPipeline {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Number of leading rows whose model features cannot all be defined yet
    pub fn warmup_rows(&self) -> usize {
        let c = &self.config;
        [
            c.sma_period.saturating_sub(1),
            c.ema_period.saturating_sub(1),
            c.rsi_period,
            c.macd_slow_period.saturating_sub(1),
            c.bb_period.saturating_sub(1),
            c.adx_period,
            c.atr_period,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn compute(&self, candles: &[Candle]) -> Result<Vec<IndicatorRow>, IndicatorError> {
        if candles.is_empty() {
            return Err(IndicatorError::EmptyWindow);
        }

        let c = &self.config;
        let mut set = IndicatorSet::new(c)?;
        let mut rows: Vec<IndicatorRow> = Vec::with_capacity(candles.len());

        for (index, candle) in candles.iter().enumerate() {
            let (open, high, low, close, volume) = candle_values(index, candle)?;

            let item = ta::DataItem::builder()
                .open(open)
                .high(high)
                .low(low)
                .close(close)
                .volume(volume)
                .build()
                .map_err(|e| IndicatorError::InvalidCandle {
                    index,
                    reason: format!("{:?}", e),
                })?;

            let sma = set.sma.next(close);
            let ema = set.ema.next(close);
            let rsi = set.rsi.next(close);
            let macd = set.macd.next(close);
            let bb = set.bb.next(close);
            let atr = set.atr.next(&item);
            let adx = set.adx.next(high, low, close);

            let signal_ready = c.macd_slow_period + c.macd_signal_period.saturating_sub(2);

            let mut row = IndicatorRow {
                timestamp: candle.timestamp,
                open,
                high,
                low,
                close,
                volume,
                sma: warm(index, c.sma_period.saturating_sub(1), sma),
                ema: warm(index, c.ema_period.saturating_sub(1), ema),
                rsi: warm(index, c.rsi_period, rsi),
                macd: warm(index, c.macd_slow_period.saturating_sub(1), macd.macd),
                macd_signal: warm(index, signal_ready, macd.signal),
                macd_hist: warm(index, signal_ready, macd.histogram),
                upper_bb: warm(index, c.bb_period.saturating_sub(1), bb.upper),
                middle_bb: warm(index, c.bb_period.saturating_sub(1), bb.average),
                lower_bb: warm(index, c.bb_period.saturating_sub(1), bb.lower),
                adx: adx.filter(|v| v.is_finite()),
                atr: warm(index, c.atr_period, atr),
            };

            if let Some(previous) = rows.last() {
                row.forward_fill_from(previous);
            }
            rows.push(row);
        }

        debug!(
            "IndicatorPipeline: computed {} rows ({} warm-up)",
            rows.len(),
            self.warmup_rows().min(rows.len())
        );

        Ok(rows)
    }
}

/// Emits a value once `index` has reached `ready_at`; non-finite values become gaps
fn warm(index: usize, ready_at: usize, value: f64) -> Option<f64> {
    if index >= ready_at && value.is_finite() {
        Some(value)
    } else {
        None
    }
}

fn candle_values(
    index: usize,
    candle: &Candle,
) -> Result<(f64, f64, f64, f64, f64), IndicatorError> {
    let to_f64 = |name: &str, value: rust_decimal::Decimal| {
        value
            .to_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| IndicatorError::InvalidCandle {
                index,
                reason: format!("{} is not representable as f64", name),
            })
    };

    let open = to_f64("open", candle.open)?;
    let high = to_f64("high", candle.high)?;
    let low = to_f64("low", candle.low)?;
    let close = to_f64("close", candle.close)?;
    let volume = to_f64("volume", candle.volume)?;

    if open <= 0.0 || high <= 0.0 || low <= 0.0 || close <= 0.0 {
        return Err(IndicatorError::InvalidCandle {
            index,
            reason: "prices must be positive".to_string(),
        });
    }
    if high < low {
        return Err(IndicatorError::InvalidCandle {
            index,
            reason: format!("high {} is below low {}", high, low),
        });
    }
    if volume < 0.0 {
        return Err(IndicatorError::InvalidCandle {
            index,
            reason: "volume must not be negative".to_string(),
        });
    }

    Ok((open, high, low, close, volume))
}
