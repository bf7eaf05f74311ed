use serde::{Deserialize, Serialize};

/// One candle augmented with the derived indicator columns.
///
/// Indicator fields are `None` until the indicator has warmed up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    pub sma: Option<f64>,
    pub ema: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub upper_bb: Option<f64>,
    pub middle_bb: Option<f64>,
    pub lower_bb: Option<f64>,
    pub adx: Option<f64>,
    pub atr: Option<f64>,
}

impl IndicatorRow {
    /// Carries every missing indicator value over from `previous`
    pub fn forward_fill_from(&mut self, previous: &IndicatorRow) {
        fn fill(slot: &mut Option<f64>, prev: Option<f64>) {
            if slot.is_none() {
                *slot = prev;
            }
        }

        fill(&mut self.sma, previous.sma);
        fill(&mut self.ema, previous.ema);
        fill(&mut self.rsi, previous.rsi);
        fill(&mut self.macd, previous.macd);
        fill(&mut self.macd_signal, previous.macd_signal);
        fill(&mut self.macd_hist, previous.macd_hist);
        fill(&mut self.upper_bb, previous.upper_bb);
        fill(&mut self.middle_bb, previous.middle_bb);
        fill(&mut self.lower_bb, previous.lower_bb);
        fill(&mut self.adx, previous.adx);
        fill(&mut self.atr, previous.atr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_fill_only_fills_gaps() {
        let previous = IndicatorRow {
            sma: Some(10.0),
            rsi: Some(55.0),
            atr: None,
            ..Default::default()
        };
        let mut row = IndicatorRow {
            sma: None,
            rsi: Some(60.0),
            atr: None,
            ..Default::default()
        };

        row.forward_fill_from(&previous);

        assert_eq!(row.sma, Some(10.0));
        assert_eq!(row.rsi, Some(60.0));
        assert_eq!(row.atr, None);
    }
}
