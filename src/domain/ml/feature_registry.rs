use crate::domain::market::indicator_row::IndicatorRow;

/// Ordered list of feature names.
/// This order MUST match the column order the forecasting model was trained on.
/// Any change here is a breaking change for persisted scalers and ONNX models.
pub const FEATURE_NAMES: &[&str] = &[
    "close", "sma", "ema", "rsi", "macd", "upper_bb", "lower_bb", "adx", "atr",
];

pub const FEATURE_COUNT: usize = 9;

/// Index of the close column, the column forecasts are expressed in
pub const CLOSE_COLUMN: usize = 0;

/// Extracts the model features of a row, or `None` while any indicator is still warming up.
pub fn row_features(row: &IndicatorRow) -> Option<[f64; FEATURE_COUNT]> {
    Some([
        row.close,
        row.sma?,
        row.ema?,
        row.rsi?,
        row.macd?,
        row.upper_bb?,
        row.lower_bb?,
        row.adx?,
        row.atr?,
    ])
}

pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}
