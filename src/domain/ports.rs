use crate::domain::errors::MarketDataError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::trading::types::Candle;
use async_trait::async_trait;

// Need async_trait for async functions in trait objects
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Fetches the most recent `limit` candles for `pair`, oldest first.
    async fn fetch_candles(
        &self,
        pair: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError>;

    /// Short label for logs
    fn name(&self) -> &str;
}
