use crate::domain::errors::MarketDataError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::MarketDataService;
use crate::domain::trading::types::Candle;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Open time of the first simulated candle (2023-11-14T22:13:20Z)
const MOCK_EPOCH_MS: i64 = 1_700_000_000_000;

enum MockMode {
    /// Seeded random walk that advances one candle per fetch
    RandomWalk,
    /// Same fixed window on every fetch
    Fixed(Vec<Candle>),
    /// Windows handed out in order; the last one repeats
    Scripted(Mutex<VecDeque<Vec<Candle>>>),
    Failing,
}

/// Offline market data source for demos and tests
pub struct MockMarketDataService {
    mode: MockMode,
    calls: AtomicUsize,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self::with_mode(MockMode::RandomWalk)
    }

    pub fn with_candles(candles: Vec<Candle>) -> Self {
        Self::with_mode(MockMode::Fixed(candles))
    }

    pub fn scripted(windows: Vec<Vec<Candle>>) -> Self {
        Self::with_mode(MockMode::Scripted(Mutex::new(windows.into())))
    }

    /// Every fetch fails with a request error
    pub fn failing() -> Self {
        Self::with_mode(MockMode::Failing)
    }

    fn with_mode(mode: MockMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockMarketDataService {
    fn default() -> Self {
        Self::new()
    }
}

fn base_price(pair: &str) -> f64 {
    if pair.contains("BTC") {
        96000.0
    } else if pair.contains("ETH") {
        3400.0
    } else if pair.contains("BNB") {
        600.0
    } else if pair.contains("APT") {
        8.0
    } else {
        150.0
    }
}

/// FNV-1a over the pair so each pair gets its own stable walk
fn pair_seed(pair: &str) -> u64 {
    pair.bytes().fold(0xcbf29ce484222325u64, |hash, b| {
        (hash ^ b as u64).wrapping_mul(0x100000001b3)
    })
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO).round_dp(6)
}

/// Generates `count` candles of a seeded random walk for `pair`.
///
/// The same pair, timeframe and count always produce the same candles.
pub fn random_walk(pair: &str, timeframe: Timeframe, count: usize) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(pair_seed(pair));
    let step_ms = timeframe.duration().as_millis() as i64;
    let mut close = base_price(pair);

    (0..count)
        .map(|i| {
            let open = close;
            // -0.5% to +0.5% per candle
            close = open * (1.0 + rng.random_range(-0.005..0.005));
            let wick_up = rng.random_range(0.0..0.002);
            let wick_down = rng.random_range(0.0..0.002);
            let high = open.max(close) * (1.0 + wick_up);
            let low = open.min(close) * (1.0 - wick_down);

            Candle {
                symbol: pair.to_string(),
                open: to_decimal(open),
                high: to_decimal(high),
                low: to_decimal(low),
                close: to_decimal(close),
                volume: to_decimal(rng.random_range(10.0..100.0)),
                timestamp: MOCK_EPOCH_MS + i as i64 * step_ms,
            }
        })
        .collect()
}

fn last_n(mut candles: Vec<Candle>, limit: usize) -> Vec<Candle> {
    if candles.len() > limit {
        candles.drain(..candles.len() - limit);
    }
    candles
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn fetch_candles(
        &self,
        pair: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        let candles = match &self.mode {
            MockMode::RandomWalk => last_n(random_walk(pair, timeframe, limit + call), limit),
            MockMode::Fixed(candles) => last_n(candles.clone(), limit),
            MockMode::Scripted(windows) => {
                let mut windows = windows.lock().map_err(|e| MarketDataError::Request {
                    pair: pair.to_string(),
                    reason: format!("mock script poisoned: {}", e),
                })?;
                let window = if windows.len() > 1 {
                    windows.pop_front().unwrap_or_default()
                } else {
                    windows.front().cloned().unwrap_or_default()
                };
                last_n(window, limit)
            }
            MockMode::Failing => {
                return Err(MarketDataError::Request {
                    pair: pair.to_string(),
                    reason: "mock market data is configured to fail".to_string(),
                });
            }
        };

        if candles.is_empty() {
            return Err(MarketDataError::Empty {
                pair: pair.to_string(),
            });
        }

        debug!(
            "MockMarketDataService: {} candles for {} (call {})",
            candles.len(),
            pair,
            call
        );
        Ok(candles)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
