use super::ai_switch::AiSwitch;
use crate::application::prediction_service::{Evaluation, PredictionService};
use crate::application::risk_management::trade_levels::{entry_bracket, should_enter};
use crate::infrastructure::observability::Metrics;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing::{error, info, warn};

/// Timing and target of the polling loop
#[derive(Debug, Clone, PartialEq)]
pub struct LoopSettings {
    pub pair: String,
    pub idle_poll: Duration,
    pub cycle_interval: Duration,
    pub cooldown: Duration,
    pub error_backoff: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            pair: "BTC/USDT".to_string(),
            idle_poll: Duration::from_secs(10),
            cycle_interval: Duration::from_secs(60),
            cooldown: Duration::from_secs(60),
            error_backoff: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Starting,
    Idle,
    Flat,
    InTrade,
    Cooldown,
    Backoff,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

/// Simulated long position; levels are frozen when it opens
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenTrade {
    pub pair: String,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSnapshot {
    pub current_price: f64,
    pub predicted_price: f64,
    pub at: DateTime<Utc>,
}

/// Snapshot of the loop published for `/api/status`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopStatus {
    pub phase: LoopPhase,
    pub open_trade: Option<OpenTrade>,
    pub last_forecast: Option<ForecastSnapshot>,
    pub last_error: Option<String>,
    pub last_exit: Option<ExitReason>,
    pub cycles: u64,
    pub trades_opened: u64,
    pub trades_closed: u64,
}

impl Default for LoopStatus {
    fn default() -> Self {
        Self {
            phase: LoopPhase::Starting,
            open_trade: None,
            last_forecast: None,
            last_error: None,
            last_exit: None,
            cycles: 0,
            trades_opened: 0,
            trades_closed: 0,
        }
    }
}

pub type SharedLoopStatus = Arc<RwLock<LoopStatus>>;

/// Background loop: forecast every cycle while the switch is on, open a simulated
/// long when the forecast clears the entry trigger, close it at stop-loss or take-profit.
///
/// No order is ever sent. Position state lives in memory only.
pub struct TradingLoop {
    service: Arc<PredictionService>,
    switch: AiSwitch,
    settings: LoopSettings,
    status: SharedLoopStatus,
    metrics: Metrics,
    position: Option<OpenTrade>,
}

impl TradingLoop {
    pub fn new(
        service: Arc<PredictionService>,
        switch: AiSwitch,
        settings: LoopSettings,
        status: SharedLoopStatus,
        metrics: Metrics,
    ) -> Self {
        Self {
            service,
            switch,
            settings,
            status,
            metrics,
            position: None,
        }
    }

    pub fn status(&self) -> SharedLoopStatus {
        self.status.clone()
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "TradingLoop: started for {} (cycle {:?}, idle poll {:?})",
            self.settings.pair, self.settings.cycle_interval, self.settings.idle_poll
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let delay = self.step().await;

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.status.write().await.phase = LoopPhase::Stopped;
        warn!("TradingLoop: shutdown received, loop stopped");
    }

    /// Runs one iteration and returns how long to wait before the next one
    pub async fn step(&mut self) -> Duration {
        let enabled = self.switch.is_enabled();
        self.metrics.ai_enabled.set(if enabled { 1.0 } else { 0.0 });

        if !enabled {
            self.status.write().await.phase = LoopPhase::Idle;
            return self.settings.idle_poll;
        }

        let pair = self.settings.pair.clone();
        let result = self.service.evaluate(&pair).await;

        let status_lock = self.status.clone();
        let mut status = status_lock.write().await;
        status.cycles += 1;

        let evaluation = match result {
            Ok(evaluation) => evaluation,
            Err(e) => {
                error!(
                    "TradingLoop: cycle failed for {} ({}): {}. Retrying in {:?}",
                    pair,
                    e.stage(),
                    e,
                    self.settings.error_backoff
                );
                status.last_error = Some(e.to_string());
                status.phase = LoopPhase::Backoff;
                return self.settings.error_backoff;
            }
        };

        status.last_error = None;
        status.last_forecast = Some(ForecastSnapshot {
            current_price: evaluation.current_price,
            predicted_price: evaluation.predicted_price,
            at: Utc::now(),
        });

        let delay = match self.position.take() {
            Some(trade) => self.manage_open_trade(trade, &evaluation, &mut status),
            None => self.consider_entry(&evaluation, &mut status),
        };

        status.open_trade = self.position.clone();
        self.metrics
            .open_trades
            .set(if self.position.is_some() { 1.0 } else { 0.0 });
        delay
    }

    fn manage_open_trade(
        &mut self,
        trade: OpenTrade,
        evaluation: &Evaluation,
        status: &mut LoopStatus,
    ) -> Duration {
        let current = evaluation.current_price;

        let exit = if current <= trade.stop_loss {
            Some(ExitReason::StopLoss)
        } else if current >= trade.take_profit {
            Some(ExitReason::TakeProfit)
        } else {
            None
        };

        match exit {
            Some(reason) => {
                let signal = match reason {
                    ExitReason::StopLoss => "stop_loss",
                    ExitReason::TakeProfit => "take_profit",
                };
                info!(
                    "TradingLoop: {} hit for {} at {:.4} (entry {:.4}, stop {:.4}, target {:.4}). Cooling down {:?}",
                    signal,
                    trade.pair,
                    current,
                    trade.entry,
                    trade.stop_loss,
                    trade.take_profit,
                    self.settings.cooldown
                );
                self.metrics.inc_signals(&trade.pair, signal);
                status.trades_closed += 1;
                status.last_exit = Some(reason);
                status.phase = LoopPhase::Cooldown;
                self.settings.cooldown + self.settings.cycle_interval
            }
            None => {
                info!(
                    "TradingLoop: holding {} at {:.4} (stop {:.4}, target {:.4})",
                    trade.pair, current, trade.stop_loss, trade.take_profit
                );
                self.metrics.inc_signals(&trade.pair, "hold");
                self.position = Some(trade);
                status.phase = LoopPhase::InTrade;
                self.settings.cycle_interval
            }
        }
    }

    fn consider_entry(&mut self, evaluation: &Evaluation, status: &mut LoopStatus) -> Duration {
        let levels = &self.service.settings().levels;
        let current = evaluation.current_price;

        if should_enter(levels, evaluation.predicted_price, current) {
            let bracket = entry_bracket(levels, current, evaluation.average_atr);
            info!(
                "TradingLoop: entering LONG {} at {:.4} (forecast {:.4}, stop {:.4}, target {:.4})",
                evaluation.pair,
                current,
                evaluation.predicted_price,
                bracket.stop_loss,
                bracket.take_profit
            );
            self.metrics.inc_signals(&evaluation.pair, "entry");
            self.position = Some(OpenTrade {
                pair: evaluation.pair.clone(),
                entry: current,
                stop_loss: bracket.stop_loss,
                take_profit: bracket.take_profit,
                opened_at: Utc::now(),
            });
            status.trades_opened += 1;
            status.phase = LoopPhase::InTrade;
        } else {
            info!(
                "TradingLoop: no entry for {} (current {:.4}, forecast {:.4})",
                evaluation.pair, current, evaluation.predicted_price
            );
            status.phase = LoopPhase::Flat;
        }

        self.settings.cycle_interval
    }
}
