use anyhow::Result;
use std::collections::HashMap;
use std::time::Duration;
use trade_oracle::application::agents::trading_loop::LoopPhase;
use trade_oracle::application::system::Application;
use trade_oracle::config::Config;

fn config(vars: &[(&str, &str)]) -> Result<Config> {
    let mut map: HashMap<&str, &str> = HashMap::from([
        ("MODE", "mock"),
        ("SCALER_MODE", "per_cycle"),
        ("MODEL_PATH", "missing/model.onnx"),
        ("OBSERVABILITY_ENABLED", "false"),
        ("CYCLE_INTERVAL_SECS", "3600"),
        ("IDLE_POLL_SECS", "3600"),
    ]);
    map.extend(vars.iter().copied());
    Config::from_lookup(&|key| map.get(key).map(|v| v.to_string()))
}

#[tokio::test]
async fn test_loop_opens_simulated_trade_when_enabled() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();

    let app = Application::build(config(&[("AI_START_ENABLED", "true")])?).await?;
    let status = app.loop_status.clone();
    let handle = app.start();

    // First cycle runs immediately; the next one is an hour away
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if status.read().await.cycles >= 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;

    let snapshot = status.read().await.clone();
    assert_eq!(snapshot.phase, LoopPhase::InTrade);
    assert_eq!(snapshot.trades_opened, 1);
    let trade = snapshot.open_trade.expect("trade should be open");
    assert_eq!(trade.pair, "BTC/USDT");
    assert!(trade.stop_loss < trade.entry && trade.entry < trade.take_profit);

    handle.shutdown().await;
    assert_eq!(status.read().await.phase, LoopPhase::Stopped);
    Ok(())
}

#[tokio::test]
async fn test_loop_stays_idle_while_switch_off() -> Result<()> {
    let app = Application::build(config(&[])?).await?;
    let status = app.loop_status.clone();
    let handle = app.start();

    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if status.read().await.phase == LoopPhase::Idle {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;

    let snapshot = status.read().await.clone();
    assert_eq!(snapshot.cycles, 0);
    assert!(snapshot.open_trade.is_none());

    handle.shutdown().await;
    Ok(())
}
