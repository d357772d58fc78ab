use anyhow::Result;
use opentelemetry::{metrics::Counter, KeyValue};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use dex_core::amm::{AccountId, Amm, AmmConfig, Asset, EventSink, InMemoryLedger, PoolEvent, TracingSink, WAD};
use dex_core::telemetry;

/// Loga via `TracingSink` e conta o evento no meter do processo.
struct CountingSink {
    events: Counter<u64>,
}

impl EventSink for CountingSink {
    fn emit(&self, event: &PoolEvent) {
        TracingSink.emit(event);
        self.events.add(1, &[KeyValue::new("event", event.name())]);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let tel = telemetry::init("dex-core")?;

    let config = AmmConfig::from_env()?;
    let ledger = Arc::new(InMemoryLedger::new());
    let alice = AccountId::from("alice");
    let bob = AccountId::from("bob");
    ledger.mint(Asset::A, &alice, 1_000 * WAD);
    ledger.mint(Asset::B, &alice, 1_000 * WAD);
    ledger.mint(Asset::A, &bob, 100 * WAD);

    let sink = CountingSink { events: tel.pool_events.clone() };
    let amm = Amm::with_sink(config, Arc::clone(&ledger), sink)?;

    let span = telemetry::make_info_span("demo", 0, "amm_demo");
    let _guard = span.enter();

    let shares = amm.add_liquidity(&alice, 100 * WAD, 200 * WAD)?;
    info!(shares = %shares, price = %amm.get_price()?, "pool inicializado");

    for i in 1..=3u32 {
        let t0 = Instant::now();
        let out = amm.swap_a_for_b(&bob, 10 * WAD)?;
        tel.swap_latency_ms.record(
            t0.elapsed().as_secs_f64() * 1000.0,
            &[KeyValue::new("direction", "A->B")],
        );
        let (reserve_a, reserve_b) = amm.get_reserves();
        info!(round = i, amount_out = %out, reserve_a = %reserve_a, reserve_b = %reserve_b, "swap");
    }

    let (amount_a, amount_b) = amm.remove_liquidity(&alice, shares)?;
    info!(amount_a = %amount_a, amount_b = %amount_b, "liquidez resgatada");

    let snapshot = amm.snapshot();
    info!(
        total_shares = %snapshot.total_shares,
        k = %snapshot.k,
        fee_bps = snapshot.fee_bps,
        "estado final"
    );

    drop(_guard);
    tel.shutdown();
    Ok(())
}
