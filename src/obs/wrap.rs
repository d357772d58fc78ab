//! Instrumentos de métricas das operações do pool.
//! Ficam no meter global: sem `telemetry::init` viram no-op.

use once_cell::sync::OnceCell;
use opentelemetry::metrics::{Counter, Histogram};
use opentelemetry::{global, KeyValue};
use std::time::Instant;

use crate::amm::types::{Reserves, U256};

struct Instruments {
    op_duration: Histogram<f64>,
    k_growth: Histogram<f64>,
    rejected: Counter<u64>,
}

static INSTRUMENTS: OnceCell<Instruments> = OnceCell::new();

fn instruments() -> &'static Instruments {
    INSTRUMENTS.get_or_init(|| {
        let meter = global::meter("dex_core.amm");
        Instruments {
            op_duration: meter
                .f64_histogram("amm_op_duration_seconds")
                .with_unit("s")
                .with_description("Duração das operações do pool")
                .build(),
            k_growth: meter
                .f64_histogram("amm_k_growth_rel")
                .with_unit("1")
                .with_description("Crescimento relativo Δk/k por swap")
                .build(),
            rejected: meter
                .u64_counter("amm_rejected_total")
                .with_description("Operações rejeitadas por código de erro")
                .build(),
        }
    })
}

/// Executa `f` e registra a duração com o atributo `op`.
pub fn time<F, T>(op: &'static str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let out = f();
    instruments()
        .op_duration
        .record(start.elapsed().as_secs_f64(), &[KeyValue::new("op", op)]);
    out
}

/// Registra `Δk/k` de um swap (aproximação em f64, só para métricas).
pub fn record_k_growth(before: Reserves, after: Reserves) {
    let k0 = before.k();
    let k1 = after.k();
    if k0.is_zero() || k1 < k0 {
        return;
    }
    // razão em ppb, saturada em u64
    let Some(scaled) = (k1 - k0).checked_mul(U256::from(1_000_000_000u64)) else {
        return;
    };
    let ppb = scaled / k0;
    let rel = ppb.min(U256::from(u64::MAX)).low_u64() as f64 / 1e9;
    instruments().k_growth.record(rel, &[]);
}

pub fn count_rejection(op: &'static str, code: &'static str) {
    instruments()
        .rejected
        .add(1, &[KeyValue::new("op", op), KeyValue::new("code", code)]);
}
