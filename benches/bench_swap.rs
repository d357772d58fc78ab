use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;

use dex_core::amm::swap::{get_amount_in, get_amount_out};
use dex_core::amm::types::{Bps, Wad, WAD};
use dex_core::amm::{AccountId, Amm, AmmConfig, Asset, Direction, InMemoryLedger};

#[inline]
fn w(n: u128) -> Wad {
    n * WAD
}

fn bench_swap(c: &mut Criterion) {
    let mut g = c.benchmark_group("swap");
    g.warm_up_time(Duration::from_secs(2));
    g.measurement_time(Duration::from_secs(5));
    g.sample_size(300);
    g.throughput(Throughput::Elements(1));

    // Casos com rótulo único + taxa
    let cases: [(&str, Wad, Wad, Wad, Bps); 6] = [
        ("sym_small", w(1_000_000), w(1_000_000), w(1_000), 0),
        ("sym_large", w(5_000_000_000), w(5_000_000_000), w(1_000_000), 0),
        ("asym_xgg", w(1_000_000_000), w(1_000_000), w(1_000), 0),
        ("asym_ygg", w(1_000_000), w(1_000_000_000), w(1_000), 0),
        ("sym_small_fee", w(1_000_000), w(1_000_000), w(1_000), 30),
        ("asym_xgg_fee", w(1_000_000_000), w(1_000_000), w(1_000), 30),
    ];

    for (label, x, y, dx, fee) in cases {
        g.bench_function(format!("amount_out_{}_f{}", label, fee), |b| {
            b.iter(|| {
                let dy = get_amount_out(black_box(dx), black_box(x), black_box(y), black_box(fee)).unwrap();
                black_box(dy);
            });
        });
        g.bench_function(format!("amount_in_{}_f{}", label, fee), |b| {
            b.iter(|| {
                let need = get_amount_in(black_box(dx), black_box(x), black_box(y), black_box(fee)).unwrap();
                black_box(need);
            });
        });
    }

    // Fachada completa: lock + transferências + evento, ida e volta
    let ledger = Arc::new(InMemoryLedger::new());
    let lp = AccountId::from("lp");
    let trader = AccountId::from("trader");
    ledger.mint(Asset::A, &lp, w(1_000_000));
    ledger.mint(Asset::B, &lp, w(1_000_000));
    ledger.mint(Asset::A, &trader, w(1_000_000));
    ledger.mint(Asset::B, &trader, w(1_000_000));
    let amm = Amm::new(AmmConfig::default(), Arc::clone(&ledger)).unwrap();
    amm.add_liquidity(&lp, w(1_000_000), w(1_000_000)).unwrap();

    g.bench_function("facade_round_trip", |b| {
        b.iter(|| {
            let out = amm
                .swap_exact_in(&trader, Direction::AToB, black_box(w(10)), 0)
                .unwrap()
                .amount_out;
            black_box(amm.swap_b_for_a(&trader, out).unwrap());
        });
    });

    g.finish();
}

criterion_group!(benches, bench_swap);
criterion_main!(benches);
