//! Acesso concorrente ao mesmo pool: operações são serializadas e o estado
//! final bate com a contabilidade do ledger.
use std::sync::Arc;
use std::thread;

use dex_core::amm::{AccountId, Amm, AmmConfig, Asset, InMemoryLedger, Wad, WAD};

const THREADS: usize = 8;
const ROUNDS: usize = 200;

#[test]
fn concurrent_operations_keep_books_consistent() {
    let ledger = Arc::new(InMemoryLedger::new());
    let accounts: Vec<AccountId> = (0..THREADS).map(|i| AccountId::new(format!("t{i}"))).collect();
    for account in &accounts {
        ledger.mint(Asset::A, account, 10_000 * WAD);
        ledger.mint(Asset::B, account, 10_000 * WAD);
    }
    let seed = AccountId::from("seed");
    ledger.mint(Asset::A, &seed, 1_000 * WAD);
    ledger.mint(Asset::B, &seed, 1_000 * WAD);

    let amm = Arc::new(Amm::new(AmmConfig::default(), Arc::clone(&ledger)).unwrap());
    amm.add_liquidity(&seed, 1_000 * WAD, 1_000 * WAD).unwrap();

    let handles: Vec<_> = accounts
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, account)| {
            let amm = Arc::clone(&amm);
            thread::spawn(move || {
                for round in 0..ROUNDS {
                    match (i + round) % 4 {
                        0 => {
                            let _ = amm.add_liquidity(&account, WAD, WAD);
                        }
                        1 => {
                            let _ = amm.swap_a_for_b(&account, WAD / 10);
                        }
                        2 => {
                            let _ = amm.swap_b_for_a(&account, WAD / 10);
                        }
                        _ => {
                            let half = amm.liquidity(&account) / 2;
                            let _ = amm.remove_liquidity(&account, half);
                        }
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let snapshot = amm.snapshot();
    assert!(!snapshot.halted);
    let sum: Wad = accounts
        .iter()
        .chain(std::iter::once(&seed))
        .map(|a| amm.liquidity(a))
        .sum();
    assert_eq!(snapshot.total_shares, sum);
    let providers = amm.providers();
    assert_eq!(providers.iter().map(|(_, shares)| shares).sum::<Wad>(), sum);
    assert!(providers.iter().any(|(id, _)| id == &seed));
    assert_eq!(snapshot.reserves.a, ledger.pool_balance(Asset::A));
    assert_eq!(snapshot.reserves.b, ledger.pool_balance(Asset::B));
    assert!(snapshot.k >= dex_core::U256::from(1_000 * WAD) * dex_core::U256::from(1_000 * WAD));
}

#[test]
fn concurrent_swaps_match_sequential_total() {
    let ledger = Arc::new(InMemoryLedger::new());
    let lp = AccountId::from("lp");
    ledger.mint(Asset::A, &lp, 1_000 * WAD);
    ledger.mint(Asset::B, &lp, 1_000 * WAD);
    let amm = Arc::new(Amm::new(AmmConfig::default(), Arc::clone(&ledger)).unwrap());
    amm.add_liquidity(&lp, 1_000 * WAD, 1_000 * WAD).unwrap();

    let traders: Vec<AccountId> = (0..THREADS).map(|i| AccountId::new(format!("trader{i}"))).collect();
    for trader in &traders {
        ledger.mint(Asset::A, trader, 100 * WAD);
    }

    let handles: Vec<_> = traders
        .iter()
        .cloned()
        .map(|trader| {
            let amm = Arc::clone(&amm);
            thread::spawn(move || {
                (0..10)
                    .map(|_| amm.swap_a_for_b(&trader, WAD).expect("swap ok"))
                    .sum::<Wad>()
            })
        })
        .collect();
    let paid: Wad = handles.into_iter().map(|h| h.join().expect("thread panicked")).sum();

    let (ra, rb) = amm.get_reserves();
    assert_eq!(ra, 1_000 * WAD + (THREADS as u128) * 10 * WAD);
    assert_eq!(rb, 1_000 * WAD - paid);
    let received: Wad = traders.iter().map(|t| ledger.balance_of(Asset::B, t)).sum();
    assert_eq!(received, paid);
}
