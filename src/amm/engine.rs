//! Fachada do pool: compõe reservas, ledger de LP, motor de swap e visão de
//! preço nas operações públicas.
//!
//! # Atomicidade
//!
//! O estado mutável (`ReservePair` + `LiquidityLedger`) vive num único
//! `Mutex`, mantido durante toda a operação, inclusive nas chamadas ao
//! [`TokenLedger`]. Cada operação:
//!
//! 1. valida as entradas;
//! 2. guarda um checkpoint (reservas + entrada do chamador + supply);
//! 3. aplica a transição no estado interno;
//! 4. executa as transferências; se alguma falha, as pernas já feitas são
//!    compensadas, o checkpoint é restaurado e a operação retorna
//!    [`AmmErrorCode::TransferFailed`];
//! 5. emite o evento.
//!
//! Um `k` decrescente após swap para a instância: todas as escritas seguintes
//! retornam [`AmmErrorCode::EngineHalted`].

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, error, info_span, warn};

use super::config::AmmConfig;
use super::error::Result;
use super::error_catalog::AmmErrorCode;
use super::events::{EventSink, NoopSink, PoolEvent};
use super::guardrails::ensure_nonzero;
use super::ledger::TokenLedger;
use super::liquidity::{amounts_for_burn, shares_for_deposit, LedgerCheckpoint, LiquidityLedger};
use super::pricing;
use super::reserves::ReservePair;
use super::swap::{SwapEngine, SwapOutcome};
use super::types::{AccountId, Asset, Bps, Direction, Reserves, Wad, U256};
use crate::amm_err;
use crate::obs::wrap;

/// Leitura consistente do pool, feita sob um único lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub reserves: Reserves,
    pub total_shares: Wad,
    pub k: U256,
    pub fee_bps: Bps,
    pub halted: bool,
}

#[derive(Debug, Default)]
struct PoolState {
    reserves: ReservePair,
    ledger: LiquidityLedger,
    halted: bool,
}

struct Checkpoint {
    reserves: ReservePair,
    ledger: LedgerCheckpoint,
}

impl PoolState {
    fn checkpoint(&self, account: &AccountId) -> Checkpoint {
        Checkpoint {
            reserves: self.reserves,
            ledger: self.ledger.checkpoint(account),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.reserves = checkpoint.reserves;
        self.ledger.restore(checkpoint.ledger);
    }

    fn deposit(&mut self, provider: &AccountId, amount_a: Wad, amount_b: Wad) -> Result<Wad> {
        let minted = self
            .ledger
            .mint_for_deposit(provider, amount_a, amount_b, self.reserves.snapshot())?;
        self.reserves.increase(amount_a, amount_b)?;
        Ok(minted)
    }

    fn withdraw(&mut self, provider: &AccountId, share_amount: Wad) -> Result<(Wad, Wad)> {
        let Self { reserves, ledger, .. } = self;
        ledger.burn_for_withdrawal(provider, share_amount, reserves)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LegKind {
    In,
    Out,
}

/// Uma perna de transferência entre o chamador e a custódia do pool.
#[derive(Clone, Copy, Debug)]
struct Leg<'a> {
    kind: LegKind,
    asset: Asset,
    account: &'a AccountId,
    amount: Wad,
}

impl<'a> Leg<'a> {
    fn inbound(asset: Asset, account: &'a AccountId, amount: Wad) -> Self {
        Self { kind: LegKind::In, asset, account, amount }
    }

    fn outbound(asset: Asset, account: &'a AccountId, amount: Wad) -> Self {
        Self { kind: LegKind::Out, asset, account, amount }
    }

    fn reversed(self) -> Self {
        let kind = match self.kind {
            LegKind::In => LegKind::Out,
            LegKind::Out => LegKind::In,
        };
        Self { kind, ..self }
    }
}

/// Pool AMM de produto constante entre os ativos A e B.
pub struct Amm<L, S = NoopSink> {
    config: AmmConfig,
    engine: SwapEngine,
    token_ledger: L,
    sink: S,
    state: Mutex<PoolState>,
    #[cfg(test)]
    shrink_k_on_next_swap: std::sync::atomic::AtomicBool,
}

impl<L: TokenLedger> Amm<L, NoopSink> {
    /// Pool vazio sem destino de eventos.
    pub fn new(config: AmmConfig, token_ledger: L) -> Result<Self> {
        Self::with_sink(config, token_ledger, NoopSink)
    }
}

impl<L: TokenLedger, S: EventSink> Amm<L, S> {
    pub fn with_sink(config: AmmConfig, token_ledger: L, sink: S) -> Result<Self> {
        let engine = SwapEngine::new(config.fee_bps())?;
        Ok(Self {
            config,
            engine,
            token_ledger,
            sink,
            state: Mutex::new(PoolState::default()),
            #[cfg(test)]
            shrink_k_on_next_swap: std::sync::atomic::AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> AmmConfig {
        self.config
    }

    pub fn token_ledger(&self) -> &L {
        &self.token_ledger
    }

    // ---------------- escrita ----------------

    /// Deposita `(amount_a, amount_b)` e devolve as shares mintadas.
    pub fn add_liquidity(&self, provider: &AccountId, amount_a: Wad, amount_b: Wad) -> Result<Wad> {
        let span = info_span!(
            "amm.add_liquidity",
            provider = %provider,
            amount_a = %amount_a,
            amount_b = %amount_b
        );
        let _guard = span.enter();
        let result = wrap::time("add_liquidity", || self.add_liquidity_inner(provider, amount_a, amount_b));
        observe("add_liquidity", result)
    }

    fn add_liquidity_inner(&self, provider: &AccountId, amount_a: Wad, amount_b: Wad) -> Result<Wad> {
        ensure_nonzero("amount_a", amount_a)?;
        ensure_nonzero("amount_b", amount_b)?;
        let mut state = self.lock_for_write()?;
        let checkpoint = state.checkpoint(provider);

        let result = state.deposit(provider, amount_a, amount_b).and_then(|minted| {
            self.settle(&[
                Leg::inbound(Asset::A, provider, amount_a),
                Leg::inbound(Asset::B, provider, amount_b),
            ])?;
            Ok(minted)
        });
        let minted = match result {
            Ok(minted) => minted,
            Err(err) => {
                state.restore(checkpoint);
                return Err(err);
            }
        };

        debug!(
            shares_minted = %minted,
            total_shares = %state.ledger.total_shares(),
            reserve_a = %state.reserves.snapshot().a,
            reserve_b = %state.reserves.snapshot().b,
            "liquidez adicionada"
        );
        self.sink.emit(&PoolEvent::LiquidityAdded {
            provider: provider.clone(),
            amount_a,
            amount_b,
            shares_minted: minted,
        });
        Ok(minted)
    }

    /// Queima `share_amount` shares e paga ao provedor a parte proporcional.
    pub fn remove_liquidity(&self, provider: &AccountId, share_amount: Wad) -> Result<(Wad, Wad)> {
        let span = info_span!("amm.remove_liquidity", provider = %provider, share_amount = %share_amount);
        let _guard = span.enter();
        let result = wrap::time("remove_liquidity", || self.remove_liquidity_inner(provider, share_amount));
        observe("remove_liquidity", result)
    }

    fn remove_liquidity_inner(&self, provider: &AccountId, share_amount: Wad) -> Result<(Wad, Wad)> {
        ensure_nonzero("share_amount", share_amount)?;
        let mut state = self.lock_for_write()?;
        let checkpoint = state.checkpoint(provider);

        let result = state.withdraw(provider, share_amount).and_then(|(amount_a, amount_b)| {
            self.settle(&[
                Leg::outbound(Asset::A, provider, amount_a),
                Leg::outbound(Asset::B, provider, amount_b),
            ])?;
            Ok((amount_a, amount_b))
        });
        let (amount_a, amount_b) = match result {
            Ok(amounts) => amounts,
            Err(err) => {
                state.restore(checkpoint);
                return Err(err);
            }
        };

        debug!(
            amount_a = %amount_a,
            amount_b = %amount_b,
            total_shares = %state.ledger.total_shares(),
            "liquidez removida"
        );
        self.sink.emit(&PoolEvent::LiquidityRemoved {
            provider: provider.clone(),
            amount_a,
            amount_b,
            shares_burned: share_amount,
        });
        Ok((amount_a, amount_b))
    }

    /// Vende `amount_in` de A por B; devolve `amount_out`.
    pub fn swap_a_for_b(&self, trader: &AccountId, amount_in: Wad) -> Result<Wad> {
        self.swap_exact_in(trader, Direction::AToB, amount_in, 0)
            .map(|outcome| outcome.amount_out)
    }

    /// Vende `amount_in` de B por A; devolve `amount_out`.
    pub fn swap_b_for_a(&self, trader: &AccountId, amount_in: Wad) -> Result<Wad> {
        self.swap_exact_in(trader, Direction::BToA, amount_in, 0)
            .map(|outcome| outcome.amount_out)
    }

    /// Swap com input exato e saída mínima aceita.
    pub fn swap_exact_in(
        &self,
        trader: &AccountId,
        direction: Direction,
        amount_in: Wad,
        min_amount_out: Wad,
    ) -> Result<SwapOutcome> {
        let span = info_span!(
            "amm.swap",
            trader = %trader,
            direction = %direction,
            amount_in = %amount_in,
            min_amount_out = %min_amount_out
        );
        let _guard = span.enter();
        let result = wrap::time("swap", || self.swap_inner(trader, direction, amount_in, min_amount_out));
        observe("swap", result)
    }

    fn swap_inner(
        &self,
        trader: &AccountId,
        direction: Direction,
        amount_in: Wad,
        min_amount_out: Wad,
    ) -> Result<SwapOutcome> {
        ensure_nonzero("amount_in", amount_in)?;
        let mut state = self.lock_for_write()?;
        let reserves_before = state.reserves;

        let quote = self.engine.quote(direction, amount_in, reserves_before.snapshot())?;
        if quote.amount_out < min_amount_out {
            return Err(amm_err!(
                AmmErrorCode::SlippageExceeded,
                amount_out => quote.amount_out,
                min_amount_out => min_amount_out,
            ));
        }

        #[cfg(test)]
        let quote = self.tampered(quote);

        let outcome = match self.engine.commit(quote, &mut state.reserves) {
            Ok(outcome) => outcome,
            Err(err) if err.code == AmmErrorCode::InvariantViolated => {
                state.reserves = reserves_before;
                state.halted = true;
                error!(error = %err.to_log_json(), "instância parada");
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        if let Err(err) = self.settle(&[
            Leg::inbound(direction.asset_in(), trader, amount_in),
            Leg::outbound(direction.asset_out(), trader, outcome.amount_out),
        ]) {
            state.reserves = reserves_before;
            return Err(err);
        }

        wrap::record_k_growth(outcome.reserves_before, outcome.reserves_after);
        debug!(
            amount_out = %outcome.amount_out,
            reserve_a = %outcome.reserves_after.a,
            reserve_b = %outcome.reserves_after.b,
            "swap executado"
        );
        self.sink.emit(&PoolEvent::Swap {
            trader: trader.clone(),
            direction,
            amount_in,
            amount_out: outcome.amount_out,
        });
        Ok(outcome)
    }

    // ---------------- leitura ----------------

    pub fn get_reserves(&self) -> (Wad, Wad) {
        let reserves = self.read().reserves.snapshot();
        (reserves.a, reserves.b)
    }

    /// Preço de A em B (WAD); 0 sem liquidez.
    pub fn get_price(&self) -> Result<Wad> {
        pricing::get_price(self.read().reserves.snapshot())
    }

    pub fn total_liquidity(&self) -> Wad {
        self.read().ledger.total_shares()
    }

    /// Saldos de LP por provedor, em ordem de `AccountId`.
    pub fn providers(&self) -> Vec<(AccountId, Wad)> {
        self.read()
            .ledger
            .providers()
            .map(|(id, shares)| (id.clone(), shares))
            .collect()
    }

    pub fn liquidity(&self, provider: &AccountId) -> Wad {
        self.read().ledger.balance_of(provider)
    }

    /// Saída de um swap hipotético; pura, não lê o estado do pool.
    pub fn get_amount_out(&self, amount_in: Wad, reserve_in: Wad, reserve_out: Wad) -> Result<Wad> {
        self.engine.compute_amount_out(amount_in, reserve_in, reserve_out)
    }

    /// Menor input para obter `amount_out`; pura, não lê o estado do pool.
    pub fn get_amount_in(&self, amount_out: Wad, reserve_in: Wad, reserve_out: Wad) -> Result<Wad> {
        self.engine.compute_amount_in(amount_out, reserve_in, reserve_out)
    }

    pub fn quote_swap(&self, direction: Direction, amount_in: Wad) -> Result<SwapOutcome> {
        self.engine.quote(direction, amount_in, self.read().reserves.snapshot())
    }

    pub fn quote_add_liquidity(&self, amount_a: Wad, amount_b: Wad) -> Result<Wad> {
        let state = self.read();
        shares_for_deposit(amount_a, amount_b, state.reserves.snapshot(), state.ledger.total_shares())
    }

    pub fn quote_remove_liquidity(&self, share_amount: Wad) -> Result<(Wad, Wad)> {
        let state = self.read();
        amounts_for_burn(share_amount, state.reserves.snapshot(), state.ledger.total_shares())
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let state = self.read();
        let reserves = state.reserves.snapshot();
        PoolSnapshot {
            reserves,
            total_shares: state.ledger.total_shares(),
            k: reserves.k(),
            fee_bps: self.config.fee_bps(),
            halted: state.halted,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_poisoned() || self.read().halted
    }

    // ---------------- internos ----------------

    /// Deixa o lado de entrada como estava: `k'` cai pelo `amount_out`.
    #[cfg(test)]
    fn tampered(&self, mut outcome: SwapOutcome) -> SwapOutcome {
        use std::sync::atomic::Ordering;
        if self.shrink_k_on_next_swap.swap(false, Ordering::SeqCst) {
            let (before, after) = (outcome.reserves_before, outcome.reserves_after);
            outcome.reserves_after = match outcome.direction {
                Direction::AToB => Reserves::new(before.a, after.b),
                Direction::BToA => Reserves::new(after.a, before.b),
            };
        }
        outcome
    }

    fn lock_for_write(&self) -> Result<MutexGuard<'_, PoolState>> {
        let state = self
            .state
            .lock()
            .map_err(|_| amm_err!(AmmErrorCode::EngineHalted, { "cause" => "poisoned" }))?;
        if state.halted {
            return Err(amm_err!(AmmErrorCode::EngineHalted));
        }
        Ok(state)
    }

    /// Leituras seguem possíveis mesmo com a instância parada.
    fn read(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn execute(&self, leg: Leg<'_>) -> Result<()> {
        let outcome = match leg.kind {
            LegKind::In => self.token_ledger.transfer_in(leg.asset, leg.account, leg.amount),
            LegKind::Out => self.token_ledger.transfer_out(leg.asset, leg.account, leg.amount),
        };
        outcome.map_err(|rejected| {
            amm_err!(
                AmmErrorCode::TransferFailed,
                asset => leg.asset,
                account => leg.account,
                amount => leg.amount,
                reason => rejected.reason,
            )
        })
    }

    /// Executa as pernas em ordem; numa recusa, desfaz as anteriores.
    fn settle(&self, legs: &[Leg<'_>]) -> Result<()> {
        for (idx, leg) in legs.iter().enumerate() {
            if leg.amount == 0 {
                continue;
            }
            if let Err(err) = self.execute(*leg) {
                for done in legs[..idx].iter().rev().filter(|l| l.amount > 0) {
                    if let Err(comp) = self.execute(done.reversed()) {
                        error!(error = %comp.to_log_json(), "compensação de transferência falhou");
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

fn observe<T>(op: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        wrap::count_rejection(op, err.code.code());
        if err.code.is_internal() {
            error!(op, error = %err.to_log_json(), "operação abortada por defeito interno");
        } else {
            warn!(op, error = %err.to_log_json(), "operação rejeitada");
        }
    }
    result
}
