//! Liquidez (CPMM): mint inicial, add e remove de shares.
//! Políticas:
//! - shares_mint: **floor**
//! - amounts_out em burn: **floor**
//! - burn de 100% do supply devolve exatamente as reservas (zera o pool)

use std::collections::BTreeMap;

use super::error::Result;
use super::error_catalog::AmmErrorCode;
use super::fixed_point::{checked_add, mul_div, sqrt_product};
use super::guardrails::ensure_nonzero;
use super::reserves::ReservePair;
use super::types::{AccountId, Reserves, Wad};
use crate::amm_err;

/// Mint **inicial** de shares: `floor(sqrt(a*b))`.
pub fn initial_mint(amount_a: Wad, amount_b: Wad) -> Result<Wad> {
    ensure_nonzero("amount_a", amount_a)?;
    ensure_nonzero("amount_b", amount_b)?;
    let shares = sqrt_product(amount_a, amount_b);
    if shares == 0 {
        return Err(amm_err!(AmmErrorCode::InputTooSmall, shares => 0));
    }
    Ok(shares)
}

/// Shares a mintar para um depósito `(amount_a, amount_b)`.
///
/// Pool vazio (`total_shares == 0`): [`initial_mint`]. Caso contrário,
/// `min(amount_a * S / reserve_a, amount_b * S / reserve_b)`: o lado menos
/// generoso manda, e o excesso do outro lado fica no pool.
pub fn shares_for_deposit(
    amount_a: Wad,
    amount_b: Wad,
    reserves: Reserves,
    total_shares: Wad,
) -> Result<Wad> {
    if total_shares == 0 {
        return initial_mint(amount_a, amount_b);
    }
    ensure_nonzero("amount_a", amount_a)?;
    ensure_nonzero("amount_b", amount_b)?;
    if reserves.a == 0 || reserves.b == 0 {
        return Err(amm_err!(
            AmmErrorCode::InsufficientReserves,
            reserve_a => reserves.a,
            reserve_b => reserves.b,
        ));
    }
    let by_a = mul_div(amount_a, total_shares, reserves.a)?;
    let by_b = mul_div(amount_b, total_shares, reserves.b)?;
    let shares = by_a.min(by_b);
    if shares == 0 {
        return Err(amm_err!(AmmErrorCode::InputTooSmall, shares => 0));
    }
    Ok(shares)
}

/// Resgate proporcional de `share_amount`: `(reserve_a * s / S, reserve_b * s / S)`.
pub fn amounts_for_burn(share_amount: Wad, reserves: Reserves, total_shares: Wad) -> Result<(Wad, Wad)> {
    ensure_nonzero("share_amount", share_amount)?;
    if share_amount > total_shares {
        return Err(amm_err!(
            AmmErrorCode::InsufficientShares,
            requested => share_amount,
            total_shares => total_shares,
        ));
    }
    if share_amount == total_shares {
        return Ok((reserves.a, reserves.b));
    }
    let out_a = mul_div(reserves.a, share_amount, total_shares)?;
    let out_b = mul_div(reserves.b, share_amount, total_shares)?;
    if out_a == 0 && out_b == 0 {
        return Err(amm_err!(AmmErrorCode::InputTooSmall, share_amount => share_amount));
    }
    Ok((out_a, out_b))
}

/// Ponto de restauração do ledger para uma operação de um único provedor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerCheckpoint {
    provider: AccountId,
    balance: Option<Wad>,
    total_shares: Wad,
}

/// Saldos de LP por provedor e supply total.
///
/// Invariante: `total_shares == soma(shares)`. Entradas são criadas no
/// primeiro depósito e permanecem (mesmo zeradas) pela vida da instância.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiquidityLedger {
    shares: BTreeMap<AccountId, Wad>,
    total_shares: Wad,
}

impl LiquidityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_shares(&self) -> Wad {
        self.total_shares
    }

    /// Saldo do provedor (0 se nunca depositou).
    pub fn balance_of(&self, provider: &AccountId) -> Wad {
        self.shares.get(provider).copied().unwrap_or(0)
    }

    /// `true` se o provedor já teve uma entrada criada.
    pub fn is_known(&self, provider: &AccountId) -> bool {
        self.shares.contains_key(provider)
    }

    pub fn providers(&self) -> impl Iterator<Item = (&AccountId, Wad)> {
        self.shares.iter().map(|(id, bal)| (id, *bal))
    }

    /// Calcula as shares do depósito e credita o provedor.
    /// Não altera as reservas: cabe ao chamador aplicar `ReservePair::increase`.
    pub fn mint_for_deposit(
        &mut self,
        provider: &AccountId,
        amount_a: Wad,
        amount_b: Wad,
        reserves: Reserves,
    ) -> Result<Wad> {
        let minted = shares_for_deposit(amount_a, amount_b, reserves, self.total_shares)?;
        let total = checked_add(self.total_shares, minted)?;
        let balance = checked_add(self.balance_of(provider), minted)?;
        self.shares.insert(provider.clone(), balance);
        self.total_shares = total;
        Ok(minted)
    }

    /// Queima `share_amount` do provedor e retira das reservas a parte proporcional.
    pub fn burn_for_withdrawal(
        &mut self,
        provider: &AccountId,
        share_amount: Wad,
        reserves: &mut ReservePair,
    ) -> Result<(Wad, Wad)> {
        ensure_nonzero("share_amount", share_amount)?;
        let balance = self.balance_of(provider);
        if share_amount > balance {
            return Err(amm_err!(
                AmmErrorCode::InsufficientShares,
                provider => provider,
                requested => share_amount,
                balance => balance,
            ));
        }
        let (out_a, out_b) = amounts_for_burn(share_amount, reserves.snapshot(), self.total_shares)?;
        reserves.decrease(out_a, out_b)?;
        // balance <= total_shares pelo invariante do ledger
        self.shares.insert(provider.clone(), balance - share_amount);
        self.total_shares -= share_amount;
        Ok((out_a, out_b))
    }

    pub fn checkpoint(&self, provider: &AccountId) -> LedgerCheckpoint {
        LedgerCheckpoint {
            provider: provider.clone(),
            balance: self.shares.get(provider).copied(),
            total_shares: self.total_shares,
        }
    }

    /// Desfaz as mutações feitas desde `checkpoint`.
    pub fn restore(&mut self, checkpoint: LedgerCheckpoint) {
        match checkpoint.balance {
            Some(balance) => {
                self.shares.insert(checkpoint.provider, balance);
            }
            None => {
                self.shares.remove(&checkpoint.provider);
            }
        }
        self.total_shares = checkpoint.total_shares;
    }
}
