//! Colaborador externo de transferência de tokens.
//!
//! O motor não move saldos: pede ao [`TokenLedger`] para puxar o input do
//! chamador (`transfer_in`) e pagar a saída (`transfer_out`). Cada chamada é
//! atômica do lado do ledger e responde sucesso ou recusa.

use core::fmt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::types::{AccountId, Asset, Wad};

/// Recusa de uma transferência pelo ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRejected {
    pub reason: String,
}

impl TransferRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl fmt::Display for TransferRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transferência recusada: {}", self.reason)
    }
}

impl std::error::Error for TransferRejected {}

pub type TransferResult = std::result::Result<(), TransferRejected>;

/// Ledger de tokens consumido pelo motor.
pub trait TokenLedger {
    /// Move `amount` de `from` para a custódia do pool.
    fn transfer_in(&self, asset: Asset, from: &AccountId, amount: Wad) -> TransferResult;
    /// Move `amount` da custódia do pool para `to`.
    fn transfer_out(&self, asset: Asset, to: &AccountId, amount: Wad) -> TransferResult;
}

impl<L: TokenLedger + ?Sized> TokenLedger for std::sync::Arc<L> {
    fn transfer_in(&self, asset: Asset, from: &AccountId, amount: Wad) -> TransferResult {
        (**self).transfer_in(asset, from, amount)
    }

    fn transfer_out(&self, asset: Asset, to: &AccountId, amount: Wad) -> TransferResult {
        (**self).transfer_out(asset, to, amount)
    }
}

/// Ledger em memória: saldos por (ativo, conta) e uma conta de custódia do pool.
///
/// Útil para testes e para o binário de demonstração. `fail_transfers_of`
/// permite simular recusas de um ativo específico.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: Mutex<HashMap<(Asset, AccountId), Wad>>,
    reject_a: AtomicBool,
    reject_b: AtomicBool,
}

impl InMemoryLedger {
    pub const POOL_ACCOUNT: &'static str = "__pool__";

    pub fn new() -> Self {
        Self::default()
    }

    fn pool() -> AccountId {
        AccountId::from(Self::POOL_ACCOUNT)
    }

    fn reject_flag(&self, asset: Asset) -> &AtomicBool {
        match asset {
            Asset::A => &self.reject_a,
            Asset::B => &self.reject_b,
        }
    }

    /// Credita saldo novo (faucet).
    pub fn mint(&self, asset: Asset, to: &AccountId, amount: Wad) {
        let mut balances = self.balances.lock().unwrap_or_else(|p| p.into_inner());
        let entry = balances.entry((asset, to.clone())).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    pub fn balance_of(&self, asset: Asset, account: &AccountId) -> Wad {
        let balances = self.balances.lock().unwrap_or_else(|p| p.into_inner());
        balances.get(&(asset, account.clone())).copied().unwrap_or(0)
    }

    /// Saldo custodiado pelo pool.
    pub fn pool_balance(&self, asset: Asset) -> Wad {
        self.balance_of(asset, &Self::pool())
    }

    /// Liga/desliga recusa de todas as transferências de `asset`.
    pub fn fail_transfers_of(&self, asset: Asset, fail: bool) {
        self.reject_flag(asset).store(fail, Ordering::SeqCst);
    }

    fn move_balance(&self, asset: Asset, from: &AccountId, to: &AccountId, amount: Wad) -> TransferResult {
        if self.reject_flag(asset).load(Ordering::SeqCst) {
            return Err(TransferRejected::new(format!("ativo {asset} bloqueado")));
        }
        let mut balances = self.balances.lock().unwrap_or_else(|p| p.into_inner());
        let from_balance = balances.get(&(asset, from.clone())).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(TransferRejected::new(format!(
                "saldo insuficiente de {asset} em {from}: {from_balance} < {amount}"
            )));
        }
        let to_balance = balances.get(&(asset, to.clone())).copied().unwrap_or(0);
        let credited = to_balance
            .checked_add(amount)
            .ok_or_else(|| TransferRejected::new(format!("overflow no saldo de {to}")))?;
        balances.insert((asset, from.clone()), from_balance - amount);
        balances.insert((asset, to.clone()), credited);
        Ok(())
    }
}

impl TokenLedger for InMemoryLedger {
    fn transfer_in(&self, asset: Asset, from: &AccountId, amount: Wad) -> TransferResult {
        self.move_balance(asset, from, &Self::pool(), amount)
    }

    fn transfer_out(&self, asset: Asset, to: &AccountId, amount: Wad) -> TransferResult {
        self.move_balance(asset, &Self::pool(), to, amount)
    }
}
