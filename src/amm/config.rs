//! Configuração do motor (taxa de swap).

use super::error::Result;
use super::error_catalog::AmmErrorCode;
use super::guardrails::ensure_fee;
use super::types::{Bps, DEFAULT_FEE_BPS};
use crate::amm_err;

/// Variável de ambiente com a taxa em bps.
pub const FEE_BPS_ENV: &str = "DEX_FEE_BPS";

/// Parâmetros imutáveis de um pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmmConfig {
    fee_bps: Bps,
}

impl Default for AmmConfig {
    fn default() -> Self {
        Self {
            fee_bps: DEFAULT_FEE_BPS,
        }
    }
}

impl AmmConfig {
    /// Valida `fee_bps < 10_000`.
    pub fn new(fee_bps: Bps) -> Result<Self> {
        ensure_fee(fee_bps)?;
        Ok(Self { fee_bps })
    }

    /// Lê `DEX_FEE_BPS`; ausente ⇒ padrão (30 bps).
    pub fn from_env() -> Result<Self> {
        match std::env::var(FEE_BPS_ENV) {
            Ok(raw) => Self::parse_fee(&raw),
            Err(_) => Ok(Self::default()),
        }
    }

    fn parse_fee(raw: &str) -> Result<Self> {
        let fee_bps = raw
            .trim()
            .parse::<Bps>()
            .map_err(|_| amm_err!(AmmErrorCode::InvalidFee, { FEE_BPS_ENV => raw }))?;
        Self::new(fee_bps)
    }

    pub fn fee_bps(&self) -> Bps {
        self.fee_bps
    }
}
