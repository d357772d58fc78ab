//! Validações de entrada do AMM.
//! Toda falha carrega no contexto o campo ofendido, para logs e UI.

use super::error::Result;
use super::error_catalog::AmmErrorCode;
use super::types::{Bps, Wad, BPS_SCALE};
use crate::amm_err;

#[inline]
pub fn ensure_nonzero(field: &'static str, amount: Wad) -> Result<()> {
    if amount == 0 {
        return Err(amm_err!(AmmErrorCode::ZeroAmount, { "field" => field }));
    }
    Ok(())
}

/// Pool com liquidez nos dois lados.
#[inline]
pub fn ensure_reserves(reserve_in: Wad, reserve_out: Wad) -> Result<()> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(amm_err!(
            AmmErrorCode::InsufficientReserves,
            reserve_in => reserve_in,
            reserve_out => reserve_out,
        ));
    }
    Ok(())
}

#[inline]
pub fn ensure_fee(fee_bps: Bps) -> Result<()> {
    if fee_bps >= BPS_SCALE {
        return Err(amm_err!(AmmErrorCode::InvalidFee, fee_bps => fee_bps));
    }
    Ok(())
}
