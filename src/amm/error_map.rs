//! Mapeamento entre condições de domínio e códigos de erro do AMM.
//! Pré-validação barata para UIs/roteadores, sem tocar o estado do pool.
use crate::amm::error::AmmError;
use crate::amm::error_catalog::AmmErrorCode;
use crate::amm::types::{Bps, Wad, BPS_SCALE, U256};

/// Determina o código de erro para um swap a partir dos inputs brutos.
/// `None` significa que o swap tem saída positiva e reservas representáveis.
pub fn from_swap_inputs(amount_in: Wad, reserves: (Wad, Wad), fee_bps: Bps) -> Option<AmmErrorCode> {
    let (reserve_in, reserve_out) = reserves;
    if amount_in == 0 {
        return Some(AmmErrorCode::ZeroAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Some(AmmErrorCode::InsufficientReserves);
    }
    if fee_bps >= BPS_SCALE {
        return Some(AmmErrorCode::InvalidFee);
    }
    // o swap soma o input bruto à reserva de entrada
    if reserve_in.checked_add(amount_in).is_none() {
        return Some(AmmErrorCode::Overflow);
    }
    let net = U256::from(amount_in) * U256::from(BPS_SCALE - fee_bps) / U256::from(BPS_SCALE);
    if net.is_zero() {
        return Some(AmmErrorCode::InputTooSmall);
    }
    let denominator = U256::from(reserve_in) + net;
    if denominator > U256::from(u128::MAX) {
        return Some(AmmErrorCode::Overflow);
    }
    if (U256::from(reserve_out) * net / denominator).is_zero() {
        return Some(AmmErrorCode::InputTooSmall);
    }
    None
}

/// Determina o código de erro para um burn de shares.
pub fn from_withdraw_inputs(share_amount: Wad, provider_balance: Wad) -> Option<AmmErrorCode> {
    if share_amount == 0 {
        return Some(AmmErrorCode::ZeroAmount);
    }
    if share_amount > provider_balance {
        return Some(AmmErrorCode::InsufficientShares);
    }
    None
}

/// Constrói um [`AmmError`] diretamente de um código.
pub fn to_error(code: AmmErrorCode) -> AmmError {
    AmmError::new(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_zero_amount() {
        assert_eq!(from_swap_inputs(0, (1, 1), 0), Some(AmmErrorCode::ZeroAmount));
    }

    #[test]
    fn detects_empty_pool() {
        assert_eq!(
            from_swap_inputs(1, (0, 1), 0),
            Some(AmmErrorCode::InsufficientReserves)
        );
    }

    #[test]
    fn detects_invalid_fee() {
        assert_eq!(from_swap_inputs(10, (10, 10), 10_000), Some(AmmErrorCode::InvalidFee));
    }

    #[test]
    fn detects_dust() {
        assert_eq!(from_swap_inputs(1, (100, 100), 30), Some(AmmErrorCode::InputTooSmall));
        // net = 1, mas 1 * 1 / 1_000_001 = 0
        assert_eq!(from_swap_inputs(1, (1_000_000, 1), 0), Some(AmmErrorCode::InputTooSmall));
    }

    #[test]
    fn detects_overflow() {
        assert_eq!(
            from_swap_inputs(u128::MAX, (u128::MAX, 10), 0),
            Some(AmmErrorCode::Overflow)
        );
    }

    #[test]
    fn detects_reserve_overflow_from_gross_input() {
        // net cabe no denominador, mas reserve_in + amount_in não cabe em u128
        let reserves = (u128::MAX - 5, u128::MAX);
        assert_eq!(from_swap_inputs(6, reserves, 30), Some(AmmErrorCode::Overflow));
        let engine = crate::amm::swap::SwapEngine::new(30).unwrap();
        let quoted = engine.quote(
            crate::amm::types::Direction::AToB,
            6,
            crate::amm::types::Reserves::new(reserves.0, reserves.1),
        );
        assert_eq!(quoted.unwrap_err(), AmmErrorCode::Overflow);
    }

    #[test]
    fn withdraw_checks() {
        assert_eq!(from_withdraw_inputs(0, 5), Some(AmmErrorCode::ZeroAmount));
        assert_eq!(from_withdraw_inputs(6, 5), Some(AmmErrorCode::InsufficientShares));
        assert_eq!(from_withdraw_inputs(5, 5), None);
    }

    #[test]
    fn ok_path() {
        assert_eq!(from_swap_inputs(10, (100, 100), 30), None);
        assert_eq!(to_error(AmmErrorCode::Overflow), AmmErrorCode::Overflow);
    }
}
