//! Swap CPMM (x·y=k) com taxa sobre o input.
//! - get_amount_out: saída para um input bruto
//! - get_amount_in: menor input bruto que entrega ao menos `amount_out`
//! - SwapEngine::swap: aplica o swap nas reservas e confere `k' >= k`

use tracing::error;

use super::error::Result;
use super::error_catalog::AmmErrorCode;
use super::fixed_point::{checked_add, checked_sub, mul_div, mul_div_ceil};
use super::guardrails::{ensure_fee, ensure_nonzero, ensure_reserves};
use super::reserves::ReservePair;
use super::types::{Bps, Direction, Reserves, Wad, BPS_SCALE};
use crate::amm_err;

/// Input líquido após a taxa: `floor(amount_in * (10000 - fee) / 10000)`.
/// O resto (a taxa, arredondada para cima) fica nas reservas.
#[inline]
pub fn amount_after_fee(amount_in: Wad, fee_bps: Bps) -> Result<Wad> {
    mul_div(amount_in, Wad::from(BPS_SCALE - fee_bps), Wad::from(BPS_SCALE))
}

/// `reserve_out * net / (reserve_in + net)`, com `net` já descontada a taxa.
///
/// A saída é sempre `< reserve_out`: a curva é assintótica e nenhum input finito
/// esvazia o pool. Um input pequeno demais pode resultar em 0.
pub fn get_amount_out(amount_in: Wad, reserve_in: Wad, reserve_out: Wad, fee_bps: Bps) -> Result<Wad> {
    ensure_nonzero("amount_in", amount_in)?;
    ensure_fee(fee_bps)?;
    ensure_reserves(reserve_in, reserve_out)?;
    let net = amount_after_fee(amount_in, fee_bps)?;
    let denominator = checked_add(reserve_in, net)?;
    mul_div(reserve_out, net, denominator)
}

/// Menor input bruto tal que `get_amount_out(dx, ..) >= amount_out`.
///
/// 1) net = ceil( reserve_in * dy / (reserve_out - dy) )
/// 2) dx  = ceil( net * 10000 / (10000 - fee) )
///
/// Os dois passos são exatos em inteiros (floor(z) >= dy <=> z >= dy para dy
/// inteiro), então não há busca nem correção posterior.
pub fn get_amount_in(amount_out: Wad, reserve_in: Wad, reserve_out: Wad, fee_bps: Bps) -> Result<Wad> {
    ensure_nonzero("amount_out", amount_out)?;
    ensure_fee(fee_bps)?;
    ensure_reserves(reserve_in, reserve_out)?;
    if amount_out >= reserve_out {
        return Err(amm_err!(
            AmmErrorCode::InsufficientReserves,
            amount_out => amount_out,
            reserve_out => reserve_out,
        ));
    }
    let net = mul_div_ceil(reserve_in, amount_out, reserve_out - amount_out)?;
    mul_div_ceil(net, Wad::from(BPS_SCALE), Wad::from(BPS_SCALE - fee_bps))
}

/// Confere que o produto das reservas não diminuiu.
pub fn check_k_monotonic(before: Reserves, after: Reserves) -> Result<()> {
    let (k0, k1) = (before.k(), after.k());
    if k1 < k0 {
        error!(k_before = %k0, k_after = %k1, "invariante k diminuiu após swap");
        return Err(amm_err!(AmmErrorCode::InvariantViolated, k_before => k0, k_after => k1));
    }
    Ok(())
}

/// Resultado de um swap (cotado ou aplicado).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapOutcome {
    pub direction: Direction,
    pub amount_in: Wad,
    pub amount_out: Wad,
    pub reserves_before: Reserves,
    pub reserves_after: Reserves,
}

/// Motor de swap com taxa fixa em bps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapEngine {
    fee_bps: Bps,
}

impl SwapEngine {
    pub fn new(fee_bps: Bps) -> Result<Self> {
        ensure_fee(fee_bps)?;
        Ok(Self { fee_bps })
    }

    pub fn fee_bps(&self) -> Bps {
        self.fee_bps
    }

    pub fn compute_amount_out(&self, amount_in: Wad, reserve_in: Wad, reserve_out: Wad) -> Result<Wad> {
        get_amount_out(amount_in, reserve_in, reserve_out, self.fee_bps)
    }

    pub fn compute_amount_in(&self, amount_out: Wad, reserve_in: Wad, reserve_out: Wad) -> Result<Wad> {
        get_amount_in(amount_out, reserve_in, reserve_out, self.fee_bps)
    }

    /// Calcula o swap sem tocar as reservas.
    pub fn quote(&self, direction: Direction, amount_in: Wad, reserves: Reserves) -> Result<SwapOutcome> {
        let (reserve_in, reserve_out) = reserves.oriented(direction);
        let amount_out = self.compute_amount_out(amount_in, reserve_in, reserve_out)?;
        if amount_out == 0 {
            return Err(amm_err!(AmmErrorCode::InputTooSmall, amount_in => amount_in, amount_out => 0));
        }
        let new_in = checked_add(reserve_in, amount_in)?;
        let new_out = checked_sub(reserve_out, amount_out)?;
        let reserves_after = match direction {
            Direction::AToB => Reserves::new(new_in, new_out),
            Direction::BToA => Reserves::new(new_out, new_in),
        };
        Ok(SwapOutcome {
            direction,
            amount_in,
            amount_out,
            reserves_before: reserves,
            reserves_after,
        })
    }

    /// Aplica o swap: a reserva de entrada sobe `amount_in` (taxa inclusa), a de
    /// saída cai `amount_out`. Só escreve depois de validar `k' >= k`.
    pub fn swap(&self, direction: Direction, amount_in: Wad, reserves: &mut ReservePair) -> Result<SwapOutcome> {
        let outcome = self.quote(direction, amount_in, reserves.snapshot())?;
        self.commit(outcome, reserves)
    }

    /// Grava `outcome.reserves_after` se `k' >= k`; senão não toca as reservas.
    pub fn commit(&self, outcome: SwapOutcome, reserves: &mut ReservePair) -> Result<SwapOutcome> {
        check_k_monotonic(outcome.reserves_before, outcome.reserves_after)?;
        *reserves = ReservePair::from_reserves(outcome.reserves_after);
        Ok(outcome)
    }
}

// -------------------------
// TESTES
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::types::{DEFAULT_FEE_BPS, U256, WAD};

    const FEE0: Bps = 0;
    const FEE30: Bps = DEFAULT_FEE_BPS;

    #[test]
    fn t_out_matches_documented_formula() {
        let (rin, rout, dx) = (100 * WAD, 200 * WAD, 10 * WAD);
        let out = get_amount_out(dx, rin, rout, FEE30).unwrap();
        let net = dx * 9_970 / 10_000;
        let expected = (U256::from(rout) * U256::from(net)) / U256::from(rin + net);
        assert_eq!(out, expected.as_u128());
        assert!(out < rout);
    }

    #[test]
    fn t_out_no_fee_symmetric() {
        let out = get_amount_out(100, 1_000, 1_000, FEE0).unwrap();
        // 1000*100/1100 = 90.9
        assert_eq!(out, 90);
    }

    #[test]
    fn t_dust_input_rounds_to_zero() {
        // 1 * 9970 / 10000 = 0 ⇒ saída 0
        assert_eq!(get_amount_out(1, 1_000, 1_000, FEE30).unwrap(), 0);
    }

    #[test]
    fn t_huge_input_never_drains() {
        let out = get_amount_out(u128::MAX / 2, 1_000, 1_000, FEE0).unwrap();
        assert!(out < 1_000);
    }

    #[test]
    fn t_in_for_target_out_is_minimal() {
        let (rin, rout, dy) = (1_000_000 * WAD, 1_000_000 * WAD, 9_870 * WAD);
        let dx = get_amount_in(dy, rin, rout, FEE30).unwrap();
        let out_prev = get_amount_out(dx - 1, rin, rout, FEE30).unwrap_or(0);
        assert!(out_prev < dy);
        assert!(get_amount_out(dx, rin, rout, FEE30).unwrap() >= dy);
    }

    #[test]
    fn t_in_rejects_draining_target() {
        let err = get_amount_in(1_000, 1_000, 1_000, FEE0).unwrap_err();
        assert_eq!(err, AmmErrorCode::InsufficientReserves);
    }

    #[test]
    fn t_zero_and_empty_rejected() {
        assert_eq!(get_amount_out(0, 1, 1, FEE0).unwrap_err(), AmmErrorCode::ZeroAmount);
        assert_eq!(
            get_amount_out(1, 0, 1, FEE0).unwrap_err(),
            AmmErrorCode::InsufficientReserves
        );
        assert_eq!(SwapEngine::new(10_000).unwrap_err(), AmmErrorCode::InvalidFee);
    }

    #[test]
    fn t_swap_updates_reserves_and_grows_k() {
        let engine = SwapEngine::new(FEE30).unwrap();
        let mut reserves = ReservePair::new();
        reserves.increase(100 * WAD, 200 * WAD).unwrap();
        let k0 = reserves.snapshot().k();
        let outcome = engine.swap(Direction::AToB, 10 * WAD, &mut reserves).unwrap();
        assert_eq!(
            reserves.snapshot(),
            Reserves::new(110 * WAD, 200 * WAD - outcome.amount_out)
        );
        assert!(reserves.snapshot().k() > k0);

        let back = engine.swap(Direction::BToA, outcome.amount_out, &mut reserves).unwrap();
        // ida e volta com taxa devolve menos que o input
        assert!(back.amount_out < 10 * WAD);
    }

    #[test]
    fn t_swap_dust_leaves_reserves() {
        let engine = SwapEngine::new(FEE30).unwrap();
        let mut reserves = ReservePair::new();
        reserves.increase(1_000, 1_000).unwrap();
        let err = engine.swap(Direction::AToB, 1, &mut reserves).unwrap_err();
        assert_eq!(err, AmmErrorCode::InputTooSmall);
        assert_eq!(reserves.snapshot(), Reserves::new(1_000, 1_000));
    }

    #[test]
    fn t_k_check_flags_decrease() {
        let err = check_k_monotonic(Reserves::new(10, 10), Reserves::new(11, 9)).unwrap_err();
        assert_eq!(err, AmmErrorCode::InvariantViolated);
        assert!(err.code.is_internal());
        assert!(check_k_monotonic(Reserves::new(10, 10), Reserves::new(10, 10)).is_ok());
    }
}
