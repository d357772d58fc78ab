//! Visão de preço derivada das reservas: spot, execução, slippage e cotas.
//! Preços em escala WAD (1e18), divisão interna nearest-even.

use super::error::Result;
use super::fixed_point::{div_nearest_even_u256, div_nearest_even_u256_to_u128, mul_div, u256_to_u128_checked};
use super::guardrails::{ensure_nonzero, ensure_reserves};
use super::swap::get_amount_out;
use super::types::{Bps, Direction, Ppm, Reserves, Wad, PPM_SCALE, U256, WAD};

/// Preço à vista de 1 A em B: **p = reserve_b / reserve_a** (em WAD).
///
/// Sem liquidez (`reserve_a == 0`) o preço é indefinido e a função devolve o
/// sentinela 0 em vez de falhar.
pub fn get_price(reserves: Reserves) -> Result<Wad> {
    if reserves.a == 0 {
        return Ok(0);
    }
    div_nearest_even_u256_to_u128(U256::from(reserves.b) * U256::from(WAD), U256::from(reserves.a))
}

/// Preço à vista de 1 B em A: **p = reserve_a / reserve_b** (em WAD), 0 sem liquidez.
pub fn spot_price_b_in_a(reserves: Reserves) -> Result<Wad> {
    if reserves.b == 0 {
        return Ok(0);
    }
    div_nearest_even_u256_to_u128(U256::from(reserves.a) * U256::from(WAD), U256::from(reserves.b))
}

fn spot_price(reserves: Reserves, direction: Direction) -> Result<Wad> {
    match direction {
        Direction::AToB => get_price(reserves),
        Direction::BToA => spot_price_b_in_a(reserves),
    }
}

/// Preço efetivo de execução: **out / amount_in** (em WAD), taxa inclusa.
pub fn execution_price(reserves: Reserves, direction: Direction, amount_in: Wad, fee_bps: Bps) -> Result<Wad> {
    ensure_nonzero("amount_in", amount_in)?;
    let (reserve_in, reserve_out) = reserves.oriented(direction);
    ensure_reserves(reserve_in, reserve_out)?;
    let out = get_amount_out(amount_in, reserve_in, reserve_out, fee_bps)?;
    div_nearest_even_u256_to_u128(U256::from(out) * U256::from(WAD), U256::from(amount_in))
}

/// Slippage relativo em **PPM** do preço de execução contra o spot (sempre ≥ 0):
/// slippage_ppm = ((spot - p_exec) / spot) * 1e6
pub fn slippage_ppm(reserves: Reserves, direction: Direction, amount_in: Wad, fee_bps: Bps) -> Result<Ppm> {
    let exec = execution_price(reserves, direction, amount_in, fee_bps)?;
    let spot = spot_price(reserves, direction)?;
    if exec >= spot || spot == 0 {
        return Ok(0);
    }
    let num = (U256::from(spot) - U256::from(exec)) * U256::from(PPM_SCALE);
    let q = u256_to_u128_checked(div_nearest_even_u256(num, U256::from(spot))?)?;
    Ok(q.min(u128::from(PPM_SCALE)) as Ppm)
}

/// Estimativa linear (sem curvatura): `amount_in * reserve_out / reserve_in`.
pub fn linear_estimate(amount_in: Wad, reserve_in: Wad, reserve_out: Wad) -> Result<Wad> {
    ensure_reserves(reserve_in, reserve_out)?;
    mul_div(amount_in, reserve_out, reserve_in)
}

/// **min_out** aceito para um swap considerando `tolerance_ppm` (0..1e6):
/// min_out = floor( out * (1 - tol) )
pub fn min_out_with_tolerance(
    reserves: Reserves,
    direction: Direction,
    amount_in: Wad,
    fee_bps: Bps,
    tolerance_ppm: Ppm,
) -> Result<Wad> {
    let (reserve_in, reserve_out) = reserves.oriented(direction);
    let out = get_amount_out(amount_in, reserve_in, reserve_out, fee_bps)?;
    let tol = tolerance_ppm.min(PPM_SCALE);
    mul_div(out, u128::from(PPM_SCALE - tol), u128::from(PPM_SCALE))
}
