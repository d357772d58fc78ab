//! Referência de alta precisão ("goldens") baseada em **BigInt/BigRational**
//! para o CPMM (x·y=k) com taxa em bps sobre o **input**.
//!
//! Objetivos:
//! 1. Calcular os resultados **contínuos/exatos** (sem quantização) para swap
//!    e para o input necessário a um alvo de saída.
//! 2. Reproduzir a **política de arredondamento** do core (input líquido floor,
//!    saída floor, input alvo ceil) em BigUint, como oráculo independente da
//!    aritmética U256.
//! 3. Medir o desvio do invariante, `Δk/k`, do **core discreto**.
//!
//! Não entra no caminho de produção: serve a testes e geração de goldens.

use super::error::Result;
use super::error_catalog::AmmErrorCode;
use super::swap;
use super::types::{Bps, Wad, BPS_SCALE};
use crate::amm_err;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

// -------------------------
// Helpers de conversão & arredondamento
// -------------------------
#[inline]
fn bu(v: Wad) -> BigUint {
    BigUint::from(v)
}
#[inline]
fn q(v: Wad) -> BigRational {
    BigRational::from_integer(BigInt::from(v))
}
#[inline]
fn q_from_bu(n: &BigUint, d: &BigUint) -> BigRational {
    BigRational::new(BigInt::from(n.clone()), BigInt::from(d.clone()))
}

fn to_u128(v: &BigInt) -> Result<Wad> {
    v.to_u128()
        .ok_or_else(|| amm_err!(AmmErrorCode::Overflow, { "value" => v }))
}

fn ceil_div_big(n: &BigUint, d: &BigUint) -> BigUint {
    let (quot, rem) = n.div_rem(d);
    if rem.is_zero() {
        quot
    } else {
        quot + BigUint::one()
    }
}

#[inline]
fn fee_rate(fee_bps: Bps) -> BigRational {
    BigRational::new(BigInt::from(fee_bps), BigInt::from(BPS_SCALE))
}

fn check_inputs(amount: Wad, reserve_in: Wad, reserve_out: Wad, fee_bps: Bps) -> Result<()> {
    if amount == 0 {
        return Err(amm_err!(AmmErrorCode::ZeroAmount));
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(amm_err!(AmmErrorCode::InsufficientReserves));
    }
    if fee_bps >= BPS_SCALE {
        return Err(amm_err!(AmmErrorCode::InvalidFee));
    }
    Ok(())
}

// -------------------------
// Contínuo/exato (sem quantização)
// -------------------------
/// Saída contínua, taxa aplicada de forma **exata** (sem floor do input líquido).
pub fn continuous_amount_out(amount_in: Wad, reserve_in: Wad, reserve_out: Wad, fee_bps: Bps) -> Result<BigRational> {
    check_inputs(amount_in, reserve_in, reserve_out, fee_bps)?;
    let one = BigRational::one();
    let net = q(amount_in) * (one - fee_rate(fee_bps));
    let k = q(reserve_in) * q(reserve_out);
    let out_after = k / (q(reserve_in) + net);
    Ok(q(reserve_out) - out_after)
}

/// Input contínuo para atingir `amount_out` (exige `amount_out < reserve_out`).
pub fn continuous_amount_in(amount_out: Wad, reserve_in: Wad, reserve_out: Wad, fee_bps: Bps) -> Result<BigRational> {
    check_inputs(amount_out, reserve_in, reserve_out, fee_bps)?;
    if amount_out >= reserve_out {
        return Err(amm_err!(AmmErrorCode::InsufficientReserves));
    }
    // net = x * dy / (y - dy) ; bruto = net / (1 - fee)
    let net = q(reserve_in) * q(amount_out) / (q(reserve_out) - q(amount_out));
    Ok(net / (BigRational::one() - fee_rate(fee_bps)))
}

// -------------------------
// Política (replica o core em Big-precision)
// -------------------------
/// Saída com a política do core: `net = floor(dx*(1e4-f)/1e4)`, `out = floor(y*net/(x+net))`.
pub fn policy_amount_out(amount_in: Wad, reserve_in: Wad, reserve_out: Wad, fee_bps: Bps) -> Result<Wad> {
    check_inputs(amount_in, reserve_in, reserve_out, fee_bps)?;
    let net = bu(amount_in) * BigUint::from(BPS_SCALE - fee_bps) / BigUint::from(BPS_SCALE);
    let out = bu(reserve_out) * &net / (bu(reserve_in) + &net);
    to_u128(&BigInt::from(out))
}

/// Input com a política do core: ceil nos dois passos.
pub fn policy_amount_in(amount_out: Wad, reserve_in: Wad, reserve_out: Wad, fee_bps: Bps) -> Result<Wad> {
    check_inputs(amount_out, reserve_in, reserve_out, fee_bps)?;
    if amount_out >= reserve_out {
        return Err(amm_err!(AmmErrorCode::InsufficientReserves));
    }
    let net = ceil_div_big(&(bu(reserve_in) * bu(amount_out)), &bu(reserve_out - amount_out));
    let gross = ceil_div_big(
        &(net * BigUint::from(BPS_SCALE)),
        &BigUint::from(BPS_SCALE - fee_bps),
    );
    to_u128(&BigInt::from(gross))
}

// -------------------------
// Estruturas de comparação (goldens)
// -------------------------
#[derive(Debug, Clone)]
pub struct RefOut {
    pub out_core: Wad,
    pub out_policy: Wad,
    pub out_cont_floor: Wad,
    pub out_cont: BigRational,
    pub dk_over_k_core: BigRational, // (k1_core - k0) / k0, com sinal
}

#[derive(Debug, Clone)]
pub struct RefIn {
    pub in_core: Wad,
    pub in_policy: Wad,
    pub in_cont_ceil: Wad,
    pub in_cont: BigRational,
}

/// `Δk/k` com sinal após o core aplicar `amount_in` bruto e pagar `amount_out`.
/// Pool vazio dá 0.
pub fn dk_over_k(amount_in: Wad, amount_out: Wad, reserve_in: Wad, reserve_out: Wad) -> BigRational {
    let k0 = bu(reserve_in) * bu(reserve_out);
    if k0.is_zero() {
        return BigRational::zero();
    }
    let k1 = (BigInt::from(reserve_in) + BigInt::from(amount_in))
        * (BigInt::from(reserve_out) - BigInt::from(amount_out));
    let delta = k1 - BigInt::from(k0.clone());
    BigRational::new(delta, BigInt::from(k0))
}

/// Compara o **core** com a referência (swap com input exato).
pub fn golden_amount_out(amount_in: Wad, reserve_in: Wad, reserve_out: Wad, fee_bps: Bps) -> Result<RefOut> {
    let out_core = swap::get_amount_out(amount_in, reserve_in, reserve_out, fee_bps)?;
    let out_policy = policy_amount_out(amount_in, reserve_in, reserve_out, fee_bps)?;
    let out_cont = continuous_amount_out(amount_in, reserve_in, reserve_out, fee_bps)?;
    let out_cont_floor = to_u128(&out_cont.floor().to_integer())?;
    let dk_over_k_core = dk_over_k(amount_in, out_core, reserve_in, reserve_out);
    Ok(RefOut {
        out_core,
        out_policy,
        out_cont_floor,
        out_cont,
        dk_over_k_core,
    })
}

/// Compara o **core** com a referência (input para alvo de saída).
pub fn golden_amount_in(amount_out: Wad, reserve_in: Wad, reserve_out: Wad, fee_bps: Bps) -> Result<RefIn> {
    let in_core = swap::get_amount_in(amount_out, reserve_in, reserve_out, fee_bps)?;
    let in_policy = policy_amount_in(amount_out, reserve_in, reserve_out, fee_bps)?;
    let in_cont = continuous_amount_in(amount_out, reserve_in, reserve_out, fee_bps)?;
    let in_cont_ceil = to_u128(&in_cont.ceil().to_integer())?;
    Ok(RefIn {
        in_core,
        in_policy,
        in_cont_ceil,
        in_cont,
    })
}

/// `Δk/k` como razão entre BigUints (para bounds em testes).
pub fn ratio(n: &BigUint, d: &BigUint) -> BigRational {
    q_from_bu(n, d)
}
