//! Primitivas numéricas com checagem de estouro.
//!
//! Quantidades vivem em `u128` ([`Wad`]); todo produto intermediário é feito
//! em [`U256`], de modo que `a * b` nunca estoura. O único ponto de falha é o
//! downcast do resultado para `u128` (ou divisão por zero), ambos mapeados para
//! [`AmmErrorCode::Overflow`]. Nenhum caminho usa ponto flutuante.

use super::error::Result;
use super::error_catalog::AmmErrorCode;
use super::types::{Wad, U256};
use crate::amm_err;

#[inline]
pub fn checked_add(a: Wad, b: Wad) -> Result<Wad> {
    a.checked_add(b)
        .ok_or_else(|| amm_err!(AmmErrorCode::Overflow, op => "add", lhs => a, rhs => b))
}

#[inline]
pub fn checked_sub(a: Wad, b: Wad) -> Result<Wad> {
    a.checked_sub(b)
        .ok_or_else(|| amm_err!(AmmErrorCode::Overflow, op => "sub", lhs => a, rhs => b))
}

#[inline]
pub fn mul_u128_to_u256(a: Wad, b: Wad) -> U256 {
    U256::from(a) * U256::from(b)
}

#[inline]
pub fn u256_to_u128_checked(v: U256) -> Result<Wad> {
    if v > U256::from(u128::MAX) {
        Err(amm_err!(AmmErrorCode::Overflow, op => "downcast", value => v))
    } else {
        Ok(v.as_u128())
    }
}

fn ensure_divisor(c: U256) -> Result<()> {
    if c.is_zero() {
        return Err(amm_err!(AmmErrorCode::Overflow, op => "div", divisor => 0));
    }
    Ok(())
}

/// `floor(a * b / c)` com o produto em 256 bits.
pub fn mul_div(a: Wad, b: Wad, c: Wad) -> Result<Wad> {
    let c = U256::from(c);
    ensure_divisor(c)?;
    u256_to_u128_checked(mul_u128_to_u256(a, b) / c)
}

/// `ceil(a * b / c)` com o produto em 256 bits.
pub fn mul_div_ceil(a: Wad, b: Wad, c: Wad) -> Result<Wad> {
    let c = U256::from(c);
    ensure_divisor(c)?;
    let n = mul_u128_to_u256(a, b);
    let q = n / c;
    let q = if (n % c).is_zero() { q } else { q + U256::one() };
    u256_to_u128_checked(q)
}

/// `floor(sqrt(n))` por Newton com truncamento inteiro.
pub fn integer_sqrt_u256(n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    // chute inicial >= sqrt(n): 2^ceil(bits/2)
    let mut x = U256::one() << ((n.bits() + 1) / 2);
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// `floor(sqrt(n))` para `u128`.
pub fn integer_sqrt(n: Wad) -> Wad {
    // sqrt(u128::MAX) < 2^64, então o downcast é sempre seguro
    integer_sqrt_u256(U256::from(n)).low_u128()
}

/// `floor(sqrt(a * b))` sem estouro; usado no mint inicial.
pub fn sqrt_product(a: Wad, b: Wad) -> Wad {
    // sqrt(a*b) <= max(a, b) <= u128::MAX
    integer_sqrt_u256(mul_u128_to_u256(a, b)).low_u128()
}

/// Divisão com arredondamento *nearest (ties-to-even)* em U256 → U256.
pub fn div_nearest_even_u256(n: U256, d: U256) -> Result<U256> {
    ensure_divisor(d)?;
    let q = n / d;
    let r = n % d;
    let two_r = r << 1;
    if two_r < d {
        return Ok(q);
    }
    if two_r > d {
        return Ok(q + U256::one());
    }
    // empate: arredonda para o par
    if q.bit(0) {
        Ok(q + U256::one())
    } else {
        Ok(q)
    }
}

/// Versão que retorna u128 (com checagem de overflow no downcast).
pub fn div_nearest_even_u256_to_u128(n: U256, d: U256) -> Result<Wad> {
    div_nearest_even_u256(n, d).and_then(u256_to_u128_checked)
}
