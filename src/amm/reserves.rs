//! Par de reservas do pool com checagens de invariante.

use super::error::Result;
use super::error_catalog::AmmErrorCode;
use super::fixed_point::checked_add;
use super::types::{Reserves, Wad};
use crate::amm_err;

/// Reservas `(a, b)` mantidas pelo pool.
///
/// As duas operações de escrita validam tudo antes de tocar o estado: uma
/// falha nunca deixa o par parcialmente atualizado.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReservePair {
    reserve_a: Wad,
    reserve_b: Wad,
}

impl ReservePair {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_reserves(reserves: Reserves) -> Self {
        Self {
            reserve_a: reserves.a,
            reserve_b: reserves.b,
        }
    }

    /// Soma `delta_a`/`delta_b` às reservas.
    pub fn increase(&mut self, delta_a: Wad, delta_b: Wad) -> Result<Reserves> {
        let a = checked_add(self.reserve_a, delta_a)?;
        let b = checked_add(self.reserve_b, delta_b)?;
        self.reserve_a = a;
        self.reserve_b = b;
        Ok(self.snapshot())
    }

    /// Subtrai `delta_a`/`delta_b`; exige `delta <= reserva` em cada lado.
    pub fn decrease(&mut self, delta_a: Wad, delta_b: Wad) -> Result<Reserves> {
        if delta_a > self.reserve_a || delta_b > self.reserve_b {
            return Err(amm_err!(
                AmmErrorCode::InsufficientReserves,
                delta_a => delta_a,
                delta_b => delta_b,
                reserve_a => self.reserve_a,
                reserve_b => self.reserve_b,
            ));
        }
        self.reserve_a -= delta_a;
        self.reserve_b -= delta_b;
        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> Reserves {
        Reserves::new(self.reserve_a, self.reserve_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_starts_empty() {
        let pair = ReservePair::new();
        assert!(pair.snapshot().is_empty());
    }

    #[test]
    fn t_increase_then_decrease() {
        let mut pair = ReservePair::new();
        assert_eq!(pair.increase(100, 200).unwrap(), Reserves::new(100, 200));
        assert_eq!(pair.decrease(40, 50).unwrap(), Reserves::new(60, 150));
        assert_eq!(pair.decrease(60, 150).unwrap(), Reserves::new(0, 0));
    }

    #[test]
    fn t_decrease_beyond_reserve_leaves_state() {
        let mut pair = ReservePair::new();
        pair.increase(10, 10).unwrap();
        let err = pair.decrease(5, 11).unwrap_err();
        assert_eq!(err, AmmErrorCode::InsufficientReserves);
        assert_eq!(pair.snapshot(), Reserves::new(10, 10));
    }

    #[test]
    fn t_increase_overflow_is_atomic() {
        let mut pair = ReservePair::new();
        pair.increase(1, u128::MAX).unwrap();
        let err = pair.increase(1, 1).unwrap_err();
        assert_eq!(err, AmmErrorCode::Overflow);
        assert_eq!(pair.snapshot(), Reserves::new(1, u128::MAX));
    }
}
