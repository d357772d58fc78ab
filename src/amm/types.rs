//! Tipos básicos do AMM (escala fixa) + U256 para intermediários.

use core::fmt;

use uint::construct_uint;
construct_uint! {
    /// Inteiro de 256 bits para contas intermediárias seguras.
    pub struct U256(4);
}

pub type Wad = u128; // quantidades na menor unidade do ativo
pub type Bps = u32; // 0..10_000
pub type Ppm = u32; // 0..=1_000_000

pub const WAD: Wad = 1_000_000_000_000_000_000u128; // 1e18, escala dos preços
pub const BPS_SCALE: Bps = 10_000;
pub const PPM_SCALE: Ppm = 1_000_000;
pub const DEFAULT_FEE_BPS: Bps = 30; // 0,30%

/// Um dos dois ativos do par.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    A,
    B,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// Sentido de um swap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    AToB,
    BToA,
}

impl Direction {
    /// Ativo que entra no pool.
    pub const fn asset_in(self) -> Asset {
        match self {
            Self::AToB => Asset::A,
            Self::BToA => Asset::B,
        }
    }

    /// Ativo que sai do pool.
    pub const fn asset_out(self) -> Asset {
        match self {
            Self::AToB => Asset::B,
            Self::BToA => Asset::A,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AToB => f.write_str("A->B"),
            Self::BToA => f.write_str("B->A"),
        }
    }
}

/// Identidade opaca de uma conta (provedor de liquidez ou trader).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Leitura imutável das reservas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reserves {
    pub a: Wad,
    pub b: Wad,
}

impl Reserves {
    pub fn new(a: Wad, b: Wad) -> Self {
        Self { a, b }
    }

    /// Invariante `k = a * b` (sem estouro, em 256 bits).
    pub fn k(&self) -> U256 {
        U256::from(self.a) * U256::from(self.b)
    }

    /// `(reserve_in, reserve_out)` para um sentido de swap.
    pub fn oriented(&self, direction: Direction) -> (Wad, Wad) {
        match direction {
            Direction::AToB => (self.a, self.b),
            Direction::BToA => (self.b, self.a),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.a == 0 && self.b == 0
    }
}

impl From<(Wad, Wad)> for Reserves {
    fn from((a, b): (Wad, Wad)) -> Self {
        Self { a, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_assets() {
        assert_eq!(Direction::AToB.asset_in(), Asset::A);
        assert_eq!(Direction::AToB.asset_out(), Asset::B);
        assert_eq!(Direction::BToA.asset_in(), Asset::B);
        assert_eq!(Direction::BToA.asset_out(), Asset::A);
    }

    #[test]
    fn oriented_reserves() {
        let r = Reserves::new(100, 200);
        assert_eq!(r.oriented(Direction::AToB), (100, 200));
        assert_eq!(r.oriented(Direction::BToA), (200, 100));
        assert_eq!(r.k(), U256::from(20_000u64));
    }

    #[test]
    fn k_does_not_overflow_u128() {
        let r = Reserves::new(u128::MAX, u128::MAX);
        assert!(r.k() > U256::from(u128::MAX));
    }
}
