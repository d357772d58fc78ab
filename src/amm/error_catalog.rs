//! Catálogo imutável de erros do AMM.
use core::fmt;

/// Código de erro do AMM.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum AmmErrorCode {
    /// Operações com quantidade zero onde se exige quantidade positiva.
    ZeroAmount,
    /// Retirada/redução excede as reservas disponíveis (ou pool vazio).
    InsufficientReserves,
    /// Burn excede o saldo de shares do chamador.
    InsufficientShares,
    /// Overflow ou underflow em cálculos numéricos.
    Overflow,
    /// O ledger externo recusou uma transferência.
    TransferFailed,
    /// Input não nulo arredonda para resultado zero.
    InputTooSmall,
    /// Saída abaixo do mínimo aceito pelo chamador.
    SlippageExceeded,
    /// Taxa configurada fora de `0..10_000` bps.
    InvalidFee,
    /// `k` diminuiu após um swap: defeito interno.
    InvariantViolated,
    /// Instância parada após violação de invariante.
    EngineHalted,
}

impl AmmErrorCode {
    /// Código textual estável do erro.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "AMM-0001",
            Self::InsufficientReserves => "AMM-0002",
            Self::InsufficientShares => "AMM-0003",
            Self::Overflow => "AMM-0004",
            Self::TransferFailed => "AMM-0005",
            Self::InputTooSmall => "AMM-0006",
            Self::SlippageExceeded => "AMM-0007",
            Self::InvalidFee => "AMM-0008",
            Self::InvariantViolated => "AMM-0009",
            Self::EngineHalted => "AMM-0010",
        }
    }

    /// Título curto em português.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "Quantidade zerada",
            Self::InsufficientReserves => "Reservas insuficientes",
            Self::InsufficientShares => "Shares insuficientes",
            Self::Overflow => "Overflow numérico",
            Self::TransferFailed => "Transferência recusada",
            Self::InputTooSmall => "Input pequeno demais",
            Self::SlippageExceeded => "Slippage excedido",
            Self::InvalidFee => "Taxa inválida",
            Self::InvariantViolated => "Invariante violado",
            Self::EngineHalted => "Motor parado",
        }
    }

    /// Mensagem base em português.
    pub const fn message_pt(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "amount deve ser > 0",
            Self::InsufficientReserves => "reservas insuficientes para a operação",
            Self::InsufficientShares => "saldo de shares insuficiente",
            Self::Overflow => "overflow/underflow numérico",
            Self::TransferFailed => "o ledger recusou a transferência",
            Self::InputTooSmall => "resultado arredondado para 0",
            Self::SlippageExceeded => "saída abaixo do mínimo aceito",
            Self::InvalidFee => "fee_bps deve ser < 10000",
            Self::InvariantViolated => "k diminuiu após o swap",
            Self::EngineHalted => "motor parado após violação de invariante",
        }
    }

    /// `true` para defeitos internos (não são erros de input do usuário).
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::InvariantViolated | Self::EngineHalted)
    }

    /// Retorna todas as variantes em ordem estável.
    pub fn all() -> &'static [AmmErrorCode] {
        const ALL: &[AmmErrorCode] = &[
            AmmErrorCode::ZeroAmount,
            AmmErrorCode::InsufficientReserves,
            AmmErrorCode::InsufficientShares,
            AmmErrorCode::Overflow,
            AmmErrorCode::TransferFailed,
            AmmErrorCode::InputTooSmall,
            AmmErrorCode::SlippageExceeded,
            AmmErrorCode::InvalidFee,
            AmmErrorCode::InvariantViolated,
            AmmErrorCode::EngineHalted,
        ];
        ALL
    }
}

impl fmt::Display for AmmErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Mensagem padrão na localidade ativa (pt-BR).
pub fn default_locale_message(code: AmmErrorCode) -> &'static str {
    code.message_pt()
}
