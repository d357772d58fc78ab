//! Motor AMM de produto constante (x·y=k) entre dois ativos fungíveis.
//!
//! - [`amm`]: reservas, ledger de LP, swap com taxa, visão de preço e a
//!   fachada [`amm::Amm`] com operações atômicas
//! - [`telemetry`] / [`obs`]: tracing + OpenTelemetry (traces e métricas)

pub mod amm;
pub mod obs;
pub mod telemetry;

pub use amm::types::U256;
