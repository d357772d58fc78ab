pub mod types;
pub mod fixed_point;
pub mod guardrails;
pub mod reserves;
pub mod liquidity;
pub mod swap;
pub mod pricing;
pub mod config;
pub mod ledger;
pub mod events;
pub mod engine;

// referência BigRational (goldens)
pub mod ref_golden;

// módulos unificados de erro
pub mod error_catalog;
pub mod error;
pub mod error_map;

pub use config::AmmConfig;
pub use engine::{Amm, PoolSnapshot};
pub use error::{AmmError, Result};
pub use error_catalog::AmmErrorCode;
pub use events::{EventSink, NoopSink, PoolEvent, TracingSink};
pub use ledger::{InMemoryLedger, TokenLedger, TransferRejected};
pub use types::{AccountId, Asset, Direction, Reserves, Wad, U256, WAD};
