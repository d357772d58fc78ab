//! Eventos estruturados emitidos após cada operação confirmada.

use tracing::info;

use super::types::{AccountId, Direction, Wad};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolEvent {
    LiquidityAdded {
        provider: AccountId,
        amount_a: Wad,
        amount_b: Wad,
        shares_minted: Wad,
    },
    LiquidityRemoved {
        provider: AccountId,
        amount_a: Wad,
        amount_b: Wad,
        shares_burned: Wad,
    },
    Swap {
        trader: AccountId,
        direction: Direction,
        amount_in: Wad,
        amount_out: Wad,
    },
}

impl PoolEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LiquidityAdded { .. } => "LiquidityAdded",
            Self::LiquidityRemoved { .. } => "LiquidityRemoved",
            Self::Swap { .. } => "Swap",
        }
    }
}

/// Destino dos eventos do pool (indexador, log, fila...).
pub trait EventSink {
    fn emit(&self, event: &PoolEvent);
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn emit(&self, event: &PoolEvent) {
        (**self).emit(event)
    }
}

/// Descarta tudo.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: &PoolEvent) {}
}

/// Publica os eventos como eventos `tracing` no target `dex_core::events`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &PoolEvent) {
        match event {
            PoolEvent::LiquidityAdded {
                provider,
                amount_a,
                amount_b,
                shares_minted,
            } => info!(
                target: "dex_core::events",
                event = event.name(),
                provider = %provider,
                amount_a = %amount_a,
                amount_b = %amount_b,
                shares_minted = %shares_minted,
            ),
            PoolEvent::LiquidityRemoved {
                provider,
                amount_a,
                amount_b,
                shares_burned,
            } => info!(
                target: "dex_core::events",
                event = event.name(),
                provider = %provider,
                amount_a = %amount_a,
                amount_b = %amount_b,
                shares_burned = %shares_burned,
            ),
            PoolEvent::Swap {
                trader,
                direction,
                amount_in,
                amount_out,
            } => info!(
                target: "dex_core::events",
                event = event.name(),
                trader = %trader,
                direction = %direction,
                amount_in = %amount_in,
                amount_out = %amount_out,
            ),
        }
    }
}
