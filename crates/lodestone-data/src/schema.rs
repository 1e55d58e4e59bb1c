//! On-disk shapes of block data files.
//!
//! `blocks.{ron,toml,json}` holds a list of [`BlockData`] (under a `blocks`
//! key in TOML). `signal.*` holds an optional [`SignalData`] and `world.*`
//! an optional [`lodestone_core::world::WorldConfig`].

use lodestone_signal::{SignalKind, TorchConfig};
use serde::Deserialize;

/// A block type definition.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockData {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub solid: bool,
    #[serde(default)]
    pub liquid: bool,
    #[serde(default)]
    pub behavior: Option<BehaviorData>,
}

/// The signal behavior attached to a block type.
#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorData {
    pub kind: SignalKind,
    /// For torches and repeaters: whether this type is the on state.
    #[serde(default)]
    pub active: bool,
    /// For torches and repeaters: name of the type holding the other state.
    #[serde(default)]
    pub pair: Option<String>,
}

/// Tuning for signal components.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignalData {
    #[serde(default)]
    pub torch: TorchConfig,
}
