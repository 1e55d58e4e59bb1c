//! Signal components for the Lodestone core.
//!
//! Provides the concrete block behaviors that drive power evaluation:
//! power blocks, levers and buttons, torches, repeaters and wire, plus a
//! [`Conductor`](component::Conductor) for solid blocks. [`register_vanilla`]
//! installs them under their classic type ids.
//!
//! # Design
//!
//! - State is decoded from block data on every query; nothing is cached.
//! - Torches and repeaters switch between an on type and an off type.
//! - Wire networks are all-or-nothing: fully powered when any wire in them
//!   is fed by a non-wire source.
//! - Torch oscillation is bounded by burnout through the world's rate
//!   counter ([`TorchConfig`]).

pub mod component;
pub mod material;
pub mod wire;

use lodestone_core::id::BlockTypeId;
use lodestone_core::registry::{BlockProperties, TypeCatalog, TypeCatalogBuilder};
use tracing::debug;

pub use component::{
    SignalError, SignalKind, Toggle, TorchConfig, make_behavior, set_switch, toggle_switch,
};

use material::*;

// ---------------------------------------------------------------------------
// Vanilla catalog
// ---------------------------------------------------------------------------

/// `(id, name, properties, behavior, toggle (active, on, off))`.
type VanillaEntry = (
    BlockTypeId,
    &'static str,
    BlockProperties,
    Option<SignalKind>,
    Option<(bool, BlockTypeId, BlockTypeId)>,
);

fn vanilla_entries() -> Vec<VanillaEntry> {
    use SignalKind::*;

    let solid = BlockProperties::solid();
    let open = BlockProperties::non_solid();
    let liquid = BlockProperties::liquid();
    let torch = Some((REDSTONE_TORCH_ON, REDSTONE_TORCH_OFF));
    let diode = Some((DIODE_BLOCK_ON, DIODE_BLOCK_OFF));
    let toggled = |active: bool, ids: Option<(BlockTypeId, BlockTypeId)>| {
        ids.map(|(on, off)| (active, on, off))
    };

    vec![
        (AIR, "air", open, None, None),
        (STONE, "stone", solid, Some(Conductor), None),
        (GRASS, "grass", solid, Some(Conductor), None),
        (DIRT, "dirt", solid, Some(Conductor), None),
        (COBBLESTONE, "cobblestone", solid, Some(Conductor), None),
        (WOOD, "wood", solid, Some(Conductor), None),
        (WATER, "water", liquid, None, None),
        (STATIONARY_WATER, "stationary_water", liquid, None, None),
        (LAVA, "lava", liquid, None, None),
        (STATIONARY_LAVA, "stationary_lava", liquid, None, None),
        (GLASS, "glass", open, None, None),
        (REDSTONE_WIRE, "redstone_wire", open, Some(Wire), None),
        (LEVER, "lever", open, Some(Lever), None),
        (REDSTONE_TORCH_OFF, "redstone_torch_off", open, Some(Torch), toggled(false, torch)),
        (REDSTONE_TORCH_ON, "redstone_torch_on", open, Some(Torch), toggled(true, torch)),
        (STONE_BUTTON, "stone_button", open, Some(Button), None),
        (DIODE_BLOCK_OFF, "diode_block_off", open, Some(Repeater), toggled(false, diode)),
        (DIODE_BLOCK_ON, "diode_block_on", open, Some(Repeater), toggled(true, diode)),
        (WOOD_BUTTON, "wood_button", open, Some(Button), None),
        (REDSTONE_BLOCK, "redstone_block", solid, Some(PowerBlock), None),
    ]
}

/// Register the classic block set, with behaviors, into `builder`.
pub fn register_vanilla(
    builder: &mut TypeCatalogBuilder,
    config: TorchConfig,
) -> Result<(), SignalError> {
    let entries = vanilla_entries();
    register_entries(builder, &entries, config)?;
    debug!(blocks = entries.len(), "Registered vanilla block types");
    Ok(())
}

fn register_entries(
    builder: &mut TypeCatalogBuilder,
    entries: &[VanillaEntry],
    config: TorchConfig,
) -> Result<(), SignalError> {
    for (id, name, properties, kind, toggle) in entries {
        builder.register(*id, name, *properties)?;
        if let Some(kind) = kind {
            let toggle = toggle.map(|(active, on, off)| Toggle { active, on, off });
            builder.attach_behavior(name, make_behavior(*kind, toggle, config)?)?;
        }
    }
    Ok(())
}

/// A frozen catalog holding only the classic block set.
pub fn vanilla_catalog(config: TorchConfig) -> Result<TypeCatalog, SignalError> {
    let mut builder = TypeCatalogBuilder::new();
    register_vanilla(&mut builder, config)?;
    Ok(builder.build())
}

#[cfg(test)]
pub(crate) fn vanilla_world() -> lodestone_core::world::World {
    use lodestone_core::test_utils::world_with;

    let mut builder = TypeCatalogBuilder::new();
    register_vanilla(&mut builder, TorchConfig::default()).unwrap();
    world_with(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestone_core::registry::RegistryError;

    #[test]
    fn vanilla_catalog_has_every_entry() {
        let catalog = vanilla_catalog(TorchConfig::default()).unwrap();
        assert_eq!(catalog.len(), vanilla_entries().len());
        assert_eq!(catalog.type_id("redstone_wire"), Some(REDSTONE_WIRE));
        assert!(catalog.is_solid(REDSTONE_BLOCK));
        assert!(!catalog.is_solid(LEVER));
        assert!(catalog.is_liquid(STATIONARY_LAVA));
        assert!(catalog.behavior(AIR).is_none());
        assert!(catalog.behavior(GLASS).is_none());
    }

    #[test]
    fn every_signal_kind_gets_a_behavior() {
        let catalog = vanilla_catalog(TorchConfig::default()).unwrap();
        for (id, name, _, kind, _) in vanilla_entries() {
            assert_eq!(
                catalog.behavior(id).is_some(),
                kind.is_some(),
                "behavior mismatch for {name}"
            );
        }
    }

    #[test]
    fn registering_twice_fails() {
        let mut builder = TypeCatalogBuilder::new();
        register_vanilla(&mut builder, TorchConfig::default()).unwrap();
        assert!(matches!(
            register_vanilla(&mut builder, TorchConfig::default()),
            Err(SignalError::Registry(RegistryError::DuplicateId(_)))
        ));
    }

    #[test]
    fn toggled_entry_without_ids_is_rejected() {
        let mut builder = TypeCatalogBuilder::new();
        let entries = [(
            REDSTONE_TORCH_ON,
            "redstone_torch_on",
            BlockProperties::non_solid(),
            Some(SignalKind::Torch),
            None,
        )];
        assert!(matches!(
            register_entries(&mut builder, &entries, TorchConfig::default()),
            Err(SignalError::MissingToggle(SignalKind::Torch))
        ));
    }
}
