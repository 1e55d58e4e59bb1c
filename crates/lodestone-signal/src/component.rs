//! Block behaviors for signal components.
//!
//! Each behavior decodes its [`SignalComponent`] from block data and reacts
//! to neighbor changes by re-evaluating its own state. Components never
//! schedule anything: a state change is written immediately and cascades
//! through the world before the hook returns.

use std::sync::Arc;

use lodestone_core::counter::Ticks;
use lodestone_core::face::{Face, FaceSet};
use lodestone_core::id::BlockTypeId;
use lodestone_core::power::SignalComponent;
use lodestone_core::registry::{BlockBehavior, BlockUpdate, RegistryError};
use lodestone_core::voxel::VoxelRef;
use lodestone_core::world::{World, WorldError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::material;
use crate::wire;

// ---------------------------------------------------------------------------
// Kinds and configuration
// ---------------------------------------------------------------------------

/// The behavior families a block type can be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Solid block that relays component changes to its own neighbors.
    Conductor,
    PowerBlock,
    Lever,
    Button,
    Torch,
    Repeater,
    Wire,
}

impl SignalKind {
    /// Torches and repeaters exist as an on type and an off type.
    pub fn needs_toggle(self) -> bool {
        matches!(self, SignalKind::Torch | SignalKind::Repeater)
    }
}

/// The two type ids of a component that switches type when it changes
/// state, and which of them this one is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub active: bool,
    pub on: BlockTypeId,
    pub off: BlockTypeId,
}

impl Toggle {
    fn target(&self, active: bool) -> BlockTypeId {
        if active { self.on } else { self.off }
    }
}

/// Torch burnout: a torch that has toggled `threshold` times within the
/// last `window` ticks refuses to light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorchConfig {
    pub window: Ticks,
    pub threshold: usize,
}

impl Default for TorchConfig {
    fn default() -> Self {
        Self {
            window: 60,
            threshold: 8,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("{0:?} behavior needs on and off type ids")]
    MissingToggle(SignalKind),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Build the behavior for `kind`. Torches and repeaters require `toggle`.
pub fn make_behavior(
    kind: SignalKind,
    toggle: Option<Toggle>,
    config: TorchConfig,
) -> Result<Arc<dyn BlockBehavior>, SignalError> {
    let behavior: Arc<dyn BlockBehavior> = match kind {
        SignalKind::Conductor => Arc::new(Conductor),
        SignalKind::PowerBlock => Arc::new(PowerBlock),
        SignalKind::Lever => Arc::new(Switch::Lever),
        SignalKind::Button => Arc::new(Switch::Button),
        SignalKind::Wire => Arc::new(Wire),
        SignalKind::Torch => Arc::new(Torch {
            toggle: toggle.ok_or(SignalError::MissingToggle(kind))?,
            config,
        }),
        SignalKind::Repeater => Arc::new(Repeater {
            toggle: toggle.ok_or(SignalError::MissingToggle(kind))?,
        }),
    };
    Ok(behavior)
}

fn carries_signal(world: &World, type_id: BlockTypeId, data: u8) -> bool {
    world
        .catalog()
        .behavior(type_id)
        .and_then(|behavior| behavior.signal(data))
        .is_some()
}

// ---------------------------------------------------------------------------
// Conductor
// ---------------------------------------------------------------------------

/// A solid block passes component changes on its faces through to its own
/// neighborhood, so components two steps apart see each other.
#[derive(Debug)]
pub struct Conductor;

impl BlockBehavior for Conductor {
    fn on_near_block_changed(
        &self,
        world: &mut World,
        block: VoxelRef,
        face: Option<Face>,
        update: &BlockUpdate,
    ) -> Result<(), WorldError> {
        if !face.is_some_and(Face::is_axis) {
            return Ok(());
        }
        if !carries_signal(world, update.old_type, update.old_data)
            && !carries_signal(world, update.new_type, update.new_data)
        {
            return Ok(());
        }
        let type_id = world.type_id(&block);
        let data = world.data(&block);
        world.apply_physics(block, type_id, type_id, data, data)
    }
}

// ---------------------------------------------------------------------------
// Power block
// ---------------------------------------------------------------------------

/// Always powered. Being solid, it also relays like a [`Conductor`].
#[derive(Debug)]
pub struct PowerBlock;

impl BlockBehavior for PowerBlock {
    fn on_near_block_changed(
        &self,
        world: &mut World,
        block: VoxelRef,
        face: Option<Face>,
        update: &BlockUpdate,
    ) -> Result<(), WorldError> {
        Conductor.on_near_block_changed(world, block, face, update)
    }

    fn signal(&self, _data: u8) -> Option<SignalComponent> {
        Some(SignalComponent::Permanent)
    }
}

// ---------------------------------------------------------------------------
// Levers and buttons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    Lever,
    Button,
}

impl BlockBehavior for Switch {
    fn signal(&self, data: u8) -> Option<SignalComponent> {
        let attached = match self {
            Switch::Lever => material::lever_attached(data),
            Switch::Button => material::button_attached(data)?,
        };
        Some(SignalComponent::Switch {
            powered: material::switch_powered(data),
            attached,
        })
    }
}

/// Flip a lever or press/release a button, with physics. Returns `false`
/// if `voxel` is not a switch or is already in that state.
pub fn set_switch(world: &mut World, voxel: &VoxelRef, powered: bool) -> Result<bool, WorldError> {
    if !matches!(
        world.power().signal_at(voxel),
        Some(SignalComponent::Switch { .. })
    ) {
        return Ok(false);
    }
    let data = material::with_powered(world.data(voxel), powered);
    world.set_data(voxel, data, true)
}

pub fn toggle_switch(world: &mut World, voxel: &VoxelRef) -> Result<bool, WorldError> {
    let powered = material::switch_powered(world.data(voxel));
    set_switch(world, voxel, !powered)
}

// ---------------------------------------------------------------------------
// Torch
// ---------------------------------------------------------------------------

/// An inverter: lit while the block it is mounted on is unpowered.
#[derive(Debug)]
pub struct Torch {
    pub toggle: Toggle,
    pub config: TorchConfig,
}

impl Torch {
    fn update(&self, world: &mut World, block: VoxelRef) -> Result<(), WorldError> {
        let data = world.data(&block);
        let mount = block.relative_face(material::torch_attached(data));
        let should_light = !world.power().is_powered(&mount);
        if should_light == self.toggle.active {
            return Ok(());
        }

        if should_light && world.counter(&block) >= self.config.threshold {
            debug!(
                x = block.x(),
                y = block.y(),
                z = block.z(),
                tick = world.full_time(),
                "Torch burned out"
            );
            return Ok(());
        }

        world.count(&block, self.config.window);
        world.set_type_and_data(&block, self.toggle.target(should_light), data, true)?;
        Ok(())
    }
}

impl BlockBehavior for Torch {
    fn on_near_block_changed(
        &self,
        world: &mut World,
        block: VoxelRef,
        _face: Option<Face>,
        _update: &BlockUpdate,
    ) -> Result<(), WorldError> {
        self.update(world, block)
    }

    fn signal(&self, data: u8) -> Option<SignalComponent> {
        Some(SignalComponent::Torch {
            lit: self.toggle.active,
            attached: material::torch_attached(data),
        })
    }
}

// ---------------------------------------------------------------------------
// Repeater
// ---------------------------------------------------------------------------

/// A diode that follows the power arriving at its back, outputting forward.
#[derive(Debug)]
pub struct Repeater {
    pub toggle: Toggle,
}

impl Repeater {
    fn input_powered(world: &World, block: &VoxelRef, facing: Face) -> bool {
        let back = facing.opposite();
        let power = world.power();
        if power.is_face_indirectly_powered(block, back) {
            return true;
        }
        // Repeaters chain straight into each other.
        matches!(
            power.signal_at(&block.relative_face(back)),
            Some(SignalComponent::Diode { active: true, facing: upstream }) if upstream == facing
        )
    }
}

impl BlockBehavior for Repeater {
    fn on_near_block_changed(
        &self,
        world: &mut World,
        block: VoxelRef,
        _face: Option<Face>,
        _update: &BlockUpdate,
    ) -> Result<(), WorldError> {
        let data = world.data(&block);
        let facing = material::diode_facing(data);
        let active = Self::input_powered(world, &block, facing);
        if active == self.toggle.active {
            return Ok(());
        }
        world.set_type_and_data(&block, self.toggle.target(active), data, true)?;
        Ok(())
    }

    fn signal(&self, data: u8) -> Option<SignalComponent> {
        Some(SignalComponent::Diode {
            active: self.toggle.active,
            facing: material::diode_facing(data),
        })
    }
}

// ---------------------------------------------------------------------------
// Wire
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Wire;

impl BlockBehavior for Wire {
    fn on_near_block_changed(
        &self,
        world: &mut World,
        block: VoxelRef,
        _face: Option<Face>,
        update: &BlockUpdate,
    ) -> Result<(), WorldError> {
        // A neighboring wire only changed strength; the network is unchanged.
        let strength_only = update.old_type == update.new_type
            && matches!(
                world
                    .catalog()
                    .behavior(update.new_type)
                    .and_then(|behavior| behavior.signal(update.new_data)),
                Some(SignalComponent::Wire { .. })
            );
        if strength_only {
            return Ok(());
        }
        wire::update_network(world, &block)
    }

    fn signal(&self, data: u8) -> Option<SignalComponent> {
        Some(SignalComponent::Wire {
            strength: material::wire_strength(data),
        })
    }

    fn connections(&self, world: &World, block: &VoxelRef) -> FaceSet {
        wire::connections(world, block)
    }
}
