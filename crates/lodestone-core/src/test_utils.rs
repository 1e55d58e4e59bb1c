//! Helpers for tests in this crate and downstream crates (`test-utils`
//! feature).

use std::sync::{Arc, Mutex, PoisonError};

use crate::face::{ALL, Face, FaceSet, HORIZONTAL};
use crate::id::{BlockTypeId, WorldId};
use crate::power::SignalComponent;
use crate::registry::{BlockBehavior, BlockProperties, BlockUpdate, TypeCatalogBuilder};
use crate::voxel::{ChunkPos, VoxelRef};
use crate::world::{World, WorldError};

// ---------------------------------------------------------------------------
// Type ids
// ---------------------------------------------------------------------------

pub fn stone() -> BlockTypeId {
    BlockTypeId(1)
}

pub fn water() -> BlockTypeId {
    BlockTypeId(8)
}

pub fn glass() -> BlockTypeId {
    BlockTypeId(20)
}

pub fn permanent() -> BlockTypeId {
    BlockTypeId(100)
}

pub fn switch_type() -> BlockTypeId {
    BlockTypeId(101)
}

pub fn torch_type() -> BlockTypeId {
    BlockTypeId(102)
}

pub fn diode_type() -> BlockTypeId {
    BlockTypeId(103)
}

pub fn wire_type() -> BlockTypeId {
    BlockTypeId(104)
}

pub fn recorder() -> BlockTypeId {
    BlockTypeId(200)
}

// ---------------------------------------------------------------------------
// Worlds
// ---------------------------------------------------------------------------

/// Air, stone (solid), water (liquid) and glass (non-solid).
pub fn test_catalog() -> TypeCatalogBuilder {
    let mut b = TypeCatalogBuilder::new();
    b.register(BlockTypeId::AIR, "air", BlockProperties::non_solid())
        .unwrap();
    b.register(stone(), "stone", BlockProperties::solid())
        .unwrap();
    b.register(water(), "water", BlockProperties::liquid())
        .unwrap();
    b.register(glass(), "glass", BlockProperties::non_solid())
        .unwrap();
    b
}

/// World 0 with the 3x3 chunks around the origin loaded.
pub fn world_with(builder: TypeCatalogBuilder) -> World {
    let mut world = World::new(WorldId(0), Arc::new(builder.build()));
    for cx in -1..=1 {
        for cz in -1..=1 {
            world.load_empty_chunk(ChunkPos::new(cx, cz));
        }
    }
    world
}

pub fn test_world() -> World {
    world_with(test_catalog())
}

/// A world whose catalog also holds one test type per signal component.
pub fn signal_world() -> World {
    let mut b = test_catalog();
    let kinds = [
        (permanent(), "permanent", TestSignal::Permanent),
        (switch_type(), "switch", TestSignal::Switch),
        (torch_type(), "torch", TestSignal::Torch),
        (diode_type(), "diode", TestSignal::Diode),
        (wire_type(), "wire", TestSignal::Wire),
    ];
    for (id, name, kind) in kinds {
        b.register(id, name, BlockProperties::non_solid()).unwrap();
        b.attach_behavior(name, Arc::new(kind)).unwrap();
    }
    world_with(b)
}

/// A world with a solid `recorder()` type whose hooks append to the returned
/// log.
pub fn recording_world() -> (World, Arc<HookLog>) {
    let log = Arc::new(HookLog::default());
    let mut b = test_catalog();
    b.register(recorder(), "recorder", BlockProperties::solid())
        .unwrap();
    b.attach_behavior(
        "recorder",
        Arc::new(RecordingBehavior {
            log: Arc::clone(&log),
        }),
    )
    .unwrap();
    (world_with(b), log)
}

// ---------------------------------------------------------------------------
// Signal test types
// ---------------------------------------------------------------------------

const ACTIVE: u8 = 0x10;

fn face_code(face: Face) -> u8 {
    ALL.iter().position(|f| *f == face).unwrap_or(0) as u8
}

fn decode_face(data: u8) -> Face {
    ALL[usize::from(data & 0x0F) % ALL.len()]
}

pub fn switch_data(powered: bool, attached: Face) -> u8 {
    face_code(attached) | if powered { ACTIVE } else { 0 }
}

pub fn torch_data(lit: bool, attached: Face) -> u8 {
    switch_data(lit, attached)
}

pub fn diode_data(active: bool, facing: Face) -> u8 {
    switch_data(active, facing)
}

/// Signal components decoded from data with a trivial encoding: low nibble
/// is the face, `0x10` is the active bit. Wires carry their strength in
/// data and connect down and to all four sides.
#[derive(Debug, Clone, Copy)]
pub enum TestSignal {
    Permanent,
    Switch,
    Torch,
    Diode,
    Wire,
}

impl BlockBehavior for TestSignal {
    fn signal(&self, data: u8) -> Option<SignalComponent> {
        let active = data & ACTIVE != 0;
        let face = decode_face(data);
        Some(match self {
            TestSignal::Permanent => SignalComponent::Permanent,
            TestSignal::Switch => SignalComponent::Switch {
                powered: active,
                attached: face,
            },
            TestSignal::Torch => SignalComponent::Torch {
                lit: active,
                attached: face,
            },
            TestSignal::Diode => SignalComponent::Diode {
                active,
                facing: face,
            },
            TestSignal::Wire => SignalComponent::Wire { strength: data },
        })
    }

    fn connections(&self, _world: &World, _block: &VoxelRef) -> FaceSet {
        match self {
            TestSignal::Wire => std::iter::once(Face::Down).chain(HORIZONTAL).collect(),
            _ => FaceSet::EMPTY,
        }
    }
}

// ---------------------------------------------------------------------------
// Recording behavior
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCall {
    Near {
        block: VoxelRef,
        face: Option<Face>,
        update: BlockUpdate,
    },
    Changed {
        update: BlockUpdate,
    },
}

#[derive(Debug, Default)]
pub struct HookLog {
    calls: Mutex<Vec<HookCall>>,
}

impl HookLog {
    pub fn push(&self, call: HookCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    pub fn calls(&self) -> Vec<HookCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[derive(Debug)]
pub struct RecordingBehavior {
    pub log: Arc<HookLog>,
}

impl BlockBehavior for RecordingBehavior {
    fn on_near_block_changed(
        &self,
        _world: &mut World,
        block: VoxelRef,
        face: Option<Face>,
        update: &BlockUpdate,
    ) -> Result<(), WorldError> {
        self.log.push(HookCall::Near {
            block,
            face,
            update: *update,
        });
        Ok(())
    }

    fn on_block_changed(&self, _world: &mut World, update: &BlockUpdate) -> Result<(), WorldError> {
        self.log.push(HookCall::Changed { update: *update });
        Ok(())
    }
}
