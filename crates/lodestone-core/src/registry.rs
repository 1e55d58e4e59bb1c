//! The block type catalog: per-type properties and behavior, keyed by id.
//!
//! Built once through [`TypeCatalogBuilder`] and frozen into a
//! [`TypeCatalog`] that worlds share behind an `Arc`. Type ids without an
//! entry are legal everywhere; they simply have no behavior, are not solid
//! and are not liquid.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::face::{Face, FaceSet};
use crate::id::BlockTypeId;
use crate::power::SignalComponent;
use crate::voxel::VoxelRef;
use crate::world::{World, WorldError};

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// The mutation that triggered a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockUpdate {
    /// The voxel that was mutated.
    pub source: VoxelRef,
    pub old_type: BlockTypeId,
    pub old_data: u8,
    pub new_type: BlockTypeId,
    pub new_data: u8,
}

/// Type-specific rules. Every method has a no-op default, so a behavior only
/// overrides what it cares about.
///
/// Hooks receive the world mutably and may mutate it again; those mutations
/// cascade synchronously before the hook returns. Implementations are
/// responsible for not mutating in a cycle.
pub trait BlockBehavior: Send + Sync + fmt::Debug {
    /// A voxel in the 3x3x3 neighborhood of `block` changed. `face` is the
    /// face of `block` pointing at the change, when that is a single axis.
    fn on_near_block_changed(
        &self,
        world: &mut World,
        block: VoxelRef,
        face: Option<Face>,
        update: &BlockUpdate,
    ) -> Result<(), WorldError> {
        let _ = (world, block, face, update);
        Ok(())
    }

    /// A voxel of this type was changed (called on the type it had before).
    fn on_block_changed(&self, world: &mut World, update: &BlockUpdate) -> Result<(), WorldError> {
        let _ = (world, update);
        Ok(())
    }

    /// The signal state this type exposes for the given data value.
    fn signal(&self, data: u8) -> Option<SignalComponent> {
        let _ = data;
        None
    }

    /// Faces a conductor at `block` currently connects to.
    fn connections(&self, world: &World, block: &VoxelRef) -> FaceSet {
        let _ = (world, block);
        FaceSet::EMPTY
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Static properties of a block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockProperties {
    /// Solid blocks conduct direct power from their neighbors.
    pub solid: bool,
    pub liquid: bool,
}

impl BlockProperties {
    pub fn solid() -> Self {
        Self {
            solid: true,
            liquid: false,
        }
    }

    pub fn non_solid() -> Self {
        Self::default()
    }

    pub fn liquid() -> Self {
        Self {
            solid: false,
            liquid: true,
        }
    }
}

/// A block type definition in the catalog.
#[derive(Debug, Clone)]
pub struct BlockTypeDef {
    pub id: BlockTypeId,
    pub name: String,
    pub properties: BlockProperties,
    pub behavior: Option<Arc<dyn BlockBehavior>>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`TypeCatalog`].
/// Two-phase lifecycle: registration, then behavior attachment and mutation.
#[derive(Debug, Default)]
pub struct TypeCatalogBuilder {
    blocks: BTreeMap<BlockTypeId, BlockTypeDef>,
    name_to_id: HashMap<String, BlockTypeId>,
}

impl TypeCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase 1: Register a block type under an explicit id.
    pub fn register(
        &mut self,
        id: BlockTypeId,
        name: &str,
        properties: BlockProperties,
    ) -> Result<BlockTypeId, RegistryError> {
        if self.blocks.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        if self.name_to_id.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        self.blocks.insert(
            id,
            BlockTypeDef {
                id,
                name: name.to_string(),
                properties,
                behavior: None,
            },
        );
        self.name_to_id.insert(name.to_string(), id);
        Ok(id)
    }

    /// Phase 2: Attach (or replace) the behavior of a registered type.
    pub fn attach_behavior(
        &mut self,
        name: &str,
        behavior: Arc<dyn BlockBehavior>,
    ) -> Result<(), RegistryError> {
        self.mutate_block(name, |def| def.behavior = Some(behavior))
    }

    /// Phase 2: Mutate an existing definition by name.
    pub fn mutate_block<F>(&mut self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut BlockTypeDef),
    {
        let id = self
            .name_to_id
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        if let Some(def) = self.blocks.get_mut(id) {
            f(def);
        }
        Ok(())
    }

    pub fn type_id(&self, name: &str) -> Option<BlockTypeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn build(self) -> TypeCatalog {
        TypeCatalog {
            blocks: self.blocks,
            name_to_id: self.name_to_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable catalog. Frozen after `build()`. Thread-safe to share.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    blocks: BTreeMap<BlockTypeId, BlockTypeDef>,
    name_to_id: HashMap<String, BlockTypeId>,
}

impl TypeCatalog {
    pub fn get(&self, id: BlockTypeId) -> Option<&BlockTypeDef> {
        self.blocks.get(&id)
    }

    pub fn behavior(&self, id: BlockTypeId) -> Option<&Arc<dyn BlockBehavior>> {
        self.blocks.get(&id).and_then(|def| def.behavior.as_ref())
    }

    pub fn type_id(&self, name: &str) -> Option<BlockTypeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn is_solid(&self, id: BlockTypeId) -> bool {
        self.get(id).is_some_and(|def| def.properties.solid)
    }

    pub fn is_liquid(&self, id: BlockTypeId) -> bool {
        self.get(id).is_some_and(|def| def.properties.liquid)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockTypeDef> {
        self.blocks.values()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate block type id: {0:?}")]
    DuplicateId(BlockTypeId),
    #[error("duplicate block type name: {0}")]
    DuplicateName(String),
}
