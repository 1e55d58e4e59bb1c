//! The world: chunk storage, the shared type catalog, connected observers,
//! simulation time and the per-world rate counter.
//!
//! [`World::set_type_and_data`] is the single mutation path. It diffs the new
//! type and data against storage, writes only what differs, broadcasts one
//! [`BlockChange`] to observers and then (optionally) runs the physics
//! cascade in [`crate::physics`].
//!
//! Reads never cache. Every query goes to the backing chunk, so any number
//! of [`VoxelRef`]s naming the same position always agree.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chunk::{ChunkStore, MemoryChunk};
use crate::counter::{RateCounter, Ticks};
use crate::event::{BlockChange, ChangeObserver, ObserverSet};
use crate::id::{BlockTypeId, ObserverId, WorldId};
use crate::power::PowerEvaluator;
use crate::registry::TypeCatalog;
use crate::voxel::{ChunkPos, VoxelRef};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Construction-time settings for a world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Simulation time the world starts at.
    #[serde(default)]
    pub full_time: Ticks,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("{voxel} does not belong to world {expected:?}")]
    WrongWorld { voxel: VoxelRef, expected: WorldId },
    #[error("{0} has been unloaded")]
    Unloaded(VoxelRef),
    #[error("chunk {0:?} is not loaded")]
    ChunkNotLoaded(ChunkPos),
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

pub struct World {
    id: WorldId,
    catalog: Arc<TypeCatalog>,
    chunks: HashMap<ChunkPos, Box<dyn ChunkStore>>,
    observers: ObserverSet,
    counter: RateCounter,
    full_time: Ticks,
    pub(crate) cascade_depth: usize,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("chunks", &self.chunks.len())
            .field("observers", &self.observers)
            .field("full_time", &self.full_time)
            .finish_non_exhaustive()
    }
}

impl World {
    pub fn new(id: WorldId, catalog: Arc<TypeCatalog>) -> Self {
        Self::with_config(id, catalog, WorldConfig::default())
    }

    pub fn with_config(id: WorldId, catalog: Arc<TypeCatalog>, config: WorldConfig) -> Self {
        Self {
            id,
            catalog,
            chunks: HashMap::new(),
            observers: ObserverSet::new(),
            counter: RateCounter::new(),
            full_time: config.full_time,
            cascade_depth: 0,
        }
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    /// A reference to the voxel at world coordinates `(x, y, z)`.
    pub fn voxel_at(&self, x: i32, y: i32, z: i32) -> VoxelRef {
        VoxelRef::new(self.id, x, y, z)
    }

    /// Depth of the physics cascade currently executing (0 outside one).
    pub fn cascade_depth(&self) -> usize {
        self.cascade_depth
    }

    // -- Chunks --

    /// Attach storage for a chunk column, returning any storage it replaced.
    pub fn load_chunk(
        &mut self,
        pos: ChunkPos,
        chunk: Box<dyn ChunkStore>,
    ) -> Option<Box<dyn ChunkStore>> {
        debug!(world = self.id.0, chunk_x = pos.x, chunk_z = pos.z, "Chunk loaded");
        self.chunks.insert(pos, chunk)
    }

    /// Attach a fresh all-air [`MemoryChunk`] unless one is already loaded.
    pub fn load_empty_chunk(&mut self, pos: ChunkPos) {
        if !self.chunks.contains_key(&pos) {
            self.load_chunk(pos, Box::new(MemoryChunk::new()));
        }
    }

    pub fn unload_chunk(&mut self, pos: ChunkPos) -> Option<Box<dyn ChunkStore>> {
        debug!(world = self.id.0, chunk_x = pos.x, chunk_z = pos.z, "Chunk unloaded");
        self.chunks.remove(&pos)
    }

    pub fn is_chunk_loaded(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Storage backing `voxel`, if it is in this world, bound and loaded.
    pub fn chunk(&self, voxel: &VoxelRef) -> Option<&dyn ChunkStore> {
        if voxel.world() != self.id {
            return None;
        }
        let pos = voxel.chunk()?;
        self.chunks.get(&pos).map(|chunk| chunk.as_ref())
    }

    fn chunk_mut(
        &mut self,
        voxel: &VoxelRef,
    ) -> Result<&mut (dyn ChunkStore + 'static), WorldError> {
        if voxel.world() != self.id {
            return Err(WorldError::WrongWorld {
                voxel: *voxel,
                expected: self.id,
            });
        }
        let pos = voxel.chunk().ok_or(WorldError::Unloaded(*voxel))?;
        self.chunks
            .get_mut(&pos)
            .map(|chunk| chunk.as_mut())
            .ok_or(WorldError::ChunkNotLoaded(pos))
    }

    // -- Reads --

    /// Current type of `voxel`. Anything not backed by loaded storage is air.
    pub fn type_id(&self, voxel: &VoxelRef) -> BlockTypeId {
        let (x, z, y) = voxel.local();
        self.chunk(voxel)
            .map(|chunk| chunk.type_id(x, z, y))
            .unwrap_or(BlockTypeId::AIR)
    }

    pub fn data(&self, voxel: &VoxelRef) -> u8 {
        let (x, z, y) = voxel.local();
        self.chunk(voxel).map(|chunk| chunk.data(x, z, y)).unwrap_or(0)
    }

    pub fn sky_light(&self, voxel: &VoxelRef) -> u8 {
        let (x, z, y) = voxel.local();
        self.chunk(voxel)
            .map(|chunk| chunk.sky_light(x, z, y))
            .unwrap_or(0)
    }

    pub fn block_light(&self, voxel: &VoxelRef) -> u8 {
        let (x, z, y) = voxel.local();
        self.chunk(voxel)
            .map(|chunk| chunk.block_light(x, z, y))
            .unwrap_or(0)
    }

    /// The brighter of sky and block light.
    pub fn light_level(&self, voxel: &VoxelRef) -> u8 {
        self.sky_light(voxel).max(self.block_light(voxel))
    }

    pub fn is_empty(&self, voxel: &VoxelRef) -> bool {
        self.type_id(voxel) == BlockTypeId::AIR
    }

    pub fn is_liquid(&self, voxel: &VoxelRef) -> bool {
        self.catalog.is_liquid(self.type_id(voxel))
    }

    pub fn is_solid(&self, voxel: &VoxelRef) -> bool {
        self.catalog.is_solid(self.type_id(voxel))
    }

    /// Diagnostic rendering of a voxel with its current type and data.
    pub fn describe(&self, voxel: &VoxelRef) -> String {
        let type_id = self.type_id(voxel);
        let name = self
            .catalog
            .get(type_id)
            .map(|def| def.name.as_str())
            .unwrap_or("unknown");
        format!(
            "{voxel} type={name}({}) data={}",
            type_id.0,
            self.data(voxel)
        )
    }

    // -- Mutation --

    /// Write `type_id` and `data` into `voxel`, touching only the fields that
    /// differ. On any change, observers are notified first and then, if
    /// `apply_physics`, the neighborhood cascade runs. Returns whether
    /// anything changed.
    ///
    /// An error from the cascade means a neighbor hook failed after the write
    /// and broadcast were done; the new type and data stay in place.
    pub fn set_type_and_data(
        &mut self,
        voxel: &VoxelRef,
        type_id: BlockTypeId,
        data: u8,
        apply_physics: bool,
    ) -> Result<bool, WorldError> {
        let (x, z, y) = voxel.local();
        let chunk = self.chunk_mut(voxel)?;
        let old_type = chunk.type_id(x, z, y);
        let old_data = chunk.data(x, z, y);
        let mut changed = false;

        if old_type != type_id {
            chunk.set_type_id(x, z, y, type_id);
            changed = true;
        }
        if old_data != data {
            chunk.set_data(x, z, y, data);
            changed = true;
        }

        if !changed {
            return Ok(false);
        }

        debug!(
            x = voxel.x(),
            y = voxel.y(),
            z = voxel.z(),
            old_type = old_type.0,
            new_type = type_id.0,
            old_data,
            new_data = data,
            "Block changed"
        );

        // Observers hear about the change before any cascade work starts.
        self.observers.broadcast(&BlockChange {
            x: voxel.x(),
            y: voxel.y(),
            z: voxel.z(),
            new_type: type_id,
            new_data: data,
        });

        if apply_physics {
            self.apply_physics(*voxel, old_type, type_id, old_data, data)?;
        }

        Ok(true)
    }

    /// Change the type, keeping the current data.
    pub fn set_type_id(
        &mut self,
        voxel: &VoxelRef,
        type_id: BlockTypeId,
        apply_physics: bool,
    ) -> Result<bool, WorldError> {
        let data = self.data(voxel);
        self.set_type_and_data(voxel, type_id, data, apply_physics)
    }

    /// Change the data, keeping the current type.
    pub fn set_data(
        &mut self,
        voxel: &VoxelRef,
        data: u8,
        apply_physics: bool,
    ) -> Result<bool, WorldError> {
        let type_id = self.type_id(voxel);
        self.set_type_and_data(voxel, type_id, data, apply_physics)
    }

    /// Replace a non-air voxel with air, with physics. Returns `false` if it
    /// was already air.
    pub fn break_block(&mut self, voxel: &VoxelRef) -> Result<bool, WorldError> {
        if self.is_empty(voxel) {
            return Ok(false);
        }
        self.set_type_and_data(voxel, BlockTypeId::AIR, 0, true)
    }

    // -- Observers --

    pub fn connect_observer(&mut self, observer: Arc<dyn ChangeObserver>) -> ObserverId {
        let id = self.observers.connect(observer);
        debug!(world = self.id.0, observers = self.observers.len(), "Observer connected");
        id
    }

    pub fn disconnect_observer(&mut self, id: ObserverId) -> bool {
        let removed = self.observers.disconnect(id);
        if removed {
            debug!(world = self.id.0, observers = self.observers.len(), "Observer disconnected");
        }
        removed
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // -- Time --

    pub fn full_time(&self) -> Ticks {
        self.full_time
    }

    pub fn set_full_time(&mut self, time: Ticks) {
        self.full_time = time;
    }

    pub fn advance_time(&mut self, ticks: Ticks) {
        self.full_time = self.full_time.saturating_add(ticks);
    }

    // -- Rate counting --

    /// Record one event at `voxel` that stays counted for `timeout` ticks.
    pub fn count(&mut self, voxel: &VoxelRef, timeout: Ticks) {
        let now = self.full_time;
        self.counter.count(voxel.pos(), timeout, now);
    }

    /// Events recorded at `voxel`'s position that have not yet expired.
    pub fn counter(&mut self, voxel: &VoxelRef) -> usize {
        let now = self.full_time;
        self.counter.counter(voxel.pos(), now)
    }

    pub fn rate_counter(&self) -> &RateCounter {
        &self.counter
    }

    // -- Power --

    /// Read-only power queries against this world.
    pub fn power(&self) -> PowerEvaluator<'_> {
        PowerEvaluator::new(self)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
