//! Chunk storage interface and a dense in-memory implementation.
//!
//! All coordinates are chunk-local: `x` and `z` in `0..CHUNK_WIDTH`, `y` in
//! `0..WORLD_HEIGHT`. Translating world coordinates is the caller's job
//! (see [`crate::voxel::VoxelRef::local`]).

use std::fmt;

use crate::id::BlockTypeId;
use crate::voxel::{CHUNK_WIDTH, WORLD_HEIGHT};

const WIDTH: usize = CHUNK_WIDTH as usize;
const HEIGHT: usize = WORLD_HEIGHT as usize;
const VOLUME: usize = WIDTH * WIDTH * HEIGHT;

/// Raw block storage for one chunk column.
pub trait ChunkStore: Send + Sync + fmt::Debug {
    fn type_id(&self, x: usize, z: usize, y: usize) -> BlockTypeId;
    fn set_type_id(&mut self, x: usize, z: usize, y: usize, type_id: BlockTypeId);
    fn data(&self, x: usize, z: usize, y: usize) -> u8;
    fn set_data(&mut self, x: usize, z: usize, y: usize, data: u8);
    fn sky_light(&self, x: usize, z: usize, y: usize) -> u8;
    fn block_light(&self, x: usize, z: usize, y: usize) -> u8;
}

// ---------------------------------------------------------------------------
// MemoryChunk
// ---------------------------------------------------------------------------

/// A fully materialised chunk column. Every voxel starts as air with data 0,
/// full sky light and no block light.
#[derive(Clone)]
pub struct MemoryChunk {
    types: Vec<BlockTypeId>,
    data: Vec<u8>,
    sky_light: Vec<u8>,
    block_light: Vec<u8>,
}

impl Default for MemoryChunk {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryChunk {
    pub fn new() -> Self {
        Self {
            types: vec![BlockTypeId::AIR; VOLUME],
            data: vec![0; VOLUME],
            sky_light: vec![15; VOLUME],
            block_light: vec![0; VOLUME],
        }
    }

    #[inline]
    fn index(x: usize, z: usize, y: usize) -> usize {
        (y * WIDTH + z) * WIDTH + x
    }

    pub fn set_sky_light(&mut self, x: usize, z: usize, y: usize, level: u8) {
        self.sky_light[Self::index(x, z, y)] = level.min(15);
    }

    pub fn set_block_light(&mut self, x: usize, z: usize, y: usize, level: u8) {
        self.block_light[Self::index(x, z, y)] = level.min(15);
    }

    /// Number of voxels that are not air.
    pub fn non_air_count(&self) -> usize {
        self.types.iter().filter(|t| **t != BlockTypeId::AIR).count()
    }
}

impl fmt::Debug for MemoryChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryChunk")
            .field("non_air", &self.non_air_count())
            .finish_non_exhaustive()
    }
}

impl ChunkStore for MemoryChunk {
    fn type_id(&self, x: usize, z: usize, y: usize) -> BlockTypeId {
        self.types[Self::index(x, z, y)]
    }

    fn set_type_id(&mut self, x: usize, z: usize, y: usize, type_id: BlockTypeId) {
        self.types[Self::index(x, z, y)] = type_id;
    }

    fn data(&self, x: usize, z: usize, y: usize) -> u8 {
        self.data[Self::index(x, z, y)]
    }

    fn set_data(&mut self, x: usize, z: usize, y: usize, data: u8) {
        self.data[Self::index(x, z, y)] = data;
    }

    fn sky_light(&self, x: usize, z: usize, y: usize) -> u8 {
        self.sky_light[Self::index(x, z, y)]
    }

    fn block_light(&self, x: usize, z: usize, y: usize) -> u8 {
        self.block_light[Self::index(x, z, y)]
    }
}
