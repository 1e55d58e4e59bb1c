//! Voxel identity and coordinate algebra.
//!
//! A [`VoxelRef`] names one block position in one world. It also carries the
//! position of the chunk that backs it; that binding is an accelerator only
//! and does not take part in equality or hashing. Clearing it with
//! [`VoxelRef::unload`] leaves the identity intact.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::face::Face;
use crate::id::WorldId;

/// Horizontal extent of a chunk along x and z.
pub const CHUNK_WIDTH: i32 = 16;

/// Number of block layers in a world. Valid `y` values are `0..WORLD_HEIGHT`.
pub const WORLD_HEIGHT: i32 = 256;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// An integer block position, without a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Position of a chunk column in chunk units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk column containing world block column `(x, z)`.
    pub fn containing(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(CHUNK_WIDTH),
            z: z.div_euclid(CHUNK_WIDTH),
        }
    }
}

/// A floating-point position in a world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: WorldId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// ---------------------------------------------------------------------------
// VoxelRef
// ---------------------------------------------------------------------------

/// A reference to a single voxel: world, block coordinates, and the chunk
/// binding used to reach its storage.
#[derive(Debug, Clone, Copy)]
pub struct VoxelRef {
    world: WorldId,
    pos: BlockPos,
    chunk: Option<ChunkPos>,
}

impl VoxelRef {
    /// Create a reference bound to the chunk containing `(x, z)`. `y` is
    /// clamped into `0..WORLD_HEIGHT`.
    pub fn new(world: WorldId, x: i32, y: i32, z: i32) -> Self {
        let y = y.clamp(0, WORLD_HEIGHT - 1);
        Self {
            world,
            pos: BlockPos { x, y, z },
            chunk: Some(ChunkPos::containing(x, z)),
        }
    }

    pub fn world(&self) -> WorldId {
        self.world
    }

    pub fn x(&self) -> i32 {
        self.pos.x
    }

    pub fn y(&self) -> i32 {
        self.pos.y
    }

    pub fn z(&self) -> i32 {
        self.pos.z
    }

    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    /// The chunk binding, or `None` once the reference has been unloaded.
    pub fn chunk(&self) -> Option<ChunkPos> {
        self.chunk
    }

    pub fn is_loaded(&self) -> bool {
        self.chunk.is_some()
    }

    /// Drop the chunk binding. Identity is unaffected.
    pub fn unload(&mut self) {
        self.chunk = None;
    }

    /// Coordinates inside the backing chunk: `(local_x, local_z, y)`.
    pub fn local(&self) -> (usize, usize, usize) {
        (
            (self.pos.x & (CHUNK_WIDTH - 1)) as usize,
            (self.pos.z & (CHUNK_WIDTH - 1)) as usize,
            self.pos.y as usize,
        )
    }

    // -- Relative addressing --

    /// The voxel at the given offset. A zero offset returns the receiver
    /// itself, chunk binding included.
    pub fn relative(&self, dx: i32, dy: i32, dz: i32) -> VoxelRef {
        if dx == 0 && dy == 0 && dz == 0 {
            return *self;
        }
        VoxelRef::new(
            self.world,
            self.pos.x.wrapping_add(dx),
            self.pos.y.saturating_add(dy),
            self.pos.z.wrapping_add(dz),
        )
    }

    /// The neighbor one step in `face`.
    pub fn relative_face(&self, face: Face) -> VoxelRef {
        if face == Face::SelfFace {
            return *self;
        }
        let (dx, dy, dz) = face.delta();
        self.relative(dx, dy, dz)
    }

    /// The voxel `distance` steps in `face`.
    pub fn relative_by(&self, face: Face, distance: i32) -> VoxelRef {
        match distance {
            0 => *self,
            1 => self.relative_face(face),
            _ => {
                let (dx, dy, dz) = face.delta();
                self.relative(
                    dx.wrapping_mul(distance),
                    dy.saturating_mul(distance),
                    dz.wrapping_mul(distance),
                )
            }
        }
    }

    /// The face of this voxel that leads to `other`, if `other` is in the
    /// same world and exactly one recognised step away (or is this voxel,
    /// which yields [`Face::SelfFace`]).
    pub fn face_to(&self, other: &VoxelRef) -> Option<Face> {
        if other.world != self.world {
            return None;
        }
        Face::from_delta(
            other.pos.x.wrapping_sub(self.pos.x),
            other.pos.y - self.pos.y,
            other.pos.z.wrapping_sub(self.pos.z),
        )
    }

    // -- Locations --

    pub fn location(&self) -> Location {
        Location {
            world: self.world,
            x: self.pos.x as f64,
            y: self.pos.y as f64,
            z: self.pos.z as f64,
        }
    }

    /// Overwrite `loc` with this voxel's location. An absent target stays absent.
    pub fn location_into<'a>(&self, loc: Option<&'a mut Location>) -> Option<&'a mut Location> {
        let loc = loc?;
        *loc = self.location();
        Some(loc)
    }
}

impl PartialEq for VoxelRef {
    fn eq(&self, other: &Self) -> bool {
        self.world == other.world && self.pos == other.pos
    }
}

impl Eq for VoxelRef {}

impl Hash for VoxelRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.world.hash(state);
        self.pos.hash(state);
    }
}

impl fmt::Display for VoxelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VoxelRef{{world={},x={},y={},z={}}}",
            self.world.0, self.pos.x, self.pos.y, self.pos.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::{ADJACENT, ALL};
    use std::collections::HashSet;

    fn w() -> WorldId {
        WorldId(0)
    }

    #[test]
    fn y_is_clamped() {
        assert_eq!(VoxelRef::new(w(), 0, -5, 0).y(), 0);
        assert_eq!(VoxelRef::new(w(), 0, 300, 0).y(), WORLD_HEIGHT - 1);
        assert_eq!(VoxelRef::new(w(), 0, 64, 0).y(), 64);
    }

    #[test]
    fn equality_ignores_chunk_binding() {
        let a = VoxelRef::new(w(), 3, 10, -7);
        let mut b = VoxelRef::new(w(), 3, 10, -7);
        b.unload();
        assert!(!b.is_loaded());
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn different_worlds_are_not_equal() {
        let a = VoxelRef::new(WorldId(0), 1, 1, 1);
        let b = VoxelRef::new(WorldId(1), 1, 1, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn chunk_binding_follows_coordinates() {
        let v = VoxelRef::new(w(), -1, 5, 17);
        assert_eq!(v.chunk(), Some(ChunkPos::new(-1, 1)));
        assert_eq!(v.local(), (15, 1, 5));
    }

    #[test]
    fn zero_offset_returns_receiver() {
        let mut v = VoxelRef::new(w(), 4, 4, 4);
        v.unload();
        // The unloaded binding survives only when the receiver itself comes back.
        assert!(!v.relative(0, 0, 0).is_loaded());
        assert!(!v.relative_face(Face::SelfFace).is_loaded());
        for face in ALL {
            assert!(!v.relative_by(face, 0).is_loaded());
        }
        assert!(v.relative(1, 0, 0).is_loaded());
    }

    #[test]
    fn relative_by_matches_repeated_steps() {
        let v = VoxelRef::new(w(), 0, 64, 0);
        assert_eq!(v.relative_by(Face::East, 3), VoxelRef::new(w(), 3, 64, 0));
        assert_eq!(v.relative_by(Face::Up, 1), v.relative_face(Face::Up));
        assert_eq!(v.relative_by(Face::North, -2), VoxelRef::new(w(), 0, 64, 2));
    }

    #[test]
    fn face_to_neighbors() {
        let v = VoxelRef::new(w(), 10, 64, 10);
        for face in ADJACENT {
            let n = v.relative_face(face);
            assert_eq!(v.face_to(&n), Some(face));
            assert_eq!(n.face_to(&v), Some(face.opposite()));
        }
        assert_eq!(v.face_to(&v), Some(Face::SelfFace));
        assert_eq!(v.face_to(&v.relative(2, 0, 0)), None);
        assert_eq!(v.face_to(&v.relative(1, 1, 0)), None);
    }

    #[test]
    fn face_to_other_world_is_none() {
        let a = VoxelRef::new(WorldId(0), 0, 0, 0);
        let b = VoxelRef::new(WorldId(1), 1, 0, 0);
        assert_eq!(a.face_to(&b), None);
    }

    #[test]
    fn location_round_trip() {
        let v = VoxelRef::new(w(), -3, 12, 9);
        let loc = v.location();
        assert_eq!((loc.x, loc.y, loc.z), (-3.0, 12.0, 9.0));
        assert_eq!(loc.world, w());

        let mut target = Location {
            world: WorldId(9),
            x: 0.5,
            y: 0.5,
            z: 0.5,
        };
        let written = v.location_into(Some(&mut target)).map(|l| *l);
        assert_eq!(written, Some(loc));
        assert!(v.location_into(None).is_none());
    }

    #[test]
    fn display_names_coordinates() {
        let v = VoxelRef::new(w(), 1, 2, 3);
        assert_eq!(v.to_string(), "VoxelRef{world=0,x=1,y=2,z=3}");
    }
}
