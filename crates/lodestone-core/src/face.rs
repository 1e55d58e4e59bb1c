//! Face algebra: the directions a voxel can be addressed from its neighbors.
//!
//! The coordinate convention is `+x` east, `+y` up, `+z` south, so north is
//! `-z`. Horizontal diagonals carry a two-axis delta and `SelfFace` the zero
//! delta.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Face
// ---------------------------------------------------------------------------

/// One of the recognised directions from a voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Face {
    North,
    East,
    South,
    West,
    Up,
    Down,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
    SelfFace,
}

/// Every defined face, in scan order.
pub const ALL: [Face; 11] = [
    Face::North,
    Face::East,
    Face::South,
    Face::West,
    Face::Up,
    Face::Down,
    Face::NorthEast,
    Face::NorthWest,
    Face::SouthEast,
    Face::SouthWest,
    Face::SelfFace,
];

/// The six axis-aligned faces.
pub const ADJACENT: [Face; 6] = [
    Face::North,
    Face::East,
    Face::South,
    Face::West,
    Face::Up,
    Face::Down,
];

/// A single horizontal 3x3 layer: eight compass faces and the center.
pub const LAYER: [Face; 9] = [
    Face::NorthWest,
    Face::North,
    Face::NorthEast,
    Face::East,
    Face::SelfFace,
    Face::West,
    Face::SouthWest,
    Face::South,
    Face::SouthEast,
];

/// The four horizontal axis faces.
pub const HORIZONTAL: [Face; 4] = [Face::North, Face::East, Face::South, Face::West];

impl Face {
    /// Offset `(dx, dy, dz)` of one step in this direction.
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::North => (0, 0, -1),
            Face::East => (1, 0, 0),
            Face::South => (0, 0, 1),
            Face::West => (-1, 0, 0),
            Face::Up => (0, 1, 0),
            Face::Down => (0, -1, 0),
            Face::NorthEast => (1, 0, -1),
            Face::NorthWest => (-1, 0, -1),
            Face::SouthEast => (1, 0, 1),
            Face::SouthWest => (-1, 0, 1),
            Face::SelfFace => (0, 0, 0),
        }
    }

    pub fn dx(self) -> i32 {
        self.delta().0
    }

    pub fn dy(self) -> i32 {
        self.delta().1
    }

    pub fn dz(self) -> i32 {
        self.delta().2
    }

    /// The face pointing the other way. `SelfFace` is its own opposite.
    pub fn opposite(self) -> Face {
        match self {
            Face::North => Face::South,
            Face::East => Face::West,
            Face::South => Face::North,
            Face::West => Face::East,
            Face::Up => Face::Down,
            Face::Down => Face::Up,
            Face::NorthEast => Face::SouthWest,
            Face::NorthWest => Face::SouthEast,
            Face::SouthEast => Face::NorthWest,
            Face::SouthWest => Face::NorthEast,
            Face::SelfFace => Face::SelfFace,
        }
    }

    /// The face whose delta is exactly `(dx, dy, dz)`, scanning [`ALL`].
    pub fn from_delta(dx: i32, dy: i32, dz: i32) -> Option<Face> {
        ALL.into_iter().find(|face| face.delta() == (dx, dy, dz))
    }

    /// Whether this is one of the six axis faces.
    pub fn is_axis(self) -> bool {
        ADJACENT.contains(&self)
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

// ---------------------------------------------------------------------------
// FaceSet
// ---------------------------------------------------------------------------

/// A small set of faces, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FaceSet(u16);

impl FaceSet {
    pub const EMPTY: FaceSet = FaceSet(0);

    pub fn new() -> Self {
        Self::EMPTY
    }

    pub fn insert(&mut self, face: Face) {
        self.0 |= face.bit();
    }

    pub fn remove(&mut self, face: Face) {
        self.0 &= !face.bit();
    }

    pub fn contains(&self, face: Face) -> bool {
        self.0 & face.bit() != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate members in [`ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = Face> + '_ {
        ALL.into_iter().filter(|face| self.contains(*face))
    }
}

impl FromIterator<Face> for FaceSet {
    fn from_iter<I: IntoIterator<Item = Face>>(iter: I) -> Self {
        let mut set = FaceSet::EMPTY;
        for face in iter {
            set.insert(face);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        for face in ALL {
            assert_eq!(face.opposite().opposite(), face);
        }
    }

    #[test]
    fn opposite_negates_delta() {
        for face in ALL {
            let (dx, dy, dz) = face.delta();
            assert_eq!(face.opposite().delta(), (-dx, -dy, -dz));
        }
    }

    #[test]
    fn deltas_are_unique() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert_ne!(a.delta(), b.delta(), "{a:?} and {b:?} share a delta");
            }
        }
    }

    #[test]
    fn from_delta_recognises_every_face() {
        for face in ALL {
            let (dx, dy, dz) = face.delta();
            assert_eq!(Face::from_delta(dx, dy, dz), Some(face));
        }
        assert_eq!(Face::from_delta(2, 0, 0), None);
        assert_eq!(Face::from_delta(1, 1, 0), None);
    }

    #[test]
    fn north_is_negative_z() {
        assert_eq!(Face::North.delta(), (0, 0, -1));
        assert_eq!(Face::NorthEast.delta(), (1, 0, -1));
    }

    #[test]
    fn adjacent_faces_are_axis() {
        assert!(ADJACENT.iter().all(|f| f.is_axis()));
        assert!(!Face::NorthEast.is_axis());
        assert!(!Face::SelfFace.is_axis());
    }

    #[test]
    fn layer_is_flat_and_complete() {
        assert!(LAYER.iter().all(|f| f.dy() == 0));
        assert!(LAYER.contains(&Face::SelfFace));
        let mut deltas: Vec<_> = LAYER.iter().map(|f| (f.dx(), f.dz())).collect();
        deltas.sort();
        deltas.dedup();
        assert_eq!(deltas.len(), 9);
    }

    #[test]
    fn face_set_membership() {
        let mut set = FaceSet::new();
        assert!(set.is_empty());
        set.insert(Face::Down);
        set.insert(Face::North);
        set.insert(Face::North);
        assert_eq!(set.len(), 2);
        assert!(set.contains(Face::Down));
        assert!(!set.contains(Face::Up));
        set.remove(Face::Down);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Face::North]);
    }

    #[test]
    fn face_set_from_iter() {
        let set: FaceSet = HORIZONTAL.into_iter().collect();
        assert_eq!(set.len(), 4);
        assert!(!set.contains(Face::Up));
    }
}
