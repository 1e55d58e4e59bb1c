//! Property-based tests for the Lodestone core.
//!
//! Uses proptest to generate random coordinates, faces and mutation
//! sequences, then verify the mutation and power invariants hold.

use std::collections::HashSet;

use lodestone_core::event::ChangeBuffer;
use lodestone_core::face::{ADJACENT, ALL, Face};
use lodestone_core::id::{BlockTypeId, WorldId};
use lodestone_core::physics::neighborhood;
use lodestone_core::test_utils::*;
use lodestone_core::voxel::{VoxelRef, WORLD_HEIGHT};
use proptest::prelude::*;
use std::sync::Arc;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_face() -> impl Strategy<Value = Face> {
    proptest::sample::select(ALL.to_vec())
}

fn arb_axis_face() -> impl Strategy<Value = Face> {
    proptest::sample::select(ADJACENT.to_vec())
}

/// Coordinates inside the chunks loaded by `test_world`, over the full
/// height range.
fn arb_coord() -> impl Strategy<Value = (i32, i32, i32)> {
    (-14..14i32, 0..WORLD_HEIGHT, -14..14i32)
}

fn in_height(y: i32) -> bool {
    (0..WORLD_HEIGHT).contains(&y)
}

fn arb_type() -> impl Strategy<Value = BlockTypeId> {
    prop_oneof![
        Just(BlockTypeId::AIR),
        Just(stone()),
        Just(glass()),
        Just(water()),
        // Ids that have no catalog entry at all.
        (500..600u32).prop_map(BlockTypeId),
    ]
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Writing the current type and data reports no change and emits nothing.
    #[test]
    fn identical_write_is_a_no_op(
        (x, y, z) in arb_coord(),
        ty in arb_type(),
        data in any::<u8>(),
    ) {
        let (mut world, log) = recording_world();
        let buffer = Arc::new(ChangeBuffer::new(64));
        let v = world.voxel_at(x, y, z);
        world.set_type_and_data(&v, ty, data, false).unwrap();
        world.connect_observer(buffer.clone());
        log.clear();

        let changed = world.set_type_and_data(&v, ty, data, true).unwrap();
        prop_assert!(!changed);
        prop_assert!(buffer.is_empty());
        prop_assert!(log.calls().is_empty());
    }

    /// Zero offsets hand back the receiver, chunk binding included.
    #[test]
    fn zero_offset_is_identity((x, y, z) in arb_coord(), face in arb_face()) {
        let mut v = VoxelRef::new(WorldId(3), x, y, z);
        v.unload();
        for same in [v.relative(0, 0, 0), v.relative_face(Face::SelfFace), v.relative_by(face, 0)] {
            prop_assert_eq!(same, v);
            prop_assert!(!same.is_loaded());
        }
    }

    /// One step through a face and one step back lands on the start, and the
    /// two refs see each other through opposite faces. A step past the
    /// height limit is clamped back onto the start.
    #[test]
    fn opposite_faces_are_symmetric((x, y, z) in arb_coord(), face in arb_face()) {
        let v = VoxelRef::new(WorldId(0), x, y, z);
        let n = v.relative_face(face);
        if !in_height(y + face.dy()) {
            prop_assert_eq!(n, v);
            return Ok(());
        }
        prop_assert_eq!(n.relative_face(face.opposite()), v);
        prop_assert_eq!(face.opposite().opposite(), face);
        prop_assert_eq!(v.face_to(&n), Some(face));
        prop_assert_eq!(n.face_to(&v), Some(face.opposite()));
    }

    /// Every neighbor in the cube is visited exactly once, the source never
    /// is, and layers past the height limits are left out.
    #[test]
    fn cascade_visits_each_neighbor_once((x, y, z) in arb_coord()) {
        let v = VoxelRef::new(WorldId(0), x, y, z);
        let neighbors: Vec<_> = neighborhood(&v).map(|(n, _)| n).collect();
        let distinct: HashSet<_> = neighbors.iter().copied().collect();
        let layers = [-1, 0, 1].into_iter().filter(|dy| in_height(y + dy)).count();
        let expected = layers * 9 - 1;
        prop_assert_eq!(neighbors.len(), expected);
        prop_assert_eq!(distinct.len(), expected);
        prop_assert!(!distinct.contains(&v));
        for n in &neighbors {
            prop_assert!((n.y() - y).abs() <= 1);
        }
    }

    /// Adding a correctly attached powered switch never unpowers a solid
    /// block, and always powers it.
    #[test]
    fn direct_power_is_monotone((x, y, z) in arb_coord(), face in arb_axis_face()) {
        prop_assume!(in_height(y + face.dy()));
        let mut world = signal_world();
        let target = world.voxel_at(x, y, z);
        world.set_type_id(&target, stone(), false).unwrap();
        let before = world.power().is_powered(&target);

        let switch = target.relative_face(face);
        world
            .set_type_and_data(&switch, switch_type(), switch_data(true, face.opposite()), false)
            .unwrap();
        let after = world.power().is_powered(&target);

        prop_assert!(after);
        prop_assert!(after || !before);
        prop_assert!(world.power().is_face_powered(&target, face));
    }

    /// Two refs to one coordinate share a counter, and expired events vanish.
    #[test]
    fn counter_is_keyed_by_coordinate(
        (x, y, z) in arb_coord(),
        start in 0..1_000u64,
        timeout in 0..100u64,
        events in 1..8usize,
    ) {
        let mut world = test_world();
        let a = world.voxel_at(x, y, z);
        let b = world.voxel_at(x, y, z);
        world.set_full_time(start);
        for _ in 0..events {
            world.count(&a, timeout);
        }

        world.set_full_time(start + timeout);
        prop_assert_eq!(world.counter(&b), events);
        world.set_full_time(start + timeout + 1);
        prop_assert_eq!(world.counter(&b), 0);
        prop_assert_eq!(world.rate_counter().tracked_positions(), 0);
    }
}
