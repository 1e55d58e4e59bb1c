//! Neighborhood notification after a mutation.
//!
//! The cascade visits the 26 voxels of the 3x3x3 cube around the source
//! (three [`LAYER`]s, minus the source itself). At the top and bottom of the
//! world the layer beyond the height limit is skipped. Each neighbor whose current
//! type has a behavior gets `on_near_block_changed`; the behavior of the
//! source's *old* type then gets `on_block_changed` once. Hooks may mutate
//! the world again, which recurses synchronously.

use std::sync::Arc;

use tracing::trace;

use crate::face::{Face, LAYER};
use crate::id::BlockTypeId;
use crate::registry::{BlockUpdate, TypeCatalog};
use crate::voxel::{VoxelRef, WORLD_HEIGHT};
use crate::world::{World, WorldError};

/// Face of a neighbor, offset `dy` layers from the source and in compass
/// direction `face` from it, that points back at the source. Only straight
/// axis relations have one.
pub fn notification_face(face: Face, dy: i32) -> Option<Face> {
    match (dy, face) {
        (0, face) => Some(face.opposite()),
        (-1, Face::SelfFace) => Some(Face::Up),
        (1, Face::SelfFace) => Some(Face::Down),
        _ => None,
    }
}

/// The neighbors of `source` with the face each one is notified with,
/// bottom layer first. That is 26 voxels, or 17 on the lowest and highest
/// layers.
pub fn neighborhood(source: &VoxelRef) -> impl Iterator<Item = (VoxelRef, Option<Face>)> + '_ {
    (-1..=1)
        .filter(move |dy| (0..WORLD_HEIGHT).contains(&(source.y() + dy)))
        .flat_map(move |dy| {
            LAYER
                .into_iter()
                .filter(move |&face| !(dy == 0 && face == Face::SelfFace))
                .map(move |face| {
                    let neighbor = source.relative(face.dx(), face.dy() + dy, face.dz());
                    (neighbor, notification_face(face, dy))
                })
        })
}

impl World {
    /// Run the physics cascade for a mutation of `source` that has already
    /// been written.
    ///
    /// A failing hook does not stop the cascade: every neighbor is still
    /// notified and the first error is returned afterwards.
    pub fn apply_physics(
        &mut self,
        source: VoxelRef,
        old_type: BlockTypeId,
        new_type: BlockTypeId,
        old_data: u8,
        new_data: u8,
    ) -> Result<(), WorldError> {
        let update = BlockUpdate {
            source,
            old_type,
            old_data,
            new_type,
            new_data,
        };
        // Hooks take the world mutably, so the catalog is held separately.
        let catalog = Arc::clone(self.catalog());

        self.cascade_depth += 1;
        trace!(
            depth = self.cascade_depth,
            x = source.x(),
            y = source.y(),
            z = source.z(),
            old_type = old_type.0,
            new_type = new_type.0,
            "Applying physics"
        );
        let result = self.notify_neighbors(&catalog, &update);
        self.cascade_depth -= 1;
        result
    }

    fn notify_neighbors(
        &mut self,
        catalog: &TypeCatalog,
        update: &BlockUpdate,
    ) -> Result<(), WorldError> {
        let mut first_error = None;
        for (neighbor, face) in neighborhood(&update.source) {
            let neighbor_type = self.type_id(&neighbor);
            if let Some(behavior) = catalog.behavior(neighbor_type) {
                if let Err(err) = behavior.on_near_block_changed(self, neighbor, face, update) {
                    first_error.get_or_insert(err);
                }
            }
        }

        if let Some(behavior) = catalog.behavior(update.old_type) {
            if let Err(err) = behavior.on_block_changed(self, update) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::registry::{BlockBehavior, BlockProperties};
    use crate::test_utils::*;
    use crate::voxel::ChunkPos;

    #[test]
    fn neighborhood_is_the_full_cube_minus_source() {
        let world = test_world();
        let source = world.voxel_at(0, 64, 0);
        let neighbors: Vec<_> = neighborhood(&source).map(|(v, _)| v).collect();
        assert_eq!(neighbors.len(), 26);

        let distinct: HashSet<_> = neighbors.iter().copied().collect();
        assert_eq!(distinct.len(), 26);
        assert!(!distinct.contains(&source));
        for v in &neighbors {
            assert!((v.x() - source.x()).abs() <= 1);
            assert!((v.y() - source.y()).abs() <= 1);
            assert!((v.z() - source.z()).abs() <= 1);
        }
    }

    #[test]
    fn faces_point_back_at_source() {
        let world = test_world();
        let source = world.voxel_at(5, 64, 5);
        for (neighbor, face) in neighborhood(&source) {
            if let Some(face) = face {
                assert_eq!(neighbor.relative_face(face), source);
            }
        }
    }

    #[test]
    fn only_axis_neighbors_get_a_face() {
        let world = test_world();
        let source = world.voxel_at(5, 64, 5);
        let with_face = neighborhood(&source)
            .filter(|(_, face)| face.is_some_and(Face::is_axis))
            .count();
        assert_eq!(with_face, 6);
    }

    #[test]
    fn same_layer_diagonals_get_their_opposite() {
        assert_eq!(
            notification_face(Face::NorthEast, 0),
            Some(Face::SouthWest)
        );
        assert_eq!(notification_face(Face::NorthEast, 1), None);
        assert_eq!(notification_face(Face::North, -1), None);
        assert_eq!(notification_face(Face::SelfFace, -1), Some(Face::Up));
        assert_eq!(notification_face(Face::SelfFace, 1), Some(Face::Down));
    }

    #[test]
    fn every_behaving_neighbor_is_notified_once() {
        let (mut world, log) = recording_world();
        let source = world.voxel_at(8, 64, 8);
        for (neighbor, _) in neighborhood(&source) {
            world.set_type_id(&neighbor, recorder(), false).unwrap();
        }
        log.clear();

        world.set_type_id(&source, stone(), true).unwrap();

        let calls = log.calls();
        let near: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                HookCall::Near { block, .. } => Some(*block),
                HookCall::Changed { .. } => None,
            })
            .collect();
        assert_eq!(near.len(), 26);
        let distinct: HashSet<_> = near.iter().copied().collect();
        assert_eq!(distinct.len(), 26);
        // Old type was air, which has no behavior.
        assert!(!calls.iter().any(|c| matches!(c, HookCall::Changed { .. })));
    }

    #[test]
    fn old_type_hook_sees_the_transition() {
        let (mut world, log) = recording_world();
        let source = world.voxel_at(1, 10, 1);
        world.set_type_and_data(&source, recorder(), 2, false).unwrap();
        log.clear();

        world.set_data(&source, 7, true).unwrap();

        let changed: Vec<_> = log
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                HookCall::Changed { update } => Some(update),
                HookCall::Near { .. } => None,
            })
            .collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].old_type, recorder());
        assert_eq!(changed[0].new_type, recorder());
        assert_eq!(changed[0].old_data, 2);
        assert_eq!(changed[0].new_data, 7);
    }

    #[test]
    fn no_physics_means_no_hooks() {
        let (mut world, log) = recording_world();
        let source = world.voxel_at(1, 10, 1);
        world.set_type_id(&source.relative_face(Face::Up), recorder(), false).unwrap();
        world.set_type_id(&source, recorder(), false).unwrap();
        world.set_data(&source, 3, false).unwrap();
        assert!(log.calls().is_empty());
    }

    #[test]
    fn height_limits_trim_the_cube() {
        for y in [0, WORLD_HEIGHT - 1] {
            let (mut world, log) = recording_world();
            let source = world.voxel_at(8, y, 8);
            let mut expected = HashSet::new();
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let ny = y + dy;
                        if (dx, dy, dz) == (0, 0, 0) || !(0..WORLD_HEIGHT).contains(&ny) {
                            continue;
                        }
                        let neighbor = world.voxel_at(8 + dx, ny, 8 + dz);
                        world.set_type_id(&neighbor, recorder(), false).unwrap();
                        expected.insert(neighbor);
                    }
                }
            }
            assert_eq!(expected.len(), 17);
            log.clear();

            world.set_data(&source, 1, true).unwrap();

            let near: Vec<_> = log
                .calls()
                .into_iter()
                .filter_map(|c| match c {
                    HookCall::Near { block, .. } => Some(block),
                    HookCall::Changed { .. } => None,
                })
                .collect();
            let distinct: HashSet<_> = near.iter().copied().collect();
            assert_eq!(near.len(), 17, "y={y}");
            assert_eq!(distinct, expected, "y={y}");
            assert!(!distinct.contains(&source), "y={y}");
        }
    }

    #[derive(Debug)]
    struct Failing {
        calls: Arc<AtomicUsize>,
    }

    impl BlockBehavior for Failing {
        fn on_near_block_changed(
            &self,
            _world: &mut World,
            _block: VoxelRef,
            _face: Option<Face>,
            _update: &BlockUpdate,
        ) -> Result<(), WorldError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(WorldError::ChunkNotLoaded(ChunkPos::new(99, 99)))
        }
    }

    #[test]
    fn failing_hook_does_not_stop_the_cascade() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut b = test_catalog();
        b.register(BlockTypeId(300), "failing", BlockProperties::non_solid())
            .unwrap();
        b.attach_behavior(
            "failing",
            Arc::new(Failing {
                calls: Arc::clone(&calls),
            }),
        )
        .unwrap();
        let mut world = world_with(b);
        let source = world.voxel_at(4, 64, 4);
        for face in [Face::North, Face::Up, Face::SouthWest] {
            world
                .set_type_id(&source.relative_face(face), BlockTypeId(300), false)
                .unwrap();
        }

        let result = world.set_type_id(&source, stone(), true);

        assert!(matches!(result, Err(WorldError::ChunkNotLoaded(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // The write itself stands.
        assert_eq!(world.type_id(&source), stone());
        assert_eq!(world.cascade_depth(), 0);
    }

    #[test]
    fn depth_returns_to_zero() {
        let (mut world, _log) = recording_world();
        let source = world.voxel_at(1, 10, 1);
        world.set_type_id(&source, stone(), true).unwrap();
        assert_eq!(world.cascade_depth(), 0);
    }
}
