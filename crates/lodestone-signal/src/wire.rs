//! Wire connectivity and network powering.
//!
//! Wires link to wires beside them, and climb one step up or down where the
//! corner is open. A set of linked wires forms a network that is either fully
//! powered or fully unpowered: it carries [`MAX_STRENGTH`] exactly when some
//! wire in it is fed by a non-wire source one hop away. Wires never feed each
//! other, so a network cannot hold itself on.

use std::collections::{HashSet, VecDeque};

use lodestone_core::face::{ADJACENT, Face, FaceSet, HORIZONTAL};
use lodestone_core::power::SignalComponent;
use lodestone_core::voxel::VoxelRef;
use lodestone_core::world::{World, WorldError};
use tracing::trace;

use crate::material::MAX_STRENGTH;

/// Upper bound on wires visited when collecting one network.
pub const MAX_NETWORK_SIZE: usize = 4096;

fn is_wire(world: &World, voxel: &VoxelRef) -> bool {
    matches!(
        world.power().signal_at(voxel),
        Some(SignalComponent::Wire { .. })
    )
}

/// Wire reachable from `wire` through `face`, if any: the wire beside it, or
/// one climbing down past an open side, or one up past an open top.
fn linked_through(world: &World, wire: &VoxelRef, face: Face) -> Option<VoxelRef> {
    let side = wire.relative_face(face);
    if is_wire(world, &side) {
        return Some(side);
    }
    let below = side.relative_face(Face::Down);
    if !world.is_solid(&side) && below != side && is_wire(world, &below) {
        return Some(below);
    }
    let above = side.relative_face(Face::Up);
    let open_top = !world.is_solid(&wire.relative_face(Face::Up));
    if open_top && above != side && is_wire(world, &above) {
        return Some(above);
    }
    None
}

/// Faces a wire at `wire` connects to. Always includes [`Face::Down`]. A
/// wire with no horizontal partner points all four ways; a wire with one
/// partner also points straight through.
pub fn connections(world: &World, wire: &VoxelRef) -> FaceSet {
    let power = world.power();
    let mut horizontal: FaceSet = HORIZONTAL
        .into_iter()
        .filter(|&face| {
            power.signal_at(&wire.relative_face(face)).is_some()
                || linked_through(world, wire, face).is_some()
        })
        .collect();

    match horizontal.len() {
        0 => horizontal = HORIZONTAL.into_iter().collect(),
        1 => {
            let first = horizontal.iter().next();
            if let Some(face) = first {
                horizontal.insert(face.opposite());
            }
        }
        _ => {}
    }
    horizontal.insert(Face::Down);
    horizontal
}

/// All wires linked to `start`, `start` first.
pub fn collect_network(world: &World, start: &VoxelRef) -> Vec<VoxelRef> {
    let mut seen = HashSet::from([*start]);
    let mut queue = VecDeque::from([*start]);
    let mut network = Vec::new();

    while let Some(wire) = queue.pop_front() {
        network.push(wire);
        if network.len() >= MAX_NETWORK_SIZE {
            break;
        }
        for face in HORIZONTAL {
            if let Some(next) = linked_through(world, &wire, face) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }
    network
}

/// Whether a non-wire neighbor of `wire` drives power into it.
pub fn is_fed(world: &World, wire: &VoxelRef) -> bool {
    let power = world.power();
    ADJACENT.into_iter().any(|face| {
        let neighbor = wire.relative_face(face);
        match power.signal_at(&neighbor) {
            Some(SignalComponent::Permanent) => true,
            Some(SignalComponent::Switch { powered, .. }) => powered,
            Some(SignalComponent::Torch { lit, .. }) => lit,
            Some(SignalComponent::Diode { active, facing }) => {
                active && neighbor.face_to(wire) == Some(facing)
            }
            Some(SignalComponent::Wire { .. }) => false,
            None => world.is_solid(&neighbor) && is_strongly_powered(world, &neighbor),
        }
    })
}

/// A solid block driven by a switch, diode or torch. Wires are ignored, so a
/// block powered only by the network does not feed it back.
fn is_strongly_powered(world: &World, block: &VoxelRef) -> bool {
    let power = world.power();
    ADJACENT.into_iter().any(|face| {
        let source = block.relative_face(face);
        let toward = source.face_to(block);
        match power.signal_at(&source) {
            Some(SignalComponent::Switch {
                powered: true,
                attached,
            }) => toward == Some(attached),
            Some(SignalComponent::Diode {
                active: true,
                facing,
            }) => toward == Some(facing),
            Some(SignalComponent::Torch { lit: true, .. }) => face == Face::Down,
            _ => false,
        }
    })
}

/// Recompute the network containing `start` and write the result to every
/// wire in it that disagrees.
pub fn update_network(world: &mut World, start: &VoxelRef) -> Result<(), WorldError> {
    let network = collect_network(world, start);
    let fed = network.iter().any(|wire| is_fed(world, wire));
    let strength = if fed { MAX_STRENGTH } else { 0 };
    trace!(
        x = start.x(),
        y = start.y(),
        z = start.z(),
        wires = network.len(),
        strength,
        "Wire network evaluated"
    );

    for wire in &network {
        // Earlier writes cascade and may already have settled this wire.
        if is_wire(world, wire) && world.data(wire) != strength {
            world.set_data(wire, strength, true)?;
        }
    }
    Ok(())
}
