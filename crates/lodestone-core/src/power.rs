//! One-hop power evaluation.
//!
//! Each block type may expose a [`SignalComponent`] describing its current
//! signal state (decoded from its data). The [`PowerEvaluator`] looks only at
//! those components and at the catalog's solidity flag, never at concrete
//! type ids, to decide whether a voxel or one of its faces carries power.
//!
//! There is no strength decay and no scheduling here: every answer is a
//! boolean derived from the six axis neighbors at the moment of the query.

use serde::{Deserialize, Serialize};

use crate::face::{ADJACENT, Face, FaceSet};
use crate::voxel::VoxelRef;
use crate::world::World;

// ---------------------------------------------------------------------------
// Signal components
// ---------------------------------------------------------------------------

/// The signal-relevant state of one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalComponent {
    /// Always powered, e.g. a block of redstone.
    Permanent,
    /// Lever or button. `attached` is the face pointing at the block it is
    /// mounted on.
    Switch { powered: bool, attached: Face },
    /// Repeater-style diode outputting through `facing`.
    Diode { active: bool, facing: Face },
    /// Torch. `attached` is the face pointing at its mounting block.
    Torch { lit: bool, attached: Face },
    /// Conductor carrying `strength` (0 is unpowered).
    Wire { strength: u8 },
}

impl SignalComponent {
    /// Whether this component powers itself regardless of neighbors.
    pub fn is_self_powered(self) -> bool {
        matches!(
            self,
            SignalComponent::Permanent | SignalComponent::Switch { powered: true, .. }
        )
    }
}

/// Piston interaction with a block. Never computed; see
/// [`PowerEvaluator::piston_move_reaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PistonMoveReaction {
    Move,
    Break,
    Block,
}

#[derive(Debug, thiserror::Error)]
pub enum PowerError {
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Read-only power queries. Obtained from [`World::power`].
#[derive(Debug, Clone, Copy)]
pub struct PowerEvaluator<'w> {
    world: &'w World,
}

impl<'w> PowerEvaluator<'w> {
    pub fn new(world: &'w World) -> Self {
        Self { world }
    }

    /// The signal component currently exposed at `voxel`, if any.
    pub fn signal_at(&self, voxel: &VoxelRef) -> Option<SignalComponent> {
        let type_id = self.world.type_id(voxel);
        let behavior = self.world.catalog().behavior(type_id)?;
        behavior.signal(self.world.data(voxel))
    }

    /// Faces the conductor at `voxel` connects to.
    pub fn connections(&self, voxel: &VoxelRef) -> FaceSet {
        let type_id = self.world.type_id(voxel);
        match self.world.catalog().behavior(type_id) {
            Some(behavior) => behavior.connections(self.world, voxel),
            None => FaceSet::EMPTY,
        }
    }

    /// Directly powered: a self-powered component, or a solid block with any
    /// axis neighbor driving power into it.
    pub fn is_powered(&self, voxel: &VoxelRef) -> bool {
        if self.signal_at(voxel).is_some_and(SignalComponent::is_self_powered) {
            return true;
        }
        if !self.world.is_solid(voxel) {
            return false;
        }
        ADJACENT
            .into_iter()
            .any(|face| self.drives_directly(voxel, face))
    }

    /// Like [`is_powered`](Self::is_powered), looking only at the neighbor
    /// through `face`.
    pub fn is_face_powered(&self, voxel: &VoxelRef, face: Face) -> bool {
        if self.signal_at(voxel).is_some_and(SignalComponent::is_self_powered) {
            return true;
        }
        if !self.world.is_solid(voxel) {
            return false;
        }
        self.drives_directly(voxel, face)
    }

    /// Any axis neighbor is itself powered or feeds power sideways into
    /// `voxel`.
    pub fn is_indirectly_powered(&self, voxel: &VoxelRef) -> bool {
        ADJACENT
            .into_iter()
            .any(|face| self.is_face_indirectly_powered(voxel, face))
    }

    pub fn is_face_indirectly_powered(&self, voxel: &VoxelRef, face: Face) -> bool {
        let neighbor = voxel.relative_face(face);
        self.is_powered(&neighbor) || self.drives_indirectly(voxel, face)
    }

    /// Signal strength is not modelled.
    pub fn block_power(&self, voxel: &VoxelRef) -> Result<u8, PowerError> {
        let _ = voxel;
        Err(PowerError::Unsupported("block_power"))
    }

    pub fn piston_move_reaction(&self, voxel: &VoxelRef) -> Result<PistonMoveReaction, PowerError> {
        let _ = voxel;
        Err(PowerError::Unsupported("piston_move_reaction"))
    }

    // -- Rules --

    /// Whether the neighbor of `voxel` through `face` pushes direct power
    /// into `voxel`.
    fn drives_directly(&self, voxel: &VoxelRef, face: Face) -> bool {
        let neighbor = voxel.relative_face(face);
        let Some(signal) = self.signal_at(&neighbor) else {
            return false;
        };
        let toward = neighbor.face_to(voxel);
        match signal {
            SignalComponent::Switch {
                powered: true,
                attached,
            } => toward == Some(attached),
            SignalComponent::Diode {
                active: true,
                facing,
            } => toward == Some(facing),
            SignalComponent::Torch { lit: true, .. } => face == Face::Down,
            SignalComponent::Wire { strength } if strength > 0 => {
                self.wire_points_at(&neighbor, toward)
            }
            _ => false,
        }
    }

    fn drives_indirectly(&self, voxel: &VoxelRef, face: Face) -> bool {
        let neighbor = voxel.relative_face(face);
        let Some(signal) = self.signal_at(&neighbor) else {
            return false;
        };
        match signal {
            SignalComponent::Torch {
                lit: true,
                attached,
            } => attached != face.opposite(),
            SignalComponent::Wire { strength } if strength > 0 => {
                self.wire_points_at(&neighbor, neighbor.face_to(voxel))
            }
            _ => false,
        }
    }

    fn wire_points_at(&self, wire: &VoxelRef, toward: Option<Face>) -> bool {
        toward.is_some_and(|face| self.connections(wire).contains(face))
    }
}
