//! Lodestone Core -- voxel mutation and signal propagation for block worlds.
//!
//! This crate owns the single mutation path for a block world and everything
//! that hangs off it: change records for observers, the neighborhood physics
//! cascade, one-hop power evaluation and a sliding-window rate counter.
//!
//! # Mutation Pipeline
//!
//! Each call to [`world::World::set_type_and_data`] runs:
//!
//! 1. **Diff** -- Read the old type and data, write only what differs.
//! 2. **Broadcast** -- On change, send one [`event::BlockChange`] to every
//!    connected observer.
//! 3. **Cascade** -- If physics is requested, notify the 26 neighbors through
//!    their type's [`registry::BlockBehavior`], then the old type's own hook.
//!
//! Hooks receive `&mut World` and may mutate again; the cascade recurses
//! synchronously.
//!
//! ```rust,ignore
//! let v = world.voxel_at(0, 64, 0);
//! let changed = world.set_type_and_data(&v, stone, 0, true)?;
//! let powered = world.power().is_powered(&v);
//! ```
//!
//! # Key Types
//!
//! - [`voxel::VoxelRef`] -- Coordinate identity with face algebra.
//! - [`world::World`] -- Chunks, catalog, observers, time and the counter.
//! - [`registry::TypeCatalog`] -- Immutable per-type properties and behavior.
//! - [`power::PowerEvaluator`] -- Direct and indirect power queries.
//! - [`counter::RateCounter`] -- Expiring per-position event counts.

pub mod chunk;
pub mod counter;
pub mod event;
pub mod face;
pub mod id;
pub mod physics;
pub mod power;
pub mod registry;
pub mod voxel;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
