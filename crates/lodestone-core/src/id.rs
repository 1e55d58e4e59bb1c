use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies an observer registered with a world.
    pub struct ObserverId;
}

/// Identifies a block type in the catalog. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockTypeId(pub u32);

impl BlockTypeId {
    /// The empty block. Unloaded or never-written storage reads as air.
    pub const AIR: BlockTypeId = BlockTypeId(0);
}

/// Identifies a world. Two voxel references are only comparable within one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorldId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_type_id_equality() {
        let a = BlockTypeId(1);
        let b = BlockTypeId(1);
        let c = BlockTypeId(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn air_is_zero() {
        assert_eq!(BlockTypeId::AIR, BlockTypeId(0));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(BlockTypeId(1), "stone");
        map.insert(BlockTypeId(55), "redstone_wire");
        assert_eq!(map[&BlockTypeId(55)], "redstone_wire");
    }

    #[test]
    fn world_ids_order() {
        assert!(WorldId(0) < WorldId(1));
    }
}
