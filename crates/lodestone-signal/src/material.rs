//! Vanilla block type ids and the data-bit layouts of signal components.
//!
//! Attached faces always point from the component at the block it is
//! mounted on. Facing points the way a component outputs.

use lodestone_core::face::Face;
use lodestone_core::id::BlockTypeId;

// ---------------------------------------------------------------------------
// Type ids
// ---------------------------------------------------------------------------

pub const AIR: BlockTypeId = BlockTypeId::AIR;
pub const STONE: BlockTypeId = BlockTypeId(1);
pub const GRASS: BlockTypeId = BlockTypeId(2);
pub const DIRT: BlockTypeId = BlockTypeId(3);
pub const COBBLESTONE: BlockTypeId = BlockTypeId(4);
pub const WOOD: BlockTypeId = BlockTypeId(5);
pub const WATER: BlockTypeId = BlockTypeId(8);
pub const STATIONARY_WATER: BlockTypeId = BlockTypeId(9);
pub const LAVA: BlockTypeId = BlockTypeId(10);
pub const STATIONARY_LAVA: BlockTypeId = BlockTypeId(11);
pub const GLASS: BlockTypeId = BlockTypeId(20);
pub const REDSTONE_WIRE: BlockTypeId = BlockTypeId(55);
pub const LEVER: BlockTypeId = BlockTypeId(69);
pub const REDSTONE_TORCH_OFF: BlockTypeId = BlockTypeId(75);
pub const REDSTONE_TORCH_ON: BlockTypeId = BlockTypeId(76);
pub const STONE_BUTTON: BlockTypeId = BlockTypeId(77);
pub const DIODE_BLOCK_OFF: BlockTypeId = BlockTypeId(93);
pub const DIODE_BLOCK_ON: BlockTypeId = BlockTypeId(94);
pub const WOOD_BUTTON: BlockTypeId = BlockTypeId(143);
pub const REDSTONE_BLOCK: BlockTypeId = BlockTypeId(152);

// ---------------------------------------------------------------------------
// Data bits
// ---------------------------------------------------------------------------

/// Powered bit shared by levers and buttons.
pub const POWERED_BIT: u8 = 0x8;

/// Wire strength lives in the low nibble.
pub const MAX_STRENGTH: u8 = 15;

pub fn switch_powered(data: u8) -> bool {
    data & POWERED_BIT != 0
}

pub fn with_powered(data: u8, powered: bool) -> u8 {
    if powered {
        data | POWERED_BIT
    } else {
        data & !POWERED_BIT
    }
}

pub fn lever_attached(data: u8) -> Face {
    match data & 0x7 {
        1 => Face::West,
        2 => Face::East,
        3 => Face::North,
        4 => Face::South,
        5 | 6 => Face::Down,
        _ => Face::Up,
    }
}

/// Lever data for a mounting face. Only axis faces can be mounted on.
pub fn lever_data(attached: Face, powered: bool) -> Option<u8> {
    let bits = match attached {
        Face::West => 1,
        Face::East => 2,
        Face::North => 3,
        Face::South => 4,
        Face::Down => 5,
        Face::Up => 0,
        _ => return None,
    };
    Some(with_powered(bits, powered))
}

pub fn button_attached(data: u8) -> Option<Face> {
    match data & 0x7 {
        0 => Some(Face::Up),
        1 => Some(Face::West),
        2 => Some(Face::East),
        3 => Some(Face::North),
        4 => Some(Face::South),
        5 => Some(Face::Down),
        _ => None,
    }
}

pub fn button_data(attached: Face, powered: bool) -> Option<u8> {
    let bits = match attached {
        Face::Up => 0,
        Face::West => 1,
        Face::East => 2,
        Face::North => 3,
        Face::South => 4,
        Face::Down => 5,
        _ => return None,
    };
    Some(with_powered(bits, powered))
}

/// Torches stand on the floor unless mounted on a wall.
pub fn torch_attached(data: u8) -> Face {
    match data {
        1 => Face::West,
        2 => Face::East,
        3 => Face::North,
        4 => Face::South,
        _ => Face::Down,
    }
}

pub fn torch_data(attached: Face) -> Option<u8> {
    match attached {
        Face::West => Some(1),
        Face::East => Some(2),
        Face::North => Some(3),
        Face::South => Some(4),
        Face::Down => Some(5),
        _ => None,
    }
}

pub fn diode_facing(data: u8) -> Face {
    match data & 0x3 {
        0 => Face::North,
        1 => Face::East,
        2 => Face::South,
        _ => Face::West,
    }
}

/// Repeater data for an output facing, keeping the delay bits of `data`.
pub fn diode_data(facing: Face, data: u8) -> Option<u8> {
    let bits = match facing {
        Face::North => 0,
        Face::East => 1,
        Face::South => 2,
        Face::West => 3,
        _ => return None,
    };
    Some((data & !0x3) | bits)
}

pub fn wire_strength(data: u8) -> u8 {
    data & 0x0F
}
