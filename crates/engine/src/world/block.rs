/// Legacy numeric block identifier, one byte per voxel.
///
/// Filters compare against the named constants in [`ids`]; every other value
/// is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockId(pub u8);

impl BlockId {
    /// The universal "empty" block.
    pub const AIR: BlockId = BlockId(0);
}

/// Block ids the core filters need to recognise.
pub mod ids {
    use super::BlockId;

    pub const AIR: BlockId = BlockId(0);
    pub const STONE: BlockId = BlockId(1);
    pub const WOOD: BlockId = BlockId(5);
    pub const SAPLING: BlockId = BlockId(6);
    pub const BEDROCK: BlockId = BlockId(7);
    pub const WATER: BlockId = BlockId(8);
    pub const STATIONARY_WATER: BlockId = BlockId(9);
    pub const LAVA: BlockId = BlockId(10);
    pub const STATIONARY_LAVA: BlockId = BlockId(11);
    pub const LOG: BlockId = BlockId(17);
    pub const LEAVES: BlockId = BlockId(18);
    pub const BED: BlockId = BlockId(26);
    pub const YELLOW_FLOWER: BlockId = BlockId(37);
    pub const RED_FLOWER: BlockId = BlockId(38);
    pub const BROWN_MUSHROOM: BlockId = BlockId(39);
    pub const RED_MUSHROOM: BlockId = BlockId(40);
    pub const TORCH: BlockId = BlockId(50);
    pub const REDSTONE_WIRE: BlockId = BlockId(55);
    pub const MINECART_TRACKS: BlockId = BlockId(66);
    pub const NETHERRACK: BlockId = BlockId(87);
}

/// Blocks that only appear where a player has been.
pub fn is_non_natural(id: BlockId) -> bool {
    matches!(
        id,
        ids::TORCH | ids::BED | ids::MINECART_TRACKS | ids::REDSTONE_WIRE
    )
}

/// Blocks that usually sit above the terrain surface (air, water, foliage).
pub fn is_above_surface(id: BlockId) -> bool {
    matches!(
        id,
        ids::AIR
            | ids::WATER
            | ids::STATIONARY_WATER
            | ids::LEAVES
            | ids::WOOD
            | ids::LOG
            | ids::SAPLING
            | ids::RED_FLOWER
            | ids::YELLOW_FLOWER
            | ids::RED_MUSHROOM
            | ids::BROWN_MUSHROOM
    )
}
