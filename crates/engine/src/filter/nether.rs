use super::{BlockFilter, FilterError};
use crate::world::block::{BlockId, ids};
use crate::world::chunk::{CHUNK_DEPTH, CHUNK_WIDTH, RawChunk};

/// Top layer of the nether's bedrock ceiling.
pub const NETHER_ROOF: usize = 127;

/// Strips the nether ceiling so the map shows the caverns below it.
///
/// The roof layer loses its bedrock (and any mushroom growing on it); below
/// that, bedrock and netherrack are cleared down to the first other block.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetherRoofFilter;

impl BlockFilter for NetherRoofFilter {
    fn filter(&self, chunk: &mut RawChunk) -> Result<(), FilterError> {
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                if chunk.block(x, NETHER_ROOF, z) == ids::BEDROCK {
                    chunk.set_block(x, NETHER_ROOF, z, BlockId::AIR);
                    let above = chunk.block(x, NETHER_ROOF + 1, z);
                    if above == ids::RED_MUSHROOM || above == ids::BROWN_MUSHROOM {
                        chunk.set_block(x, NETHER_ROOF + 1, z, BlockId::AIR);
                    }
                }

                for y in (0..NETHER_ROOF).rev() {
                    match chunk.block(x, y, z) {
                        ids::BEDROCK | ids::NETHERRACK => chunk.set_block(x, y, z, BlockId::AIR),
                        _ => break,
                    }
                }
            }
        }
        Ok(())
    }
}
