use glam::IVec3;
use rustc_hash::FxHashMap;

use galena_shared::block::BlockId;
use galena_shared::protocol::BlockRecord;

/// The relay's working copy of the world, built purely from the block edits
/// that pass through it. It exists so late joiners receive a current
/// snapshot; it is never persisted and never authoritative over clients.
#[derive(Debug, Default)]
pub struct RelayWorld {
    blocks: FxHashMap<IVec3, BlockId>,
}

impl RelayWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, pos: IVec3, block: BlockId) {
        if block == BlockId::AIR {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
    }

    pub fn solid_block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn snapshot(&self) -> Vec<BlockRecord> {
        let mut records: Vec<BlockRecord> = self
            .blocks
            .iter()
            .map(|(pos, block)| BlockRecord::new(*pos, *block))
            .collect();
        records.sort_by_key(|record| (record.x, record.y, record.z));
        records
    }
}
