use glam::IVec3;
use rustc_hash::{FxHashMap, FxHashSet};

use galena_shared::block::BlockId;
use galena_shared::coords::{world_to_chunk, ChunkPos, LocalPos, CHUNK_SIZE};
use galena_shared::protocol::BlockRecord;

use crate::chunk::Chunk;

/// The local world: a sparse map from block coordinate to non-air type, plus
/// the chunk columns derived from it. The sparse map is the single source of
/// truth for occupancy; chunks exist to batch mesh rebuilds.
#[derive(Debug, Default)]
pub struct ClientWorld {
    blocks: FxHashMap<IVec3, BlockId>,
    chunks: FxHashMap<ChunkPos, Chunk>,
    dirty: FxHashSet<ChunkPos>,
}

impl ClientWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_block(&self, pos: IVec3) -> BlockId {
        self.blocks.get(&pos).copied().unwrap_or(BlockId::AIR)
    }

    /// Writes one block and synchronously rebuilds every affected chunk mesh
    /// before returning. Air deletes the entry, so the map size stays
    /// proportional to the solid-block count.
    pub fn set_block(&mut self, pos: IVec3, block: BlockId) {
        if block == BlockId::AIR {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }

        let (chunk_pos, local) = world_to_chunk(pos);
        self.chunks
            .entry(chunk_pos)
            .or_insert_with(|| Chunk::new(chunk_pos))
            .set(local, block);

        for touched in chunks_touching(chunk_pos, local) {
            self.rebuild_chunk(touched);
        }
    }

    pub fn blocks(&self) -> &FxHashMap<IVec3, BlockId> {
        &self.blocks
    }

    pub fn solid_block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Drains the set of chunks whose meshes changed since the last call, so
    /// the embedding loop can re-upload them to the renderer.
    pub fn take_dirty(&mut self) -> Vec<ChunkPos> {
        self.dirty.drain().collect()
    }

    /// Empties the world. Chunk columns are kept (cleared, never pruned) so
    /// their meshes go empty rather than dangling.
    pub fn clear(&mut self) {
        self.blocks.clear();
        for (pos, chunk) in &mut self.chunks {
            chunk.clear();
            self.dirty.insert(*pos);
        }
    }

    /// Replaces the entire world with a snapshot. This is a full state
    /// replacement, not a merge: blocks absent from the snapshot disappear.
    /// Each surviving chunk is rebuilt once at the end.
    pub fn apply_snapshot(&mut self, records: &[BlockRecord]) {
        self.clear();

        for record in records {
            if record.block == BlockId::AIR {
                continue;
            }
            let pos = record.pos();
            self.blocks.insert(pos, record.block);
            let (chunk_pos, local) = world_to_chunk(pos);
            self.chunks
                .entry(chunk_pos)
                .or_insert_with(|| Chunk::new(chunk_pos))
                .set(local, record.block);
        }

        let positions: Vec<ChunkPos> = self.chunks.keys().copied().collect();
        for pos in positions {
            self.rebuild_chunk(pos);
        }
    }

    /// All non-empty voxels, sorted by coordinate for deterministic output.
    pub fn snapshot(&self) -> Vec<BlockRecord> {
        let mut records: Vec<BlockRecord> = self
            .blocks
            .iter()
            .map(|(pos, block)| BlockRecord::new(*pos, *block))
            .collect();
        records.sort_by_key(|record| (record.x, record.y, record.z));
        records
    }

    fn rebuild_chunk(&mut self, pos: ChunkPos) {
        if let Some(chunk) = self.chunks.get_mut(&pos) {
            chunk.rebuild(&self.blocks);
            self.dirty.insert(pos);
        }
    }
}

/// The edited chunk, plus any adjacent chunk sharing the edited column's
/// border. A border edit changes which faces the neighbor must show, so the
/// neighbor is rebuilt too (it is not created if it does not exist yet).
fn chunks_touching(chunk_pos: ChunkPos, local: LocalPos) -> Vec<ChunkPos> {
    let edge = (CHUNK_SIZE - 1) as u8;
    let mut touched = vec![chunk_pos];

    if local.x == 0 {
        touched.push(chunk_pos + ChunkPos { x: -1, z: 0 });
    }
    if local.x == edge {
        touched.push(chunk_pos + ChunkPos { x: 1, z: 0 });
    }
    if local.z == 0 {
        touched.push(chunk_pos + ChunkPos { x: 0, z: -1 });
    }
    if local.z == edge {
        touched.push(chunk_pos + ChunkPos { x: 0, z: 1 });
    }

    touched
}
