use glam::IVec3;
use rustc_hash::FxHashMap;

use galena_shared::block::BlockId;
use galena_shared::coords::{chunk_to_world, ChunkPos, LocalPos};
use galena_shared::physics::Face;

use crate::mesh::{ChunkMesh, FaceInstance};

/// A full-height column of voxels plus its derived render mesh. The grid is
/// sparse: absent entries are air, and setting air deletes the entry.
#[derive(Debug, Default)]
pub struct Chunk {
    pos: ChunkPos,
    grid: FxHashMap<LocalPos, BlockId>,
    mesh: ChunkMesh,
}

impl Chunk {
    pub fn new(pos: ChunkPos) -> Self {
        Self {
            pos,
            grid: FxHashMap::default(),
            mesh: ChunkMesh::default(),
        }
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub fn get(&self, local: LocalPos) -> BlockId {
        self.grid.get(&local).copied().unwrap_or(BlockId::AIR)
    }

    pub fn set(&mut self, local: LocalPos, block: BlockId) {
        if block == BlockId::AIR {
            self.grid.remove(&local);
        } else {
            self.grid.insert(local, block);
        }
    }

    pub fn block_count(&self) -> usize {
        self.grid.len()
    }

    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.mesh.clear();
    }

    /// Rebuilds the mesh from the current grid. A face is emitted only when
    /// its neighbor in the global world map is air; neighbors are looked up
    /// globally so faces on chunk borders cull against adjacent chunks.
    pub fn rebuild(&mut self, blocks: &FxHashMap<IVec3, BlockId>) {
        let mut mesh = ChunkMesh::default();

        for (local, block) in &self.grid {
            let world_pos = chunk_to_world(self.pos, *local);
            for face in Face::ALL {
                let neighbor = world_pos + face.normal_ivec3();
                if !blocks.contains_key(&neighbor) {
                    mesh.push(*block, FaceInstance::new(world_pos, face));
                }
            }
        }

        self.mesh = mesh;
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;
    use rustc_hash::FxHashMap;

    use galena_shared::block::BlockId;
    use galena_shared::coords::{world_to_chunk, ChunkPos, LocalPos};
    use galena_shared::physics::Face;

    use super::Chunk;

    #[test]
    fn grid_get_set_deletes_on_air() {
        let mut chunk = Chunk::new(ChunkPos { x: 0, z: 0 });
        let local = LocalPos { x: 3, y: 7, z: 11 };

        assert_eq!(chunk.get(local), BlockId::AIR);
        chunk.set(local, BlockId::WOOD);
        assert_eq!(chunk.get(local), BlockId::WOOD);
        assert_eq!(chunk.block_count(), 1);

        chunk.set(local, BlockId::AIR);
        assert_eq!(chunk.get(local), BlockId::AIR);
        assert_eq!(chunk.block_count(), 0);
    }

    #[test]
    fn rebuild_emits_six_faces_for_an_isolated_voxel() {
        let mut blocks = FxHashMap::default();
        let world_pos = IVec3::new(4, 2, 4);
        blocks.insert(world_pos, BlockId::STONE);

        let (chunk_pos, local) = world_to_chunk(world_pos);
        let mut chunk = Chunk::new(chunk_pos);
        chunk.set(local, BlockId::STONE);
        chunk.rebuild(&blocks);

        assert_eq!(chunk.mesh().face_count(), 6);
        for face in Face::ALL {
            assert!(chunk.mesh().has_face(world_pos, face));
        }
    }

    #[test]
    fn rebuild_culls_faces_between_touching_voxels() {
        let mut blocks = FxHashMap::default();
        let a = IVec3::new(0, 0, 0);
        let b = IVec3::new(1, 0, 0);
        blocks.insert(a, BlockId::DIRT);
        blocks.insert(b, BlockId::DIRT);

        let (chunk_pos, _) = world_to_chunk(a);
        let mut chunk = Chunk::new(chunk_pos);
        for pos in [a, b] {
            let (_, local) = world_to_chunk(pos);
            chunk.set(local, BlockId::DIRT);
        }
        chunk.rebuild(&blocks);

        // 5 visible faces each; the shared interior pair is culled.
        assert_eq!(chunk.mesh().face_count(), 10);
        assert!(!chunk.mesh().has_face(a, Face::PosX));
        assert!(!chunk.mesh().has_face(b, Face::NegX));
        assert!(chunk.mesh().has_face(a, Face::NegX));
        assert!(chunk.mesh().has_face(b, Face::PosX));
    }

    #[test]
    fn rebuild_culls_against_neighbors_in_other_chunks() {
        let mut blocks = FxHashMap::default();
        let inside = IVec3::new(15, 0, 3);
        let outside = IVec3::new(16, 0, 3);
        blocks.insert(inside, BlockId::BRICK);
        blocks.insert(outside, BlockId::BRICK);

        let (chunk_pos, local) = world_to_chunk(inside);
        let mut chunk = Chunk::new(chunk_pos);
        chunk.set(local, BlockId::BRICK);
        chunk.rebuild(&blocks);

        assert!(!chunk.mesh().has_face(inside, Face::PosX));
        assert_eq!(chunk.mesh().face_count(), 5);
    }
}
