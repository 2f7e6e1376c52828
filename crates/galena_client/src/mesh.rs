use bytemuck::{Pod, Zeroable};
use glam::IVec3;
use rustc_hash::FxHashMap;

use galena_shared::block::BlockId;
use galena_shared::physics::Face;

/// One visible voxel face, ready for an instance buffer: the voxel's min
/// corner plus the face's outward normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FaceInstance {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl FaceInstance {
    pub fn new(voxel: IVec3, face: Face) -> Self {
        Self {
            position: voxel.as_vec3().to_array(),
            normal: face.normal_vec3().to_array(),
        }
    }
}

/// Renderable payload of one chunk: visible faces grouped by block type, so
/// the renderer draws one instanced group per type per chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkMesh {
    groups: FxHashMap<BlockId, Vec<FaceInstance>>,
}

impl ChunkMesh {
    pub fn push(&mut self, block: BlockId, instance: FaceInstance) {
        self.groups.entry(block).or_default().push(instance);
    }

    pub fn group(&self, block: BlockId) -> &[FaceInstance] {
        self.groups.get(&block).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn groups(&self) -> impl Iterator<Item = (BlockId, &[FaceInstance])> {
        self.groups
            .iter()
            .map(|(block, instances)| (*block, instances.as_slice()))
    }

    pub fn face_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    pub fn has_face(&self, voxel: IVec3, face: Face) -> bool {
        let expected = FaceInstance::new(voxel, face);
        self.groups
            .values()
            .any(|instances| instances.contains(&expected))
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}
