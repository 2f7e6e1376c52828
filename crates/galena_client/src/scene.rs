use glam::Vec3;

use galena_shared::block::BlockRegistry;
use galena_shared::coords::ChunkPos;

use crate::mesh::ChunkMesh;

/// Opaque token for a rendering resource owned by the scene collaborator.
/// The core only stores and returns it; what it indexes is the renderer's
/// business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

/// What the core asks of the renderer: draw chunk meshes (instances grouped
/// per block type, appearances resolved through the registry) and manage
/// remote-player visuals keyed by opaque handles.
pub trait SceneView {
    fn upload_chunk(&mut self, pos: ChunkPos, mesh: &ChunkMesh, registry: &BlockRegistry);

    fn create_player_visual(&mut self, player_id: u64) -> VisualHandle;

    fn move_player_visual(&mut self, handle: VisualHandle, position: Vec3);

    fn destroy_player_visual(&mut self, handle: VisualHandle);
}

/// Scene that draws nothing. Used when running headless and as the default
/// while no renderer is attached; handles stay unique so create/destroy
/// pairing still holds.
#[derive(Debug, Default)]
pub struct NullScene {
    next_handle: u64,
}

impl SceneView for NullScene {
    fn upload_chunk(&mut self, _pos: ChunkPos, _mesh: &ChunkMesh, _registry: &BlockRegistry) {}

    fn create_player_visual(&mut self, _player_id: u64) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn move_player_visual(&mut self, _handle: VisualHandle, _position: Vec3) {}

    fn destroy_player_visual(&mut self, _handle: VisualHandle) {}
}
