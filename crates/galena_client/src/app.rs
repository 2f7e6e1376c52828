use std::io;
use std::path::Path;

use glam::{IVec3, Vec3};
use tracing::info;

use galena_shared::block::{register_default_blocks, BlockId, BlockRegistry};

use crate::camera::Camera;
use crate::input::InputState;
use crate::persistence;
use crate::player::Player;
use crate::scene::SceneView;
use crate::session::{Connector, Session};
use crate::settings::ClientSettings;
use crate::targeting::{pick_block, BlockTarget};
use crate::terrain;
use crate::world::ClientWorld;

const LOOK_SENSITIVITY_SCALE: f32 = 0.002;
const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 6.0, 12.0);

/// The client core wired together: world, player, camera, input and network
/// session. The embedding shell owns the event loop and a [`SceneView`];
/// this struct owns the per-frame simulation step and every edit path.
pub struct ClientApp {
    pub settings: ClientSettings,
    pub registry: BlockRegistry,
    pub world: ClientWorld,
    pub player: Player,
    pub camera: Camera,
    pub input: InputState,
    pub session: Session,
    pub selected_block: BlockId,
}

impl ClientApp {
    pub fn new(settings: ClientSettings) -> Self {
        let mut world = ClientWorld::new();
        world.apply_snapshot(&terrain::generate_flat(
            terrain::DEFAULT_RADIUS,
            terrain::DEFAULT_SEED,
        ));

        let player = Player::new(SPAWN_POSITION);
        let camera = Camera {
            position: player.eye_position(),
            ..Camera::default()
        };

        Self {
            settings,
            registry: register_default_blocks(),
            world,
            player,
            camera,
            input: InputState::default(),
            session: Session::new(),
            selected_block: BlockId::GRASS,
        }
    }

    /// One variable-step simulation frame, driven by the external scheduler
    /// with the elapsed time since the previous frame.
    pub fn update(&mut self, dt: f32, scene: &mut dyn SceneView) {
        self.camera
            .update_look(&self.input, self.settings.mouse_sensitivity * LOOK_SENSITIVITY_SCALE);

        if self.input.consume_left_click() {
            self.break_targeted_block();
        }
        if self.input.consume_right_click() {
            self.place_at_target();
        }

        self.player.step(&self.camera, &self.input, &self.world, dt);
        self.camera.position = self.player.eye_position();

        self.session
            .step(dt, &self.camera, &mut self.world, scene);

        self.upload_dirty_chunks(scene);
        self.input.clear_frame();
    }

    pub fn target(&self) -> Option<BlockTarget> {
        pick_block(&self.camera.view_ray(), &self.world)
    }

    /// Removes the block under the crosshair, if any.
    pub fn break_targeted_block(&mut self) {
        if let Some(target) = self.target() {
            self.apply_local_edit(target.block_pos, BlockId::AIR);
        }
    }

    /// Places the selected block against the targeted face. Occupied
    /// destinations are left alone.
    pub fn place_at_target(&mut self) {
        let Some(target) = self.target() else {
            return;
        };
        let pos = target.placement_pos();
        if self.world.get_block(pos) == BlockId::AIR {
            let block = self.selected_block;
            self.apply_local_edit(pos, block);
        }
    }

    pub fn select_block(&mut self, block: BlockId) {
        if block != BlockId::AIR && self.registry.contains(block) {
            self.selected_block = block;
        }
    }

    pub fn connect(
        &mut self,
        connector: &mut dyn Connector,
        scene: &mut dyn SceneView,
    ) -> io::Result<()> {
        let address = self.settings.server_address.clone();
        self.session.connect(connector, &address, scene)
    }

    pub fn disconnect(&mut self, scene: &mut dyn SceneView) {
        self.session.disconnect(scene);
    }

    /// Saves the world; the save file doubles as the export format.
    pub fn save_world(&self, path: &Path) -> io::Result<()> {
        persistence::save_world(path, &self.world)?;
        info!("saved {} blocks to {}", self.world.solid_block_count(), path.display());
        Ok(())
    }

    /// Loads a snapshot file, replacing the current world wholesale.
    pub fn load_world(&mut self, path: &Path) -> io::Result<()> {
        let records = persistence::load_world(path)?;
        info!("loading {} blocks from {}", records.len(), path.display());
        self.world.apply_snapshot(&records);
        Ok(())
    }

    fn apply_local_edit(&mut self, pos: IVec3, block: BlockId) {
        // optimistic: the local world mutates first, the network hears after
        self.world.set_block(pos, block);
        self.session.notify_block_edit(pos, block);
    }

    fn upload_dirty_chunks(&mut self, scene: &mut dyn SceneView) {
        for pos in self.world.take_dirty() {
            if let Some(chunk) = self.world.chunk(pos) {
                scene.upload_chunk(pos, chunk.mesh(), &self.registry);
            }
        }
    }
}
