use std::io;

use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use galena_shared::block::BlockId;
use galena_shared::protocol::{self, Message, PlayerPos, PlayerRot};

use crate::camera::Camera;
use crate::scene::{SceneView, VisualHandle};
use crate::world::ClientWorld;

/// Minimum wall-clock spacing between outgoing pose broadcasts. A rate cap,
/// not a clock: frames inside the window simply skip sending.
pub const POSE_SEND_INTERVAL: f32 = 0.05;

const REMOTE_LERP_FACTOR: f32 = 0.2;

/// Events surfaced by a transport, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    Message(String),
    Closed,
}

/// A connected ordered message channel. Sending is fire-and-forget; delivery
/// state comes back through [`ChannelEvent`]s on the next poll.
pub trait Transport {
    fn send(&mut self, line: &str);

    fn poll(&mut self) -> Vec<ChannelEvent>;
}

/// Opens transports from user-supplied addresses. A bad address fails here,
/// synchronously, before any channel exists.
pub trait Connector {
    fn connect(&mut self, address: &str) -> io::Result<Box<dyn Transport>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Joined,
}

/// Another client's last known state: where the server says they are, where
/// we currently draw them, and when we last heard about them.
#[derive(Debug)]
pub struct RemotePlayer {
    pub target_position: Vec3,
    pub rendered_position: Vec3,
    pub last_update: f32,
    visual: VisualHandle,
}

/// Client side of the sync protocol. Owns the channel, the connection state
/// machine and the remote-player table; world edits flow through
/// [`ClientWorld`] the same way whether they are local or relayed.
pub struct Session {
    state: ConnectionState,
    transport: Option<Box<dyn Transport>>,
    channel_open: bool,
    client_id: Option<u64>,
    remote_players: FxHashMap<u64, RemotePlayer>,
    clock: f32,
    last_pose_sent: f32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            transport: None,
            channel_open: false,
            client_id: None,
            remote_players: FxHashMap::default(),
            clock: 0.0,
            last_pose_sent: f32::NEG_INFINITY,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn client_id(&self) -> Option<u64> {
        self.client_id
    }

    pub fn is_channel_open(&self) -> bool {
        self.channel_open
    }

    pub fn remote_players(&self) -> impl Iterator<Item = (u64, &RemotePlayer)> {
        self.remote_players.iter().map(|(id, remote)| (*id, remote))
    }

    pub fn remote_player(&self, id: u64) -> Option<&RemotePlayer> {
        self.remote_players.get(&id)
    }

    /// Opens a channel to `address`. Any previous session is torn down
    /// first; a connect failure is returned to the caller and leaves the
    /// session cleanly disconnected.
    pub fn connect(
        &mut self,
        connector: &mut dyn Connector,
        address: &str,
        scene: &mut dyn SceneView,
    ) -> io::Result<()> {
        self.reset(scene);

        let transport = connector.connect(address)?;
        info!("connecting to {address}");
        self.transport = Some(transport);
        self.state = ConnectionState::Connecting;
        Ok(())
    }

    /// Tears the session down. Always safe: the world and chunk meshes are
    /// left untouched, only the identity and remote entities go away.
    pub fn disconnect(&mut self, scene: &mut dyn SceneView) {
        if self.transport.is_some() {
            info!("disconnecting");
        }
        self.reset(scene);
    }

    /// One simulation step: drain channel events, broadcast the local pose
    /// if the rate cap allows, and advance remote-player interpolation.
    pub fn step(
        &mut self,
        dt: f32,
        camera: &Camera,
        world: &mut ClientWorld,
        scene: &mut dyn SceneView,
    ) {
        self.clock += dt;

        let events = match self.transport.as_mut() {
            Some(transport) => transport.poll(),
            None => Vec::new(),
        };
        for event in events {
            self.handle_event(event, world, scene);
        }

        self.broadcast_pose(camera);
        self.advance_remote_players(scene);
    }

    /// Announces a block edit that has already been applied locally. With no
    /// open channel the edit stays local and the send is silently dropped.
    pub fn notify_block_edit(&mut self, pos: IVec3, block: BlockId) {
        self.send(&Message::block_change(pos, block));
    }

    fn handle_event(
        &mut self,
        event: ChannelEvent,
        world: &mut ClientWorld,
        scene: &mut dyn SceneView,
    ) {
        match event {
            ChannelEvent::Opened => {
                info!("channel open, requesting to join");
                self.channel_open = true;
                self.send(&Message::Join);
            }
            ChannelEvent::Message(line) => match protocol::decode(&line) {
                Ok(msg) => self.handle_message(msg, world, scene),
                Err(err) => warn!("dropping malformed message: {err}"),
            },
            ChannelEvent::Closed => {
                info!("channel closed");
                self.reset(scene);
            }
        }
    }

    fn handle_message(&mut self, msg: Message, world: &mut ClientWorld, scene: &mut dyn SceneView) {
        match msg {
            Message::Welcome { id, world: snapshot } => {
                info!("joined as client {id}");
                self.client_id = Some(id);
                self.state = ConnectionState::Joined;
                if let Some(records) = snapshot {
                    info!("applying world snapshot ({} blocks)", records.len());
                    world.apply_snapshot(&records);
                }
            }
            Message::BlockChange { x, y, z, block } => {
                // same path as a local edit; last writer wins
                world.set_block(IVec3::new(x, y, z), block);
            }
            Message::PlayerState { id, pos } => {
                if Some(id) == self.client_id {
                    return;
                }
                let clock = self.clock;
                let target = pos.to_vec3();
                let remote = self.remote_players.entry(id).or_insert_with(|| {
                    debug!("first sighting of player {id}");
                    RemotePlayer {
                        target_position: target,
                        rendered_position: target,
                        last_update: clock,
                        visual: scene.create_player_visual(id),
                    }
                });
                remote.target_position = target;
                remote.last_update = clock;
            }
            Message::PlayerDisconnect { id } => {
                if let Some(remote) = self.remote_players.remove(&id) {
                    info!("player {id} left");
                    scene.destroy_player_visual(remote.visual);
                }
            }
            other => {
                warn!("ignoring message not addressed to clients: {other:?}");
            }
        }
    }

    fn broadcast_pose(&mut self, camera: &Camera) {
        let Some(id) = self.client_id else {
            return;
        };
        if !self.channel_open || self.clock - self.last_pose_sent < POSE_SEND_INTERVAL {
            return;
        }
        self.last_pose_sent = self.clock;

        self.send(&Message::PlayerUpdate {
            id,
            pos: PlayerPos::from_vec3(camera.position),
            rot: PlayerRot {
                x: camera.pitch,
                y: camera.yaw,
            },
        });
    }

    fn advance_remote_players(&mut self, scene: &mut dyn SceneView) {
        for remote in self.remote_players.values_mut() {
            remote.rendered_position = remote
                .rendered_position
                .lerp(remote.target_position, REMOTE_LERP_FACTOR);
            scene.move_player_visual(remote.visual, remote.rendered_position);
        }
    }

    fn send(&mut self, msg: &Message) {
        if !self.channel_open {
            return;
        }
        if let Some(transport) = self.transport.as_mut() {
            transport.send(&protocol::encode(msg));
        }
    }

    fn reset(&mut self, scene: &mut dyn SceneView) {
        self.transport = None;
        self.channel_open = false;
        self.client_id = None;
        self.state = ConnectionState::Disconnected;
        for (_, remote) in self.remote_players.drain() {
            scene.destroy_player_visual(remote.visual);
        }
    }
}
