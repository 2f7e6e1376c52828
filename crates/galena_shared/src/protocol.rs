use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::block::BlockId;

/// One non-empty voxel in a world snapshot. The same record sequence is the
/// `welcome` payload, the save-file format, and the export/import format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(rename = "type")]
    pub block: BlockId,
}

impl BlockRecord {
    pub fn new(pos: IVec3, block: BlockId) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            block,
        }
    }

    pub fn pos(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PlayerPos {
    pub fn from_vec3(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Pitch (`x`) and yaw (`y`) of a player's view, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerRot {
    pub x: f32,
    pub y: f32,
}

/// Wire messages, one JSON object per line, discriminated by the `type`
/// field. Tags the peer does not recognize must not kill the channel, so
/// unknown tags decode to [`Message::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Join,
    Welcome {
        id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        world: Option<Vec<BlockRecord>>,
    },
    PlayerUpdate {
        id: u64,
        pos: PlayerPos,
        rot: PlayerRot,
    },
    PlayerState {
        id: u64,
        pos: PlayerPos,
    },
    BlockChange {
        x: i32,
        y: i32,
        z: i32,
        block: BlockId,
    },
    PlayerDisconnect {
        id: u64,
    },
    #[serde(other)]
    Unknown,
}

impl Message {
    pub fn block_change(pos: IVec3, block: BlockId) -> Self {
        Message::BlockChange {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            block,
        }
    }
}

pub fn encode(msg: &Message) -> String {
    serde_json::to_string(msg).expect("failed to encode protocol message")
}

pub fn decode(line: &str) -> Result<Message, serde_json::Error> {
    serde_json::from_str(line)
}
