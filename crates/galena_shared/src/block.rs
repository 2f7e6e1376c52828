use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Pod,
    Zeroable,
)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const AIR: Self = Self(0);
    pub const GRASS: Self = Self(1);
    pub const DIRT: Self = Self(2);
    pub const STONE: Self = Self(3);
    pub const WOOD: Self = Self(4);
    pub const SAND: Self = Self(5);
    pub const BRICK: Self = Self(6);
}

/// What the renderer needs to draw one block type: a display name plus the
/// base/accent colors its procedural texture is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockAppearance {
    pub name: String,
    pub base_color: [u8; 3],
    pub accent_color: [u8; 3],
}

#[derive(Default, Debug, Clone)]
pub struct BlockRegistry {
    appearances: Vec<BlockAppearance>,
    by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self {
            appearances: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn register(&mut self, appearance: BlockAppearance) -> BlockId {
        if let Some(existing) = self.by_name.get(appearance.name.as_str()) {
            return *existing;
        }

        let next_index = self.appearances.len();
        let id = BlockId(
            u16::try_from(next_index).expect("block registry exceeded BlockId capacity (u16::MAX)"),
        );

        self.by_name.insert(appearance.name.clone(), id);
        self.appearances.push(appearance);
        id
    }

    pub fn appearance(&self, id: BlockId) -> &BlockAppearance {
        self.appearances
            .get(id.0 as usize)
            .or_else(|| self.appearances.get(BlockId::AIR.0 as usize))
            .expect("block registry is empty; call register_default_blocks() first")
    }

    pub fn get_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, id: BlockId) -> bool {
        usize::from(id.0) < self.appearances.len()
    }

    pub fn len(&self) -> usize {
        self.appearances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appearances.is_empty()
    }
}

pub fn register_default_blocks() -> BlockRegistry {
    fn block(name: &str, base_color: [u8; 3], accent_color: [u8; 3]) -> BlockAppearance {
        BlockAppearance {
            name: name.to_string(),
            base_color,
            accent_color,
        }
    }

    let mut registry = BlockRegistry::new();

    let defaults = [
        block("air", [0x00, 0x00, 0x00], [0x00, 0x00, 0x00]),
        block("grass", [0x62, 0xb2, 0x4a], [0x4f, 0x8a, 0x35]),
        block("dirt", [0x8e, 0x5d, 0x34], [0x75, 0x48, 0x29]),
        block("stone", [0x8a, 0x8a, 0x8a], [0x6f, 0x6f, 0x6f]),
        block("wood", [0x9b, 0x6f, 0x3e], [0x7f, 0x52, 0x26]),
        block("sand", [0xf0, 0xe2, 0x9a], [0xe1, 0xd5, 0x7a]),
        block("brick", [0xcc, 0x4b, 0x3a], [0xaa, 0x3e, 0x32]),
    ];

    for appearance in defaults {
        registry.register(appearance);
    }

    registry
}
