use std::ops::{Add, AddAssign, Sub, SubAssign};

use glam::IVec3;
use serde::{Deserialize, Serialize};

pub const CHUNK_SIZE: usize = 16;

/// Horizontal coordinate of a full-height chunk column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

/// Position of a block inside a chunk: local x/z, world-absolute y.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: u8,
    pub y: i32,
    pub z: u8,
}

impl Add for ChunkPos {
    type Output = ChunkPos;

    fn add(self, rhs: Self) -> Self::Output {
        ChunkPos {
            x: self.x + rhs.x,
            z: self.z + rhs.z,
        }
    }
}

impl AddAssign for ChunkPos {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.z += rhs.z;
    }
}

impl Sub for ChunkPos {
    type Output = ChunkPos;

    fn sub(self, rhs: Self) -> Self::Output {
        ChunkPos {
            x: self.x - rhs.x,
            z: self.z - rhs.z,
        }
    }
}

impl SubAssign for ChunkPos {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.z -= rhs.z;
    }
}

fn div_rem_floor(value: i32, divisor: i32) -> (i32, i32) {
    let mut q = value / divisor;
    let mut r = value % divisor;
    if r < 0 {
        q -= 1;
        r += divisor;
    }
    (q, r)
}

pub fn world_to_chunk(world_pos: IVec3) -> (ChunkPos, LocalPos) {
    let size = CHUNK_SIZE as i32;

    let (chunk_x, local_x) = div_rem_floor(world_pos.x, size);
    let (chunk_z, local_z) = div_rem_floor(world_pos.z, size);

    (
        ChunkPos {
            x: chunk_x,
            z: chunk_z,
        },
        LocalPos {
            x: local_x as u8,
            y: world_pos.y,
            z: local_z as u8,
        },
    )
}

pub fn chunk_to_world(chunk_pos: ChunkPos, local: LocalPos) -> IVec3 {
    let size = CHUNK_SIZE as i32;
    IVec3::new(
        chunk_pos.x * size + i32::from(local.x),
        local.y,
        chunk_pos.z * size + i32::from(local.z),
    )
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::{chunk_to_world, world_to_chunk, ChunkPos, LocalPos, CHUNK_SIZE};

    #[test]
    fn chunk_pos_arithmetic_is_component_wise() {
        let a = ChunkPos { x: 10, z: 4 };
        let b = ChunkPos { x: -3, z: 1 };

        assert_eq!(a + b, ChunkPos { x: 7, z: 5 });
        assert_eq!(a - b, ChunkPos { x: 13, z: 3 });

        let mut c = a;
        c += b;
        assert_eq!(c, ChunkPos { x: 7, z: 5 });
        c -= b;
        assert_eq!(c, a);
    }

    #[test]
    fn world_to_chunk_handles_negative_and_positive_coordinates() {
        let (chunk0, local0) = world_to_chunk(IVec3::new(-1, -7, -1));
        assert_eq!(chunk0, ChunkPos { x: -1, z: -1 });
        assert_eq!(
            local0,
            LocalPos {
                x: (CHUNK_SIZE - 1) as u8,
                y: -7,
                z: (CHUNK_SIZE - 1) as u8,
            }
        );

        let (chunk1, local1) = world_to_chunk(IVec3::new(16, 64, 0));
        assert_eq!(chunk1, ChunkPos { x: 1, z: 0 });
        assert_eq!(local1, LocalPos { x: 0, y: 64, z: 0 });
    }

    #[test]
    fn chunk_to_world_inverts_world_to_chunk() {
        for world in [
            IVec3::new(-33, 95, 66),
            IVec3::new(0, 0, 0),
            IVec3::new(15, -4, 16),
            IVec3::new(-16, 3, -17),
        ] {
            let (chunk, local) = world_to_chunk(world);
            assert_eq!(chunk_to_world(chunk, local), world);
        }
    }

    #[test]
    fn every_block_maps_to_exactly_one_chunk_column() {
        let size = CHUNK_SIZE as i32;
        for y in [-5, 0, 200] {
            let (chunk, local) = world_to_chunk(IVec3::new(size - 1, y, size));
            assert_eq!(chunk, ChunkPos { x: 0, z: 1 });
            assert_eq!(i32::from(local.x), size - 1);
            assert_eq!(local.y, y);
            assert_eq!(local.z, 0);
        }
    }
}
