use noise::{NoiseFn, Perlin};

use galena_shared::block::BlockId;
use galena_shared::protocol::BlockRecord;

pub const DEFAULT_RADIUS: i32 = 24;
pub const DEFAULT_SEED: u32 = 0xB10C;

const DIRT_DEPTH: i32 = 3;
const FEATURE_THRESHOLD: f64 = 0.58;

/// Generates the starter world: a grass plane over dirt, with scattered
/// single feature blocks on top. Returned as snapshot records so the caller
/// applies it in one pass.
pub fn generate_flat(radius: i32, seed: u32) -> Vec<BlockRecord> {
    let feature_noise = Perlin::new(seed);
    let pick_noise = Perlin::new(seed.wrapping_add(1));

    let mut records = Vec::new();
    for x in -radius..radius {
        for z in -radius..radius {
            records.push(record(x, 0, z, BlockId::GRASS));
            for y in -DIRT_DEPTH..0 {
                records.push(record(x, y, z, BlockId::DIRT));
            }

            let sample = feature_noise.get([f64::from(x) * 0.37 + 11.3, f64::from(z) * 0.37 - 4.7]);
            if sample > FEATURE_THRESHOLD {
                let pick = pick_noise.get([f64::from(x) * 0.53, f64::from(z) * 0.53]);
                records.push(record(x, 1, z, feature_block(pick)));
            }
        }
    }
    records
}

fn record(x: i32, y: i32, z: i32, block: BlockId) -> BlockRecord {
    BlockRecord { x, y, z, block }
}

fn feature_block(pick: f64) -> BlockId {
    // map [-1, 1] onto the four decorative types
    let normalized = (pick + 1.0) / 2.0;
    match (normalized * 4.0) as usize {
        0 => BlockId::STONE,
        1 => BlockId::WOOD,
        2 => BlockId::SAND,
        _ => BlockId::BRICK,
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use galena_shared::block::BlockId;

    use crate::world::ClientWorld;

    use super::{generate_flat, DEFAULT_SEED};

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        assert_eq!(generate_flat(8, DEFAULT_SEED), generate_flat(8, DEFAULT_SEED));
    }

    #[test]
    fn terrain_has_a_grass_plane_over_dirt() {
        let mut world = ClientWorld::new();
        world.apply_snapshot(&generate_flat(4, DEFAULT_SEED));

        for x in -4..4 {
            for z in -4..4 {
                assert_eq!(world.get_block(IVec3::new(x, 0, z)), BlockId::GRASS);
                for y in -3..0 {
                    assert_eq!(world.get_block(IVec3::new(x, y, z)), BlockId::DIRT);
                }
            }
        }
        // nothing below the dirt shell
        assert_eq!(world.get_block(IVec3::new(0, -4, 0)), BlockId::AIR);
        // nothing outside the radius
        assert_eq!(world.get_block(IVec3::new(4, 0, 0)), BlockId::AIR);
    }

    #[test]
    fn features_only_appear_on_top_of_the_plane() {
        let records = generate_flat(16, DEFAULT_SEED);
        for record in &records {
            if record.y == 1 {
                assert!(matches!(
                    record.block,
                    BlockId::STONE | BlockId::WOOD | BlockId::SAND | BlockId::BRICK
                ));
            } else {
                assert!(record.y <= 0);
            }
        }
    }
}
