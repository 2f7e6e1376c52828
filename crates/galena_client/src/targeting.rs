use glam::IVec3;

use galena_shared::block::BlockId;
use galena_shared::physics::{ray_voxel_intersection, Face, Ray};

use crate::world::ClientWorld;

pub const TARGET_HORIZONTAL_RADIUS: i32 = 10;
pub const TARGET_WINDOW_BELOW: i32 = 3;
pub const TARGET_WINDOW_ABOVE: i32 = 6;

/// The block under the crosshair and the face the view ray entered it
/// through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTarget {
    pub block_pos: IVec3,
    pub face: Face,
}

impl BlockTarget {
    /// Where a new block goes when placing against the targeted face.
    pub fn placement_pos(&self) -> IVec3 {
        self.block_pos + self.face.normal_ivec3()
    }
}

/// Finds the nearest occupied voxel the ray hits, testing each candidate's
/// unit cube analytically. The search is bounded to a fixed window around
/// the camera's voxel column; blocks outside it are simply untargetable,
/// which keeps the scan cheap at the cost of a hard reach limit.
pub fn pick_block(ray: &Ray, world: &ClientWorld) -> Option<BlockTarget> {
    let center = ray.origin.floor().as_ivec3();
    let mut nearest: Option<(f32, BlockTarget)> = None;

    for dy in -TARGET_WINDOW_BELOW..=TARGET_WINDOW_ABOVE {
        for dz in -TARGET_HORIZONTAL_RADIUS..=TARGET_HORIZONTAL_RADIUS {
            for dx in -TARGET_HORIZONTAL_RADIUS..=TARGET_HORIZONTAL_RADIUS {
                let voxel = center + IVec3::new(dx, dy, dz);
                if world.get_block(voxel) == BlockId::AIR {
                    continue;
                }
                let Some((distance, face)) = ray_voxel_intersection(ray, voxel) else {
                    continue;
                };
                if nearest.is_none_or(|(best, _)| distance < best) {
                    nearest = Some((
                        distance,
                        BlockTarget {
                            block_pos: voxel,
                            face,
                        },
                    ));
                }
            }
        }
    }

    nearest.map(|(_, target)| target)
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use galena_shared::block::BlockId;
    use galena_shared::physics::{Face, Ray};

    use crate::world::ClientWorld;

    use super::{pick_block, TARGET_HORIZONTAL_RADIUS};

    #[test]
    fn single_voxel_straight_ahead_reports_coordinate_and_entry_face() {
        let mut world = ClientWorld::new();
        world.set_block(IVec3::ZERO, BlockId::STONE);

        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let target = pick_block(&ray, &world).expect("target expected");

        assert_eq!(target.block_pos, IVec3::new(0, 0, 0));
        assert_eq!(target.face, Face::PosZ);
        assert_eq!(target.face.normal_ivec3(), IVec3::new(0, 0, 1));
        assert_eq!(target.placement_pos(), IVec3::new(0, 0, 1));
    }

    #[test]
    fn no_occupied_voxel_in_range_means_no_target() {
        let world = ClientWorld::new();
        let ray = Ray {
            origin: Vec3::new(0.5, 0.5, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        assert_eq!(pick_block(&ray, &world), None);
    }

    #[test]
    fn nearest_of_several_hits_wins() {
        let mut world = ClientWorld::new();
        world.set_block(IVec3::new(0, 0, 0), BlockId::STONE);
        world.set_block(IVec3::new(0, 0, -3), BlockId::BRICK);

        let ray = Ray {
            origin: Vec3::new(0.5, 0.5, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let target = pick_block(&ray, &world).expect("target expected");
        assert_eq!(target.block_pos, IVec3::new(0, 0, 0));
    }

    #[test]
    fn blocks_outside_the_window_are_untargetable() {
        let mut world = ClientWorld::new();
        let far = IVec3::new(TARGET_HORIZONTAL_RADIUS + 2, 0, 0);
        world.set_block(far, BlockId::STONE);

        let ray = Ray {
            origin: Vec3::new(0.5, 0.5, 0.5),
            direction: Vec3::X,
        };
        assert_eq!(pick_block(&ray, &world), None);
    }
}
