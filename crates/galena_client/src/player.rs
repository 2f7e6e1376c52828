use glam::{IVec3, Vec3};

use galena_shared::block::BlockId;
use galena_shared::physics::Aabb;

use crate::camera::Camera;
use crate::input::{Buttons, InputState};
use crate::world::ClientWorld;

pub const PLAYER_HALF_WIDTH: f32 = 0.3;
pub const PLAYER_HEIGHT: f32 = 1.8;
pub const EYE_HEIGHT: f32 = 1.6;

const WALK_SPEED: f32 = 6.0;
const HORIZONTAL_ACCEL: f32 = 10.0;
const GRAVITY: f32 = -20.0;
const JUMP_VELOCITY: f32 = 8.0;
const MAX_VERTICAL_SPEED: f32 = 50.0;
const COLLISION_EPSILON: f32 = 1e-4;

/// The locally simulated player. `position` is the feet-center reference
/// point of the collision box; the camera rides `EYE_HEIGHT` above it.
#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
}

impl Player {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            on_ground: false,
        }
    }

    /// Advances the player by one simulation step: blend horizontal velocity
    /// toward the input direction, integrate gravity/jump, then resolve the
    /// move one axis at a time in the order X, Z, Y. The order is load
    /// bearing: it decides which diagonal contacts slide and which stick.
    pub fn step(&mut self, camera: &Camera, input: &InputState, world: &ClientWorld, dt: f32) {
        let move_dir = camera.horizontal_movement_dir(input);
        let target_vx = move_dir.x * WALK_SPEED;
        let target_vz = move_dir.z * WALK_SPEED;

        let blend = (HORIZONTAL_ACCEL * dt).min(1.0);
        self.velocity.x += (target_vx - self.velocity.x) * blend;
        self.velocity.z += (target_vz - self.velocity.z) * blend;

        if self.on_ground && input.is_pressed(Buttons::JUMP) {
            self.velocity.y = JUMP_VELOCITY;
            self.on_ground = false;
        } else {
            self.velocity.y += GRAVITY * dt;
            self.velocity.y = self
                .velocity
                .y
                .clamp(-MAX_VERTICAL_SPEED, MAX_VERTICAL_SPEED);
        }

        // Resolve X axis
        self.position.x += self.velocity.x * dt;
        if collides_at(self.position, world) {
            if self.velocity.x > 0.0 {
                self.position.x = (self.position.x + PLAYER_HALF_WIDTH).floor() - PLAYER_HALF_WIDTH;
            } else {
                self.position.x = (self.position.x - PLAYER_HALF_WIDTH).ceil() + PLAYER_HALF_WIDTH;
            }
            self.velocity.x = 0.0;
        }

        // Resolve Z axis
        self.position.z += self.velocity.z * dt;
        if collides_at(self.position, world) {
            if self.velocity.z > 0.0 {
                self.position.z = (self.position.z + PLAYER_HALF_WIDTH).floor() - PLAYER_HALF_WIDTH;
            } else {
                self.position.z = (self.position.z - PLAYER_HALF_WIDTH).ceil() + PLAYER_HALF_WIDTH;
            }
            self.velocity.z = 0.0;
        }

        // Resolve Y axis
        self.position.y += self.velocity.y * dt;
        if collides_at(self.position, world) {
            if self.velocity.y < 0.0 {
                self.position.y = find_ground_snap(self.position, world);
                self.on_ground = true;
            } else {
                self.position.y = (self.position.y + PLAYER_HEIGHT).floor() - PLAYER_HEIGHT;
            }
            self.velocity.y = 0.0;
        } else {
            self.on_ground = false;
        }
    }

    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, EYE_HEIGHT, 0.0)
    }
}

pub fn player_aabb(pos: Vec3) -> Aabb {
    Aabb {
        min: pos - Vec3::new(PLAYER_HALF_WIDTH, 0.0, PLAYER_HALF_WIDTH),
        max: pos + Vec3::new(PLAYER_HALF_WIDTH, PLAYER_HEIGHT, PLAYER_HALF_WIDTH),
    }
}

/// Discrete overlap test of the player box against occupied voxels. Not a
/// swept test: a large enough velocity * dt can tunnel through a thin wall.
pub fn collides_at(pos: Vec3, world: &ClientWorld) -> bool {
    let player = player_aabb(pos);
    let min_x = player.min.x.floor() as i32;
    let max_x = (player.max.x - COLLISION_EPSILON).floor() as i32;
    let min_y = player.min.y.floor() as i32;
    let max_y = (player.max.y - COLLISION_EPSILON).floor() as i32;
    let min_z = player.min.z.floor() as i32;
    let max_z = (player.max.z - COLLISION_EPSILON).floor() as i32;

    for by in min_y..=max_y {
        for bz in min_z..=max_z {
            for bx in min_x..=max_x {
                let voxel = IVec3::new(bx, by, bz);
                if world.get_block(voxel) == BlockId::AIR {
                    continue;
                }
                if player.intersects(&Aabb::unit_cube(voxel)) {
                    return true;
                }
            }
        }
    }
    false
}

/// The y to land at after a blocked downward move: the highest top among the
/// occupied voxels the box overlaps, so the player rests exactly on the
/// floor surface.
fn find_ground_snap(pos: Vec3, world: &ClientWorld) -> f32 {
    let player = player_aabb(pos);
    let min_x = player.min.x.floor() as i32;
    let max_x = (player.max.x - COLLISION_EPSILON).floor() as i32;
    let min_y = player.min.y.floor() as i32;
    let max_y = (player.max.y - COLLISION_EPSILON).floor() as i32;
    let min_z = player.min.z.floor() as i32;
    let max_z = (player.max.z - COLLISION_EPSILON).floor() as i32;

    let mut highest_top = pos.y;
    for by in min_y..=max_y {
        for bz in min_z..=max_z {
            for bx in min_x..=max_x {
                let voxel = IVec3::new(bx, by, bz);
                if world.get_block(voxel) == BlockId::AIR {
                    continue;
                }
                if player.intersects(&Aabb::unit_cube(voxel)) {
                    highest_top = highest_top.max(by as f32 + 1.0);
                }
            }
        }
    }
    highest_top
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use galena_shared::block::BlockId;

    use crate::camera::Camera;
    use crate::input::{Buttons, InputState};
    use crate::world::ClientWorld;

    use super::{collides_at, Player};

    const DT: f32 = 1.0 / 60.0;

    fn flat_floor(radius: i32) -> ClientWorld {
        let mut world = ClientWorld::new();
        for x in -radius..=radius {
            for z in -radius..=radius {
                world.set_block(IVec3::new(x, 0, z), BlockId::GRASS);
            }
        }
        world
    }

    #[test]
    fn box_inside_solid_blocks_collides_and_empty_space_does_not() {
        let mut world = ClientWorld::new();
        for x in -1..=1 {
            for y in 0..=2 {
                for z in -1..=1 {
                    world.set_block(IVec3::new(x, y, z), BlockId::STONE);
                }
            }
        }
        assert!(collides_at(Vec3::new(0.5, 0.5, 0.5), &world));

        let empty = ClientWorld::new();
        assert!(!collides_at(Vec3::new(0.5, 0.5, 0.5), &empty));
    }

    #[test]
    fn falling_player_comes_to_rest_exactly_on_the_floor_top() {
        let world = flat_floor(4);
        let camera = Camera::default();
        let input = InputState::default();
        let mut player = Player::new(Vec3::new(0.0, 5.0, 0.0));

        for _ in 0..600 {
            player.step(&camera, &input, &world, DT);
        }

        assert_eq!(player.position.y, 1.0);
        assert!(player.on_ground);
        assert_eq!(player.velocity.y, 0.0);
    }

    #[test]
    fn walking_into_a_wall_zeroes_that_axis_and_slides_along_it() {
        let mut world = flat_floor(16);
        for y in 1..=3 {
            for z in -16..=16 {
                world.set_block(IVec3::new(3, y, z), BlockId::BRICK);
            }
        }

        // yaw 0 faces +x, so FORWARD pushes into the wall and RIGHT slides +z
        let camera = Camera::default();
        let mut input = InputState::default();
        input.press(Buttons::FORWARD);
        input.press(Buttons::RIGHT);

        let mut player = Player::new(Vec3::new(1.0, 1.0, 0.0));
        let start_z = player.position.z;
        for _ in 0..120 {
            player.step(&camera, &input, &world, DT);
        }

        assert_eq!(player.velocity.x, 0.0);
        assert!(player.velocity.z > 0.0);
        assert!(player.position.z > start_z);
        // flush against the wall face at x = 3
        assert!(player.position.x <= 3.0 - super::PLAYER_HALF_WIDTH + 1e-5);
    }

    #[test]
    fn grounded_jump_gives_an_upward_impulse() {
        let world = flat_floor(4);
        let camera = Camera::default();
        let mut player = Player::new(Vec3::new(0.0, 3.0, 0.0));

        let input = InputState::default();
        for _ in 0..300 {
            player.step(&camera, &input, &world, DT);
        }
        assert!(player.on_ground);

        let mut jump_input = InputState::default();
        jump_input.press(Buttons::JUMP);
        player.step(&camera, &jump_input, &world, DT);

        assert!(!player.on_ground);
        assert!(player.velocity.y > 0.0);
        assert!(player.position.y > 1.0);
    }

    #[test]
    fn jumping_under_a_ceiling_stops_the_upward_move() {
        let mut world = flat_floor(4);
        for x in -4..=4 {
            for z in -4..=4 {
                world.set_block(IVec3::new(x, 4, z), BlockId::STONE);
            }
        }

        let camera = Camera::default();
        let mut input = InputState::default();
        input.press(Buttons::JUMP);

        let mut player = Player::new(Vec3::new(0.0, 1.0, 0.0));
        player.on_ground = true;
        for _ in 0..30 {
            player.step(&camera, &input, &world, DT);
        }

        // box top capped below the ceiling at y = 4
        assert!(player.position.y + super::PLAYER_HEIGHT <= 4.0 + 1e-5);
    }
}
