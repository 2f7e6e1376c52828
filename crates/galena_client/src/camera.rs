use glam::Vec3;

use galena_shared::physics::Ray;

use crate::input::{Buttons, InputState};

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl Camera {
    pub fn update_look(&mut self, input: &InputState, look_sensitivity: f32) {
        const MAX_PITCH: f32 = 89.0_f32.to_radians();

        self.yaw += input.mouse_delta.x * look_sensitivity;
        self.pitch -= input.mouse_delta.y * look_sensitivity;
        self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Input direction projected onto the horizontal plane, normalized.
    pub fn horizontal_movement_dir(&self, input: &InputState) -> Vec3 {
        let forward = Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin()).normalize_or_zero();
        let right = Vec3::new(-forward.z, 0.0, forward.x);

        let mut dir = Vec3::ZERO;
        if input.is_pressed(Buttons::FORWARD) {
            dir += forward;
        }
        if input.is_pressed(Buttons::BACK) {
            dir -= forward;
        }
        if input.is_pressed(Buttons::RIGHT) {
            dir += right;
        }
        if input.is_pressed(Buttons::LEFT) {
            dir -= right;
        }

        if dir.length_squared() > 0.0 {
            dir.normalize()
        } else {
            Vec3::ZERO
        }
    }

    pub fn forward_direction(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize_or_zero()
    }

    /// The crosshair ray used for block picking.
    pub fn view_ray(&self) -> Ray {
        Ray {
            origin: self.position,
            direction: self.forward_direction(),
        }
    }
}
