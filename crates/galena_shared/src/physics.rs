use glam::{IVec3, Vec3};

#[derive(Debug, Copy, Clone)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn unit_cube(voxel: IVec3) -> Aabb {
        let min = voxel.as_vec3();
        Aabb {
            min,
            max: min + Vec3::ONE,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    pub fn normal_ivec3(&self) -> IVec3 {
        match self {
            Face::PosX => IVec3::X,
            Face::NegX => IVec3::NEG_X,
            Face::PosY => IVec3::Y,
            Face::NegY => IVec3::NEG_Y,
            Face::PosZ => IVec3::Z,
            Face::NegZ => IVec3::NEG_Z,
        }
    }

    pub fn normal_vec3(&self) -> Vec3 {
        self.normal_ivec3().as_vec3()
    }
}

/// Slab-test a ray against an axis-aligned box, reporting the entry distance
/// along the ray and the face the ray entered through. Rays that start inside
/// the box (or only exit it behind the origin) do not hit.
pub fn ray_box_intersection(ray: &Ray, min: Vec3, max: Vec3) -> Option<(f32, Face)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut entry_face = Face::NegY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];

        if direction == 0.0 {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }

        let t0 = (min[axis] - origin) / direction;
        let t1 = (max[axis] - origin) / direction;
        let (t_near, t_far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };

        if t_near > t_enter {
            t_enter = t_near;
            entry_face = match (axis, direction > 0.0) {
                (0, true) => Face::NegX,
                (0, false) => Face::PosX,
                (1, true) => Face::NegY,
                (1, false) => Face::PosY,
                (2, true) => Face::NegZ,
                (2, false) => Face::PosZ,
                _ => unreachable!(),
            };
        }
        t_exit = t_exit.min(t_far);
    }

    if t_enter > t_exit || t_enter < 0.0 {
        return None;
    }

    Some((t_enter, entry_face))
}

/// Ray hit test against the unit cube of a single voxel coordinate.
pub fn ray_voxel_intersection(ray: &Ray, voxel: IVec3) -> Option<(f32, Face)> {
    let min = voxel.as_vec3();
    ray_box_intersection(ray, min, min + Vec3::ONE)
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use super::{ray_voxel_intersection, Aabb, Face, Ray};

    #[test]
    fn aabb_collision_detection() {
        let a = Aabb {
            min: Vec3::new(0.0, 0.0, 0.0),
            max: Vec3::new(1.0, 1.0, 1.0),
        };
        let b = Aabb {
            min: Vec3::new(0.5, 0.25, 0.5),
            max: Vec3::new(1.5, 1.25, 1.5),
        };
        let c = Aabb {
            min: Vec3::new(1.0, 1.0, 1.0),
            max: Vec3::new(2.0, 2.0, 2.0),
        };

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn ray_hits_the_entered_face_of_a_voxel() {
        let ray = Ray {
            origin: Vec3::new(0.5, 0.5, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let (distance, face) = ray_voxel_intersection(&ray, IVec3::ZERO).expect("hit expected");
        assert!((distance - 4.0).abs() < 1e-6);
        assert_eq!(face, Face::PosZ);
        assert_eq!(face.normal_ivec3(), IVec3::new(0, 0, 1));

        let ray = Ray {
            origin: Vec3::new(-2.0, 0.5, 0.5),
            direction: Vec3::X,
        };
        let (distance, face) = ray_voxel_intersection(&ray, IVec3::ZERO).expect("hit expected");
        assert!((distance - 2.0).abs() < 1e-6);
        assert_eq!(face, Face::NegX);
    }

    #[test]
    fn rays_miss_voxels_off_axis_or_behind_the_origin() {
        let ray = Ray {
            origin: Vec3::new(0.5, 2.5, 0.5),
            direction: Vec3::Y,
        };
        assert_eq!(ray_voxel_intersection(&ray, IVec3::ZERO), None);

        let sideways = Ray {
            origin: Vec3::new(3.0, 0.5, 0.5),
            direction: Vec3::Z,
        };
        assert_eq!(ray_voxel_intersection(&sideways, IVec3::ZERO), None);
    }

    #[test]
    fn rays_starting_inside_a_voxel_do_not_hit_it() {
        let ray = Ray {
            origin: Vec3::new(0.5, 0.5, 0.5),
            direction: Vec3::X,
        };
        assert_eq!(ray_voxel_intersection(&ray, IVec3::ZERO), None);
    }
}
