//! View-frustum plane extraction and containment tests

use glam::{Mat4, Vec3, Vec4};

/// The six clip planes of a view-projection matrix.
///
/// Planes are extracted for a `[0, 1]` clip-space depth range (the wgpu/glam
/// `perspective_rh` convention) and point inwards: a point is inside when its
/// signed distance to every plane is non-negative.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    pub fn from_view_proj(view_proj: &Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        Self {
            planes: [
                r3 + r0, // left
                r3 - r0, // right
                r3 + r1, // bottom
                r3 - r1, // top
                r2,      // near
                r3 - r2, // far
            ],
        }
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        let p4 = p.extend(1.0);
        self.planes.iter().all(|plane| plane.dot(p4) >= 0.0)
    }

    /// Conservative box test: false only when the box lies entirely outside
    /// one of the planes.
    pub fn intersects_aabb(&self, min: Vec3, max: Vec3) -> bool {
        self.planes.iter().all(|plane| {
            let positive = Vec3::new(
                if plane.x >= 0.0 { max.x } else { min.x },
                if plane.y >= 0.0 { max.y } else { min.y },
                if plane.z >= 0.0 { max.z } else { min.z },
            );
            plane.dot(positive.extend(1.0)) >= 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down_negative_z() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        let proj = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0);
        Frustum::from_view_proj(&(proj * view))
    }

    #[test]
    fn point_in_front_is_inside() {
        let f = looking_down_negative_z();
        assert!(f.contains_point(Vec3::new(0.0, 0.0, -10.0)));
        assert!(f.contains_point(Vec3::new(2.0, -2.0, -10.0)));
    }

    #[test]
    fn all_six_planes_reject() {
        let f = looking_down_negative_z();
        // behind the camera
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 10.0)));
        // past the far plane
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -200.0)));
        // closer than the near plane
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -0.01)));
        // outside left / right
        assert!(!f.contains_point(Vec3::new(-100.0, 0.0, -10.0)));
        assert!(!f.contains_point(Vec3::new(100.0, 0.0, -10.0)));
        // outside top / bottom
        assert!(!f.contains_point(Vec3::new(0.0, 100.0, -10.0)));
        assert!(!f.contains_point(Vec3::new(0.0, -100.0, -10.0)));
    }

    #[test]
    fn aabb_straddling_a_plane_intersects() {
        let f = looking_down_negative_z();
        assert!(f.intersects_aabb(Vec3::new(-50.0, -1.0, -11.0), Vec3::new(0.0, 1.0, -9.0)));
        assert!(!f.intersects_aabb(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 8.0)));
    }
}
