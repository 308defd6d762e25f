use glam::{Mat4, Vec4};

use crate::scene::bounds::Aabb;

/// How a bounding volume sits relative to a frustum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Outside,
    Crossing,
    Inside,
}

/// View frustum as six inward-facing planes extracted from a view-projection
/// matrix (Gribb–Hartmann). Plane xyz is the normal, w the distance term; a
/// point p is inside a plane when dot(n, p) + w >= 0.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    pub fn from_view_proj(view_proj: Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        let planes = [
            normalize_plane(r3 + r0), // left
            normalize_plane(r3 - r0), // right
            normalize_plane(r3 + r1), // bottom
            normalize_plane(r3 - r1), // top
            normalize_plane(r2),      // near (wgpu clip z in [0, 1])
            normalize_plane(r3 - r2), // far
        ];

        Self { planes }
    }

    /// Classify a world-space box against all six planes.
    pub fn classify(&self, aabb: &Aabb) -> Relation {
        let mut relation = Relation::Inside;

        for plane in &self.planes {
            let normal = plane.truncate();
            let distance = normal.dot(aabb.center) + plane.w;
            let radius = normal.abs().dot(aabb.half_extents);

            if distance < -radius {
                return Relation::Outside;
            }
            if distance < radius {
                relation = Relation::Crossing;
            }
        }

        relation
    }

    /// True when any part of the box may be visible. Boxes straddling a plane
    /// count as visible.
    pub fn intersects(&self, aabb: &Aabb) -> bool {
        self.classify(aabb) != Relation::Outside
    }
}

fn normalize_plane(plane: Vec4) -> Vec4 {
    let length = plane.truncate().length();
    if length > 0.0 {
        plane / length
    } else {
        plane
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn looking_down_neg_z() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let proj = Mat4::perspective_rh(90f32.to_radians(), 1.0, 0.1, 100.0);
        Frustum::from_view_proj(proj * view)
    }

    #[test]
    fn box_in_front_is_inside() {
        let frustum = looking_down_neg_z();
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE);
        assert_eq!(frustum.classify(&aabb), Relation::Inside);
        assert!(frustum.intersects(&aabb));
    }

    #[test]
    fn box_behind_camera_is_outside() {
        let frustum = looking_down_neg_z();
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ONE);
        assert_eq!(frustum.classify(&aabb), Relation::Outside);
        assert!(!frustum.intersects(&aabb));
    }

    #[test]
    fn box_far_to_the_side_is_outside() {
        let frustum = looking_down_neg_z();
        // 90° fov: at z = -10 the frustum is ~10 units wide per side.
        let aabb = Aabb::new(Vec3::new(50.0, 0.0, -10.0), Vec3::ONE);
        assert_eq!(frustum.classify(&aabb), Relation::Outside);
    }

    #[test]
    fn box_straddling_a_plane_is_crossing_and_visible() {
        let frustum = looking_down_neg_z();
        let aabb = Aabb::new(Vec3::new(10.0, 0.0, -10.0), Vec3::splat(2.0));
        assert_eq!(frustum.classify(&aabb), Relation::Crossing);
        assert!(frustum.intersects(&aabb));
    }

    #[test]
    fn box_past_far_plane_is_outside() {
        let frustum = looking_down_neg_z();
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, -200.0), Vec3::ONE);
        assert_eq!(frustum.classify(&aabb), Relation::Outside);
    }

    #[test]
    fn huge_box_enclosing_frustum_is_crossing() {
        let frustum = looking_down_neg_z();
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(1000.0));
        assert_eq!(frustum.classify(&aabb), Relation::Crossing);
        assert!(frustum.intersects(&aabb));
    }
}
