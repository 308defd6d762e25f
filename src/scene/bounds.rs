use glam::{Mat4, Vec3};

/// Axis-aligned bounding box stored as center + half extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Aabb {
    pub const ZERO: Self = Self {
        center: Vec3::ZERO,
        half_extents: Vec3::ZERO,
    };

    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    /// Smallest box enclosing a point cloud. Returns `Aabb::ZERO` for an empty
    /// slice (an empty mesh culls as a point at the origin).
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::ZERO;
        };
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self::from_min_max(min, max)
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Conservative world-space box of this box under an affine transform.
    /// The half extents are run through the absolute value of the upper 3×3,
    /// which encloses the rotated box without enumerating its corners.
    pub fn transformed(&self, matrix: Mat4) -> Self {
        let center = matrix.transform_point3(self.center);

        let x = matrix.x_axis.truncate().abs();
        let y = matrix.y_axis.truncate().abs();
        let z = matrix.z_axis.truncate().abs();
        let half_extents =
            x * self.half_extents.x + y * self.half_extents.y + z * self.half_extents.z;

        Self {
            center,
            half_extents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn from_min_max_round_trips() {
        let b = Aabb::from_min_max(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, 6.0));
        assert!(b.center.abs_diff_eq(Vec3::new(1.0, 2.0, 4.0), 1e-6));
        assert!(b.min().abs_diff_eq(Vec3::new(-1.0, 0.0, 2.0), 1e-6));
        assert!(b.max().abs_diff_eq(Vec3::new(3.0, 4.0, 6.0), 1e-6));
    }

    #[test]
    fn from_points_encloses_all() {
        let b = Aabb::from_points(&[
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-2.0, 0.5, 3.0),
            Vec3::new(0.0, -1.0, 0.0),
        ]);
        assert!(b.min().abs_diff_eq(Vec3::new(-2.0, -1.0, 0.0), 1e-6));
        assert!(b.max().abs_diff_eq(Vec3::new(1.0, 1.0, 3.0), 1e-6));
    }

    #[test]
    fn empty_point_cloud_is_zero() {
        assert_eq!(Aabb::from_points(&[]), Aabb::ZERO);
    }

    #[test]
    fn translation_moves_center_only() {
        let b = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let t = b.transformed(Mat4::from_translation(Vec3::new(5.0, 0.0, -2.0)));
        assert!(t.center.abs_diff_eq(Vec3::new(5.0, 0.0, -2.0), 1e-6));
        assert!(t.half_extents.abs_diff_eq(Vec3::ONE, 1e-6));
    }

    #[test]
    fn rotation_grows_extents_conservatively() {
        let b = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let m = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4));
        let t = b.transformed(m);
        // A unit x-extent rotated 45° about y spans ~0.707 in both x and z.
        let expected = (std::f32::consts::FRAC_PI_4).cos();
        assert!((t.half_extents.x - expected).abs() < 1e-5);
        assert!((t.half_extents.z - expected).abs() < 1e-5);
    }

    #[test]
    fn scale_scales_extents() {
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ONE);
        let t = b.transformed(Mat4::from_scale(Vec3::splat(3.0)));
        assert!(t.center.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-6));
        assert!(t.half_extents.abs_diff_eq(Vec3::splat(3.0), 1e-6));
    }
}
