use glam::{Mat4, Quat, Vec3};

/// Local translation / rotation / scale, composed lazily into a matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Compose `child` onto `self`, i.e. the world transform of a child whose
    /// parent has world transform `self`.
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.translation + self.rotation * (self.scale * child.translation),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }

    /// Local −Z rotated into world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Local +Y rotated into world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_matrix() {
        let m = Transform::IDENTITY.matrix();
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn scale_applies_before_translation() {
        let tr = Transform::from_trs(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, Vec3::splat(2.0));
        let p = tr.matrix().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(3.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn mul_transform_matches_matrix_product() {
        let parent = Transform::from_trs(
            Vec3::new(5.0, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::splat(2.0),
        );
        let child = Transform::from_trs(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_x(0.3),
            Vec3::splat(0.5),
        );

        let composed = parent.mul_transform(&child).matrix();
        let product = parent.matrix() * child.matrix();
        assert!(composed.abs_diff_eq(product, 1e-5));
    }

    #[test]
    fn forward_is_rotated_neg_z() {
        let tr = Transform::from_trs(
            Vec3::ZERO,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::ONE,
        );
        assert!(tr.forward().abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), 1e-5));
        assert!(tr.up().abs_diff_eq(Vec3::Y, 1e-5));
    }
}
