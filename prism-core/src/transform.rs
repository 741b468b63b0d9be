/// Rigid 3D transforms stored as homogeneous 4x4 matrices
use nalgebra::{Matrix4, Rotation3, Vector3};

use crate::vector::Vec3;

/// Pose of a mesh, camera or light in world space.
///
/// The upper-left 3x3 block is always a pure rotation and the bottom row is
/// always `(0, 0, 0, 1)`, which keeps the inverse a transpose plus a
/// translation. There is no scale component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f64>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    pub fn position(&self) -> Vec3 {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    pub fn set_position(&mut self, x: f64, y: f64, z: f64) {
        self.matrix
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&Vec3::new(x, y, z));
    }

    /// Replace the rotation block with rotations about X, then Y, then Z
    /// (angles in degrees), composed as `Rx * Ry * Rz`.
    pub fn set_rotation(&mut self, x: f64, y: f64, z: f64) {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), x.to_radians());
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), y.to_radians());
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), z.to_radians());
        let rotation = rx * ry * rz;

        self.matrix
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(rotation.matrix());
    }

    /// Closed-form inverse `[R^T | -R^T t]`.
    pub fn inverse_matrix(&self) -> Matrix4<f64> {
        let rotation_t = self.matrix.fixed_view::<3, 3>(0, 0).transpose();
        let translation = -(rotation_t * self.position());

        let mut inverse = Matrix4::identity();
        inverse.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation_t);
        inverse.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);
        inverse
    }

    pub fn apply_to_point(&self, p: &Vec3) -> Vec3 {
        (self.matrix * p.push(1.0)).xyz()
    }

    /// Rotate a direction. Translation is ignored (w = 0); this is only a
    /// correct normal transform because the pose never carries scale.
    pub fn apply_to_normal(&self, n: &Vec3) -> Vec3 {
        (self.matrix * n.push(0.0)).xyz()
    }

    pub fn apply_inverse_to_point(&self, p: &Vec3) -> Vec3 {
        (self.inverse_matrix() * p.push(1.0)).xyz()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
