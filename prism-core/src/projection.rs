/// Cameras and projection math
///
/// Camera-local axes follow the pipeline convention: X is horizontal,
/// Y points forward (depth) and Z is vertical. Projected points come back
/// as `(screen x, depth, screen z)` with every component in `[-1, 1]` for
/// points inside the frustum.
use nalgebra::Matrix4;

use crate::error::{RasterError, Result};
use crate::transform::Transform;
use crate::vector::Vec3;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

impl ProjectionMode {
    /// Build a camera of this kind at the world origin.
    pub fn build(self, frustum: Frustum) -> Result<Box<dyn Projection>> {
        Ok(match self {
            ProjectionMode::Orthographic => Box::new(OrthographicCamera::new(frustum)?),
            ProjectionMode::Perspective => Box::new(PerspectiveCamera::new(frustum)?),
        })
    }
}

/// View volume bounds in camera-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub near: f64,
    pub far: f64,
}

impl Frustum {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64, near: f64, far: f64) -> Result<Self> {
        let frustum = Self {
            left,
            right,
            top,
            bottom,
            near,
            far,
        };
        frustum.validate()?;
        Ok(frustum)
    }

    /// A frustum centred on the forward axis whose width/height ratio is `aspect`.
    pub fn symmetric(aspect: f64, half_height: f64, near: f64, far: f64) -> Result<Self> {
        let half_width = half_height * aspect;
        Self::new(-half_width, half_width, half_height, -half_height, near, far)
    }

    /// Every extent must be finite and non-zero.
    pub fn validate(&self) -> Result<()> {
        let extents = [
            ("horizontal", self.right - self.left),
            ("vertical", self.top - self.bottom),
            ("depth", self.far - self.near),
        ];
        for (axis, extent) in extents {
            if extent == 0.0 || !extent.is_finite() {
                return Err(RasterError::DegenerateFrustum { axis });
            }
        }
        Ok(())
    }

    pub fn ratio(&self) -> f64 {
        let width = self.right - self.left;
        let height = self.top - self.bottom;
        (width / height).abs()
    }

    /// Linear remap of the box `[left, right] x [near, far] x [bottom, top]`
    /// onto the cube `[-1, 1]^3`.
    #[rustfmt::skip]
    pub fn orthographic_matrix(&self) -> Matrix4<f64> {
        let rml = self.right - self.left;
        let fmn = self.far - self.near;
        let tmb = self.top - self.bottom;

        Matrix4::new(
            2.0 / rml, 0.0,       0.0,       -(self.right + self.left) / rml,
            0.0,       2.0 / fmn, 0.0,       -(self.far + self.near) / fmn,
            0.0,       0.0,       2.0 / tmb, -(self.top + self.bottom) / tmb,
            0.0,       0.0,       0.0,       1.0,
        )
    }

    #[rustfmt::skip]
    pub fn inverse_orthographic_matrix(&self) -> Matrix4<f64> {
        let rml = self.right - self.left;
        let fmn = self.far - self.near;
        let tmb = self.top - self.bottom;

        Matrix4::new(
            rml / 2.0, 0.0,       0.0,       (self.right + self.left) / 2.0,
            0.0,       fmn / 2.0, 0.0,       (self.far + self.near) / 2.0,
            0.0,       0.0,       tmb / 2.0, (self.top + self.bottom) / 2.0,
            0.0,       0.0,       0.0,       1.0,
        )
    }
}

/// Common interface of every camera the renderer can draw through.
pub trait Projection {
    fn frustum(&self) -> &Frustum;

    fn transform(&self) -> &Transform;

    fn transform_mut(&mut self) -> &mut Transform;

    /// Map a world-space point to screen space.
    fn project_point(&self, p: &Vec3) -> Result<Vec3>;

    /// Map a screen-space point (as produced by `project_point`) back to world space.
    fn project_inverse_point(&self, p: &Vec3) -> Result<Vec3>;

    /// Absolute width/height ratio of the frustum.
    fn ratio(&self) -> f64 {
        self.frustum().ratio()
    }

    /// World-space viewing direction (the camera's local +Y axis).
    fn forward(&self) -> Vec3 {
        self.transform().apply_to_normal(&Vec3::y())
    }
}

#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    pub transform: Transform,
    frustum: Frustum,
    orthographic: Matrix4<f64>,
    inverse_orthographic: Matrix4<f64>,
}

impl OrthographicCamera {
    pub fn new(frustum: Frustum) -> Result<Self> {
        frustum.validate()?;
        Ok(Self {
            transform: Transform::new(),
            frustum,
            orthographic: frustum.orthographic_matrix(),
            inverse_orthographic: frustum.inverse_orthographic_matrix(),
        })
    }
}

impl Projection for OrthographicCamera {
    fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    fn project_point(&self, p: &Vec3) -> Result<Vec3> {
        let p_camera = self.transform.apply_inverse_to_point(p);
        Ok((self.orthographic * p_camera.push(1.0)).xyz())
    }

    fn project_inverse_point(&self, p: &Vec3) -> Result<Vec3> {
        let p_camera = (self.inverse_orthographic * p.push(1.0)).xyz();
        Ok(self.transform.apply_to_point(&p_camera))
    }
}

/// Pinhole camera: a perspective squash along the forward axis followed by
/// the same remap the orthographic camera uses.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub transform: Transform,
    frustum: Frustum,
    orthographic: Matrix4<f64>,
    inverse_orthographic: Matrix4<f64>,
    perspective: Matrix4<f64>,
    inverse_perspective: Matrix4<f64>,
}

impl PerspectiveCamera {
    pub fn new(frustum: Frustum) -> Result<Self> {
        frustum.validate()?;
        let (n, f) = (frustum.near, frustum.far);
        if n == 0.0 || f == 0.0 {
            return Err(RasterError::DegenerateFrustum { axis: "depth" });
        }

        #[rustfmt::skip]
        let perspective = Matrix4::new(
            n,   0.0,   0.0, 0.0,
            0.0, n + f, 0.0, -f * n,
            0.0, 0.0,   n,   0.0,
            0.0, 1.0,   0.0, 0.0,
        );

        #[rustfmt::skip]
        let inverse_perspective = Matrix4::new(
            1.0 / n, 0.0,            0.0,     0.0,
            0.0,     0.0,            0.0,     1.0,
            0.0,     0.0,            1.0 / n, 0.0,
            0.0,     -1.0 / (n * f), 0.0,     (n + f) / (n * f),
        );

        Ok(Self {
            transform: Transform::new(),
            frustum,
            orthographic: frustum.orthographic_matrix(),
            inverse_orthographic: frustum.inverse_orthographic_matrix(),
            perspective,
            inverse_perspective,
        })
    }

    pub fn perspective_matrix(&self) -> &Matrix4<f64> {
        &self.perspective
    }
}

impl Projection for PerspectiveCamera {
    fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    fn project_point(&self, p: &Vec3) -> Result<Vec3> {
        let p_camera = self.transform.apply_inverse_to_point(p);
        let clip = self.perspective * p_camera.push(1.0);
        if clip.w == 0.0 {
            return Err(RasterError::DivisionByZero("perspective divide at the camera plane"));
        }
        let divided = clip / clip.w;
        Ok((self.orthographic * divided).xyz())
    }

    fn project_inverse_point(&self, p: &Vec3) -> Result<Vec3> {
        let (n, f) = (self.frustum.near, self.frustum.far);
        let p1 = self.inverse_orthographic * p.push(1.0);

        let denominator = (n + f) - p1.y;
        if denominator == 0.0 {
            return Err(RasterError::DivisionByZero("inverse perspective at infinite depth"));
        }
        let y_c = n * f / denominator;

        let p_camera = (self.inverse_perspective * (p1 * y_c)).xyz();
        Ok(self.transform.apply_to_point(&p_camera))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).norm() < 1e-9, "{a:?} != {b:?}");
    }

    fn unit_box() -> Frustum {
        Frustum::new(-2.0, 4.0, 3.0, 1.0, 0.0, 10.0).unwrap()
    }

    #[test]
    fn test_frustum_validation() {
        assert_eq!(
            Frustum::new(1.0, 1.0, 1.0, -1.0, 0.0, 1.0),
            Err(RasterError::DegenerateFrustum { axis: "horizontal" })
        );
        assert_eq!(
            Frustum::new(-1.0, 1.0, 1.0, 1.0, 0.0, 1.0),
            Err(RasterError::DegenerateFrustum { axis: "vertical" })
        );
        assert_eq!(
            Frustum::new(-1.0, 1.0, 1.0, -1.0, 2.0, 2.0),
            Err(RasterError::DegenerateFrustum { axis: "depth" })
        );
    }

    #[test]
    fn test_frustum_rejects_non_finite_bounds() {
        assert_eq!(
            Frustum::new(f64::NAN, 1.0, 1.0, -1.0, 0.0, 1.0),
            Err(RasterError::DegenerateFrustum { axis: "horizontal" })
        );
        assert_eq!(
            Frustum::new(-1.0, 1.0, f64::INFINITY, -1.0, 0.0, 1.0),
            Err(RasterError::DegenerateFrustum { axis: "vertical" })
        );
        assert_eq!(
            Frustum::new(-1.0, 1.0, 1.0, -1.0, 0.0, f64::NAN),
            Err(RasterError::DegenerateFrustum { axis: "depth" })
        );
        assert!(Frustum::symmetric(f64::INFINITY, 1.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_ratio() {
        let camera = OrthographicCamera::new(unit_box()).unwrap();
        assert!((camera.ratio() - 3.0).abs() < 1e-12);

        let flipped = Frustum::new(4.0, -2.0, 3.0, 1.0, 0.0, 10.0).unwrap();
        assert!((flipped.ratio() - 3.0).abs() < 1e-12);

        let symmetric = Frustum::symmetric(16.0 / 9.0, 1.0, 0.1, 100.0).unwrap();
        assert!((symmetric.ratio() - 16.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_orthographic_corners() {
        let camera = OrthographicCamera::new(unit_box()).unwrap();
        let low = camera.project_point(&Vec3::new(-2.0, 0.0, 1.0)).unwrap();
        let high = camera.project_point(&Vec3::new(4.0, 10.0, 3.0)).unwrap();
        let centre = camera.project_point(&Vec3::new(1.0, 5.0, 2.0)).unwrap();
        assert_close(low, Vec3::new(-1.0, -1.0, -1.0));
        assert_close(high, Vec3::new(1.0, 1.0, 1.0));
        assert_close(centre, Vec3::zeros());
    }

    #[test]
    fn test_orthographic_is_affine() {
        let camera = OrthographicCamera::new(unit_box()).unwrap();
        let a = Vec3::new(-1.0, 2.0, 1.5);
        let b = Vec3::new(3.0, 8.0, 2.5);
        let pa = camera.project_point(&a).unwrap();
        let pb = camera.project_point(&b).unwrap();
        let mid = camera.project_point(&((a + b) * 0.5)).unwrap();
        assert_close(mid, (pa + pb) * 0.5);
        // Order preserving on every axis
        assert!(pa.x < pb.x && pa.y < pb.y && pa.z < pb.z);
    }

    #[test]
    fn test_orthographic_follows_camera_transform() {
        let mut camera = OrthographicCamera::new(unit_box()).unwrap();
        camera.transform_mut().set_position(10.0, 0.0, 0.0);
        let moved = camera.project_point(&Vec3::new(11.0, 5.0, 2.0)).unwrap();
        assert_close(moved, Vec3::zeros());

        let mut turned = OrthographicCamera::new(unit_box()).unwrap();
        turned.transform_mut().set_rotation(0.0, 0.0, 90.0);
        // Looking down world -X now
        assert_close(turned.forward(), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_orthographic_inverse_round_trip() {
        let mut camera = OrthographicCamera::new(unit_box()).unwrap();
        camera.transform_mut().set_position(1.0, -3.0, 0.5);
        camera.transform_mut().set_rotation(20.0, -35.0, 60.0);
        for p in [Vec3::new(0.0, 1.0, 2.0), Vec3::new(-5.0, 3.0, 7.5)] {
            let screen = camera.project_point(&p).unwrap();
            assert_close(camera.project_inverse_point(&screen).unwrap(), p);
        }
    }

    #[test]
    fn test_perspective_depth_range() {
        let frustum = Frustum::new(-1.0, 1.0, 1.0, -1.0, 5.0, 6.0).unwrap();
        let camera = PerspectiveCamera::new(frustum).unwrap();
        let near = camera.project_point(&Vec3::new(0.0, 5.0, 0.0)).unwrap();
        let far = camera.project_point(&Vec3::new(0.0, 6.0, 0.0)).unwrap();
        assert_close(near, Vec3::new(0.0, -1.0, 0.0));
        assert_close(far, Vec3::new(0.0, 1.0, 0.0));

        // Foreshortening: the same offset looks smaller further away
        let edge_near = camera.project_point(&Vec3::new(1.0, 5.0, 1.0)).unwrap();
        let edge_far = camera.project_point(&Vec3::new(1.0, 6.0, 1.0)).unwrap();
        assert!((edge_near.x - 1.0).abs() < 1e-9);
        assert!(edge_far.x < edge_near.x);
        assert!(edge_far.z < edge_near.z);
    }

    #[test]
    fn test_perspective_inverse_round_trip() {
        let frustum = Frustum::new(1.0, 2.0, 4.0, 3.0, 5.0, 6.0).unwrap();
        let mut camera = PerspectiveCamera::new(frustum).unwrap();
        let points = [
            Vec3::new(3.0, 5.5, 3.0),
            Vec3::new(1.5, 5.1, 3.5),
            Vec3::new(-2.0, 5.9, 10.0),
            Vec3::new(0.0, 5.25, -1.0),
        ];
        for p in &points {
            let screen = camera.project_point(p).unwrap();
            assert_close(camera.project_inverse_point(&screen).unwrap(), *p);
        }

        camera.transform_mut().set_position(0.5, -1.0, 2.0);
        camera.transform_mut().set_rotation(0.0, 0.0, 15.0);
        for p in &points {
            let world = camera.transform().apply_to_point(p);
            let screen = camera.project_point(&world).unwrap();
            assert_close(camera.project_inverse_point(&screen).unwrap(), world);
        }
    }

    #[test]
    fn test_perspective_inverse_matrix() {
        let frustum = Frustum::new(1.0, 2.0, 4.0, 3.0, 5.0, 6.0).unwrap();
        let camera = PerspectiveCamera::new(frustum).unwrap();
        let product = camera.perspective_matrix() * camera.inverse_perspective;
        assert!((product - Matrix4::identity()).norm() < 1e-12);
    }

    #[test]
    fn test_perspective_singularities() {
        let frustum = Frustum::new(-1.0, 1.0, 1.0, -1.0, 5.0, 6.0).unwrap();
        let camera = PerspectiveCamera::new(frustum).unwrap();
        // A point on the camera plane has w = 0
        assert!(matches!(
            camera.project_point(&Vec3::new(1.0, 0.0, 1.0)),
            Err(RasterError::DivisionByZero(_))
        ));
        // Remapped depth of exactly near + far
        assert!(matches!(
            camera.project_inverse_point(&Vec3::new(0.0, 11.0, 0.0)),
            Err(RasterError::DivisionByZero(_))
        ));

        let zero_near = Frustum::new(-1.0, 1.0, 1.0, -1.0, 0.0, 6.0).unwrap();
        assert!(PerspectiveCamera::new(zero_near).is_err());
    }

    #[test]
    fn test_projection_mode_builds_boxed_camera() {
        let frustum = Frustum::symmetric(2.0, 1.0, 1.0, 10.0).unwrap();
        for mode in [ProjectionMode::Orthographic, ProjectionMode::Perspective] {
            let camera = mode.build(frustum).unwrap();
            assert!((camera.ratio() - 2.0).abs() < 1e-12);
            assert_close(camera.forward(), Vec3::y());
        }
    }
}
