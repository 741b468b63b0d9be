/// Point light source
use crate::transform::Transform;
use crate::vector::Vec3;

/// A single omnidirectional light. Only its transform's position matters.
#[derive(Debug, Clone)]
pub struct PointLight {
    pub intensity: f64,
    /// RGB in `[0, 1]`
    pub color: Vec3,
    pub transform: Transform,
}

impl PointLight {
    pub fn new(intensity: f64, color: Vec3) -> Self {
        Self {
            intensity,
            color,
            transform: Transform::new(),
        }
    }

    pub fn white(intensity: f64) -> Self {
        Self::new(intensity, Vec3::new(1.0, 1.0, 1.0))
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }
}
