/// Vector helpers on top of nalgebra
///
/// Arithmetic (`+`, `-`, unary `-`, `* scalar`), `dot`, `cross` and
/// `magnitude` come straight from nalgebra. This module adds the fallible
/// normalization and the point-to-point helpers the pipeline relies on.
use nalgebra::Vector3;

use crate::error::{RasterError, Result};

pub type Vec3 = Vector3<f64>;

pub trait VectorExt: Sized {
    /// Unit vector in the same direction, failing on a zero-length input.
    fn normalized(&self) -> Result<Self>;

    fn distance_to(&self, other: &Self) -> f64;

    /// Unit vector pointing from `self` towards `other`.
    fn direction_to(&self, other: &Self) -> Result<Self>;
}

impl VectorExt for Vec3 {
    fn normalized(&self) -> Result<Vec3> {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return Err(RasterError::DivisionByZero("normalizing a zero-length vector"));
        }
        Ok(self / magnitude)
    }

    fn distance_to(&self, other: &Vec3) -> f64 {
        (other - self).magnitude()
    }

    fn direction_to(&self, other: &Vec3) -> Result<Vec3> {
        (other - self).normalized()
    }
}
