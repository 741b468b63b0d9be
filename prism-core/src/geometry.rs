/// Mesh, material and triangle data consumed by the renderer
use std::collections::HashMap;

use log::debug;

use crate::error::{RasterError, Result};
use crate::transform::Transform;
use crate::vector::{Vec3, VectorExt};

/// Surface response coefficients. Colors are RGB in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    /// Ambient coefficient
    pub ka: f64,
    /// Diffuse coefficient
    pub kd: f64,
    /// Specular coefficient
    pub ks: f64,
    /// Specular exponent
    pub ke: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_color: Vec3::new(1.0, 0.0, 1.0),
            specular_color: Vec3::new(1.0, 1.0, 1.0),
            ka: 0.2,
            kd: 1.0,
            ks: 0.2,
            ke: 100.0,
        }
    }
}

/// A free-standing triangle, as read from a model file
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Unit normal following the right-hand rule over `v0 -> v1 -> v2`.
    pub fn calculate_normal(&self) -> Result<Vec3> {
        let [v0, v1, v2] = &self.vertices;
        (v1 - v0).cross(&(v2 - v0)).normalized()
    }
}

/// Indexed triangle mesh with one normal per face.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Vec<Vec3>,
    pub transform: Transform,
    pub material: Material,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: Vec::new(),
            transform: Transform::new(),
            material: Material::default(),
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn add_face(&mut self, face: [usize; 3], normal: Vec3) {
        self.faces.push(face);
        self.normals.push(normal);
    }

    /// Build an indexed mesh from a triangle soup.
    ///
    /// Vertices with identical positions are merged, keeping the index of
    /// the first occurrence. Face normals are recomputed from the winding and
    /// zero-area triangles are dropped.
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut mesh = Self::new();
        let mut index_of: HashMap<[u64; 3], usize> = HashMap::new();
        let mut skipped = 0;

        for triangle in triangles {
            let normal = match triangle.calculate_normal() {
                Ok(normal) => normal,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };

            let mut face = [0; 3];
            for (slot, vertex) in face.iter_mut().zip(&triangle.vertices) {
                // Adding zero folds -0.0 into +0.0 so both share a key
                let key = [
                    (vertex.x + 0.0).to_bits(),
                    (vertex.y + 0.0).to_bits(),
                    (vertex.z + 0.0).to_bits(),
                ];
                *slot = *index_of.entry(key).or_insert_with(|| {
                    mesh.vertices.push(*vertex);
                    mesh.vertices.len() - 1
                });
            }
            mesh.add_face(face, normal);
        }

        if skipped > 0 {
            debug!("dropped {} zero-area triangles", skipped);
        }
        mesh
    }

    /// Axis-aligned cube centred on the origin with exact axis normals.
    pub fn cube(size: f64) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::new();

        // Corner i has +half on x, y, z where bits 0, 1, 2 of i are set
        for i in 0..8 {
            let coord = |bit: usize| if i & bit != 0 { half } else { -half };
            mesh.vertices.push(Vec3::new(coord(1), coord(2), coord(4)));
        }

        let sides: [([usize; 4], Vec3); 6] = [
            ([1, 3, 7, 5], Vec3::new(1.0, 0.0, 0.0)),
            ([0, 4, 6, 2], Vec3::new(-1.0, 0.0, 0.0)),
            ([2, 6, 7, 3], Vec3::new(0.0, 1.0, 0.0)),
            ([0, 1, 5, 4], Vec3::new(0.0, -1.0, 0.0)),
            ([4, 5, 7, 6], Vec3::new(0.0, 0.0, 1.0)),
            ([0, 2, 3, 1], Vec3::new(0.0, 0.0, -1.0)),
        ];
        for ([a, b, c, d], normal) in sides {
            mesh.add_face([a, b, c], normal);
            mesh.add_face([a, c, d], normal);
        }

        mesh
    }

    /// Square in the XZ plane facing -Y, i.e. towards a camera at the
    /// origin looking down its forward axis.
    pub fn quad(size: f64) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::new();
        mesh.vertices = vec![
            Vec3::new(-half, 0.0, -half),
            Vec3::new(half, 0.0, -half),
            Vec3::new(half, 0.0, half),
            Vec3::new(-half, 0.0, half),
        ];
        let facing = Vec3::new(0.0, -1.0, 0.0);
        mesh.add_face([0, 1, 2], facing);
        mesh.add_face([0, 2, 3], facing);
        mesh
    }

    /// Object-space bounding box as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.inf(v), max.sup(v))
        }))
    }

    /// Check that every face references existing vertices and that there is
    /// exactly one normal per face.
    pub fn validate(&self) -> Result<()> {
        if self.normals.len() != self.faces.len() {
            return Err(RasterError::InvalidMesh(format!(
                "{} normals for {} faces",
                self.normals.len(),
                self.faces.len()
            )));
        }
        for (i, face) in self.faces.iter().enumerate() {
            if let Some(index) = face.iter().find(|&&index| index >= self.vertices.len()) {
                return Err(RasterError::InvalidMesh(format!(
                    "face {} references vertex {} but the mesh has {} vertices",
                    i,
                    index,
                    self.vertices.len()
                )));
            }
        }
        Ok(())
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_is_valid() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.faces.len(), 12);
        assert!(cube.validate().is_ok());

        let (min, max) = cube.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_cube_normals_point_outwards() {
        let cube = Mesh::cube(2.0);
        for (face, normal) in cube.faces.iter().zip(&cube.normals) {
            let centroid = face
                .iter()
                .fold(Vec3::zeros(), |acc, &i| acc + cube.vertices[i])
                / 3.0;
            assert!(centroid.dot(normal) > 0.0);
        }
    }

    #[test]
    fn test_quad_faces_negative_y() {
        let quad = Mesh::quad(2.0);
        assert!(quad.validate().is_ok());
        for (face, normal) in quad.faces.iter().zip(&quad.normals) {
            let triangle = Triangle::new(
                quad.vertices[face[0]],
                quad.vertices[face[1]],
                quad.vertices[face[2]],
            );
            assert_eq!(triangle.calculate_normal().unwrap(), *normal);
        }
    }

    #[test]
    fn test_from_triangles_merges_vertices() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(1.0, 1.0, 0.0);
        let d = Vec3::new(0.0, 1.0, 0.0);
        let signed_zero = Vec3::new(-0.0, 0.0, 0.0);

        let mesh =
            Mesh::from_triangles(&[Triangle::new(a, b, c), Triangle::new(signed_zero, c, d)]);

        assert_eq!(mesh.vertices, vec![a, b, c, d]);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.normals, vec![Vec3::z(), Vec3::z()]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_from_triangles_drops_degenerate() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        let mesh = Mesh::from_triangles(&[Triangle::new(p, p, Vec3::zeros())]);
        assert!(mesh.faces.is_empty());
        assert!(mesh.normals.is_empty());
    }

    #[test]
    fn test_validate_rejects_dangling_index() {
        let mut mesh = Mesh::quad(1.0);
        mesh.add_face([0, 1, 9], Vec3::z());
        assert!(matches!(mesh.validate(), Err(RasterError::InvalidMesh(_))));

        let mut mesh = Mesh::quad(1.0);
        mesh.normals.pop();
        assert!(matches!(mesh.validate(), Err(RasterError::InvalidMesh(_))));
    }

    #[test]
    fn test_default_material() {
        let material = Material::default();
        assert_eq!(material.diffuse_color, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(material.ka, 0.2);
        assert_eq!(material.kd, 1.0);
    }
}
