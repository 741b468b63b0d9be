/// Z-buffered triangle rasterizer
///
/// One call to `Renderer::render` produces one frame: every face of every
/// mesh is culled, projected, bounded in pixel space and scanned pixel by
/// pixel against its barycentric coordinates and the depth buffer.
use std::f64::consts::PI;

use log::debug;

use crate::error::{RasterError, Result};
use crate::geometry::{Material, Mesh};
use crate::light::PointLight;
use crate::projection::Projection;
use crate::screen::{Color, Framebuffer, Screen};
use crate::vector::{Vec3, VectorExt};

/// Largest accepted difference between screen and camera aspect ratios.
pub const ASPECT_TOLERANCE: f64 = 0.001;

/// Initial depth buffer value, beyond anything inside the clip volume.
const FAR_DEPTH: f64 = 1000.0;

const UNSHADED: Color = [0, 0, 0];

/// Debug palette for the six axis-aligned object-space normals.
const AXIS_COLORS: [([f64; 3], Color); 6] = [
    ([1.0, 0.0, 0.0], [255, 0, 0]),
    ([-1.0, 0.0, 0.0], [127, 0, 0]),
    ([0.0, 1.0, 0.0], [0, 255, 0]),
    ([0.0, -1.0, 0.0], [0, 127, 0]),
    ([0.0, 0.0, 1.0], [0, 0, 255]),
    ([0.0, 0.0, -1.0], [0, 0, 127]),
];

/// How visible fragments are colored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Lambertian diffuse plus ambient, evaluated once per face
    #[default]
    Flat,
    /// Grey ramp over the frame's projected depth range
    Depth,
    /// Barycentric weights as red, green and blue
    Barycentric,
    /// Fixed color per axis-aligned face normal
    Normal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub shading: ShadingMode,
    pub background_color: Color,
    /// Ambient light color, RGB in `[0, 1]`
    pub ambient_light: Vec3,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shading: ShadingMode::Flat,
            background_color: [0, 0, 0],
            ambient_light: Vec3::new(0.1, 0.1, 0.1),
        }
    }
}

/// Per-frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub faces_drawn: usize,
    pub faces_culled: usize,
    /// Faces with a vertex the camera cannot project
    pub faces_skipped: usize,
    pub fragments_written: usize,
}

struct DepthBuffer {
    width: usize,
    values: Vec<f64>,
}

impl DepthBuffer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            values: vec![FAR_DEPTH; width * height],
        }
    }

    fn is_closer(&self, x: usize, y: usize, depth: f64) -> bool {
        depth < self.values[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize, depth: f64) {
        self.values[y * self.width + x] = depth;
    }
}

/// A mesh's vertices after the object-to-world and world-to-screen steps.
struct ProjectedMesh {
    world: Vec<Vec3>,
    screen: Vec<Option<Vec3>>,
}

pub struct Renderer {
    screen: Screen,
}

impl Renderer {
    pub fn new(screen: Screen) -> Self {
        Self { screen }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn render(
        &self,
        meshes: &[Mesh],
        camera: &dyn Projection,
        light: &PointLight,
        settings: &RenderSettings,
    ) -> Result<Framebuffer> {
        self.render_with_stats(meshes, camera, light, settings)
            .map(|(frame, _)| frame)
    }

    pub fn render_with_stats(
        &self,
        meshes: &[Mesh],
        camera: &dyn Projection,
        light: &PointLight,
        settings: &RenderSettings,
    ) -> Result<(Framebuffer, RenderStats)> {
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(RasterError::EmptyScreen {
                width: self.screen.width,
                height: self.screen.height,
            });
        }
        let screen_ratio = self.screen.ratio();
        let camera_ratio = camera.ratio();
        let ratios_match = (screen_ratio - camera_ratio).abs() <= ASPECT_TOLERANCE;
        if !ratios_match {
            return Err(RasterError::AspectMismatch {
                screen: screen_ratio,
                camera: camera_ratio,
            });
        }
        for mesh in meshes {
            mesh.validate()?;
        }

        let (width, height) = (self.screen.width, self.screen.height);
        debug!(
            "rendering {} meshes into {}x{} with {:?} shading",
            meshes.len(),
            width,
            height,
            settings.shading
        );

        let mut frame = Framebuffer::new(width, height, settings.background_color);
        let mut depth_buffer = DepthBuffer::new(width, height);
        let mut stats = RenderStats::default();

        let projected: Vec<ProjectedMesh> = meshes
            .iter()
            .map(|mesh| project_mesh(mesh, camera))
            .collect();
        let (min_depth, max_depth) = depth_range(&projected);

        let forward = camera.forward();

        for (mesh, projection) in meshes.iter().zip(&projected) {
            for (i, face) in mesh.faces.iter().enumerate() {
                let normal = mesh.transform.apply_to_normal(&mesh.normals[i]);
                if normal.dot(&forward) >= 0.0 {
                    stats.faces_culled += 1;
                    continue;
                }

                let [Some(v0), Some(v1), Some(v2)] = face.map(|index| projection.screen[index])
                else {
                    stats.faces_skipped += 1;
                    continue;
                };
                stats.faces_drawn += 1;

                let flat_color = match settings.shading {
                    ShadingMode::Flat => {
                        let [a, b, c] = face.map(|index| projection.world[index]);
                        let centroid = (a + b + c) / 3.0;
                        flat_shade(
                            &centroid,
                            &normal,
                            light,
                            &mesh.material,
                            &settings.ambient_light,
                        )
                    }
                    _ => UNSHADED,
                };

                let min_x = v0.x.min(v1.x).min(v2.x);
                let max_x = v0.x.max(v1.x).max(v2.x);
                let min_z = v0.z.min(v1.z).min(v2.z);
                let max_z = v0.z.max(v1.z).max(v2.z);

                let (left, top) = self.screen.screen_to_pixel(min_x, max_z);
                let (right, bottom) = self.screen.screen_to_pixel(max_x, min_z);

                let x_start = left.max(0) as usize;
                let x_end = right.saturating_add(1).clamp(0, width as i64) as usize;
                let y_start = bottom.max(0) as usize;
                let y_end = top.saturating_add(1).clamp(0, height as i64) as usize;

                for x in x_start..x_end {
                    for y in y_start..y_end {
                        let p = self.screen.pixel_to_screen(x, y);
                        let Some((alpha, beta, gamma)) = barycentric_2d(&v0, &v1, &v2, &p) else {
                            continue;
                        };

                        let depth = alpha * v0.y + beta * v1.y + gamma * v2.y;
                        if !(-1.0..=1.0).contains(&depth) {
                            continue;
                        }
                        if !depth_buffer.is_closer(x, y, depth) {
                            continue;
                        }
                        let inside = [alpha, beta, gamma]
                            .iter()
                            .all(|weight| (0.0..=1.0).contains(weight));
                        if !inside {
                            continue;
                        }

                        let color = match settings.shading {
                            ShadingMode::Flat => flat_color,
                            ShadingMode::Depth => depth_shade(depth, min_depth, max_depth),
                            ShadingMode::Barycentric => [
                                (alpha * 255.0) as u8,
                                (beta * 255.0) as u8,
                                (gamma * 255.0) as u8,
                            ],
                            ShadingMode::Normal => normal_shade(&mesh.normals[i]),
                        };

                        frame.set(x, y, color);
                        depth_buffer.set(x, y, depth);
                        stats.fragments_written += 1;
                    }
                }
            }
        }

        debug!(
            "frame done: {} faces drawn, {} culled, {} skipped, {} fragments written",
            stats.faces_drawn, stats.faces_culled, stats.faces_skipped, stats.fragments_written
        );
        Ok((frame, stats))
    }
}

fn project_mesh(mesh: &Mesh, camera: &dyn Projection) -> ProjectedMesh {
    let world: Vec<Vec3> = mesh
        .vertices
        .iter()
        .map(|v| mesh.transform.apply_to_point(v))
        .collect();
    let screen = world.iter().map(|p| camera.project_point(p).ok()).collect();
    ProjectedMesh { world, screen }
}

/// Smallest and largest projected depth over every vertex in the frame.
fn depth_range(projected: &[ProjectedMesh]) -> (f64, f64) {
    projected
        .iter()
        .flat_map(|mesh| mesh.screen.iter().flatten())
        .fold((FAR_DEPTH, -FAR_DEPTH), |(min, max), p| {
            (min.min(p.y), max.max(p.y))
        })
}

/// Barycentric coordinates `(alpha, beta, gamma)` of `p` against the
/// triangle `v0, v1, v2`, using only the screen-plane `x` and `z`
/// components. Returns `None` for a triangle with zero screen area.
pub fn barycentric_2d(v0: &Vec3, v1: &Vec3, v2: &Vec3, p: &Vec3) -> Option<(f64, f64, f64)> {
    // Implicit line through v0 and v1, evaluated at (x, z)
    let line_01 =
        |x: f64, z: f64| (v0.z - v1.z) * x + (v1.x - v0.x) * z + v0.x * v1.z - v1.x * v0.z;
    let line_02 =
        |x: f64, z: f64| (v0.z - v2.z) * x + (v2.x - v0.x) * z + v0.x * v2.z - v2.x * v0.z;

    let gamma_denominator = line_01(v2.x, v2.z);
    if gamma_denominator == 0.0 {
        return None;
    }
    let gamma = line_01(p.x, p.z) / gamma_denominator;

    let beta_denominator = line_02(v1.x, v1.z);
    if beta_denominator == 0.0 {
        return None;
    }
    let beta = line_02(p.x, p.z) / beta_denominator;

    Some((1.0 - beta - gamma, beta, gamma))
}

fn flat_shade(
    point: &Vec3,
    normal: &Vec3,
    light: &PointLight,
    material: &Material,
    ambient_light: &Vec3,
) -> Color {
    let light_position = light.position();

    // A light sitting exactly on the face contributes nothing
    let irradiance = match point.direction_to(&light_position) {
        Ok(to_light) => {
            let cos_theta = normal.dot(&to_light).max(0.0);
            let distance = point.distance_to(&light_position);
            light.color * (light.intensity * cos_theta / (distance * distance))
        }
        Err(_) => Vec3::zeros(),
    };

    let lambertian = (material.diffuse_color * material.kd / PI).map(|c| c.min(1.0));
    let rgb = lambertian.component_mul(&irradiance) + ambient_light * material.ka;
    to_color(&rgb)
}

fn depth_shade(depth: f64, min_depth: f64, max_depth: f64) -> Color {
    let range = max_depth - min_depth;
    let hue = if range > 0.0 {
        ((depth - min_depth) / range * 127.0) as u8
    } else {
        0
    };
    [hue, hue, hue]
}

fn normal_shade(normal: &Vec3) -> Color {
    AXIS_COLORS
        .iter()
        .find(|(axis, _)| normal.x == axis[0] && normal.y == axis[1] && normal.z == axis[2])
        .map_or(UNSHADED, |(_, color)| *color)
}

fn to_color(rgb: &Vec3) -> Color {
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0) as u8;
    [channel(rgb.x), channel(rgb.y), channel(rgb.z)]
}
