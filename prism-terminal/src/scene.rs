/// Framing a single model for display
///
/// The model is re-centred on the origin, rotated, and viewed from the -Y
/// side by a camera far enough back to fit its bounding sphere.
use log::debug;
use prism_core::{
    Framebuffer, Frustum, Material, Mesh, PointLight, Projection, ProjectionMode, RenderSettings,
    RenderStats, Renderer, Screen, Vec3,
};

/// Camera distance in bounding radii
const VIEW_DISTANCE: f64 = 3.0;
/// Extra room around the model in the frame
const MARGIN: f64 = 1.1;

/// Everything the user can configure about the scene
#[derive(Debug, Clone)]
pub struct SceneOptions {
    pub projection: ProjectionMode,
    /// Model rotation in degrees about X, Y, Z
    pub rotation: [f64; 3],
    pub diffuse_color: Vec3,
    /// Light intensity; scaled to the model size when unset
    pub light_intensity: Option<f64>,
    pub light_color: Vec3,
    pub settings: RenderSettings,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            projection: ProjectionMode::Perspective,
            rotation: [30.0, 0.0, 35.0],
            diffuse_color: Material::default().diffuse_color,
            light_intensity: None,
            light_color: Vec3::new(1.0, 1.0, 1.0),
            settings: RenderSettings::default(),
        }
    }
}

pub struct Scene {
    mesh: Mesh,
    light: PointLight,
    projection: ProjectionMode,
    radius: f64,
    pub settings: RenderSettings,
}

impl Scene {
    pub fn new(mut mesh: Mesh, options: &SceneOptions) -> Self {
        let (center, radius) = match mesh.bounds() {
            Some((min, max)) => ((min + max) / 2.0, ((max - min).norm() / 2.0).max(1e-6)),
            None => (Vec3::zeros(), 1.0),
        };

        // Rotate about the bounding box centre: world = R * (p - center)
        let [rx, ry, rz] = options.rotation;
        mesh.transform.set_rotation(rx, ry, rz);
        let offset = -mesh.transform.apply_to_normal(&center);
        mesh.transform.set_position(offset.x, offset.y, offset.z);
        mesh.material.diffuse_color = options.diffuse_color;

        let distance = VIEW_DISTANCE * radius;
        // Over the camera's left shoulder, slightly above
        let light_position = Vec3::new(-radius, -distance, radius * 1.5);
        let intensity = options
            .light_intensity
            .unwrap_or_else(|| 3.0 * light_position.norm_squared());
        let mut light = PointLight::new(intensity, options.light_color);
        light
            .transform
            .set_position(light_position.x, light_position.y, light_position.z);

        debug!(
            "scene: {} faces, radius {:.3}, light intensity {:.3}",
            mesh.faces.len(),
            radius,
            intensity
        );

        Self {
            mesh,
            light,
            projection: options.projection,
            radius,
            settings: options.settings.clone(),
        }
    }

    /// A camera on the -Y axis looking at the origin with the given aspect ratio.
    pub fn camera(&self, aspect: f64) -> prism_core::Result<Box<dyn Projection>> {
        let distance = VIEW_DISTANCE * self.radius;
        let near = distance - 2.0 * self.radius;
        let far = distance + 2.0 * self.radius;

        let half_height = match self.projection {
            ProjectionMode::Orthographic => MARGIN * self.radius,
            // Same apparent size at the model centre, measured on the near plane
            ProjectionMode::Perspective => MARGIN * self.radius * near / distance,
        };

        let frustum = Frustum::symmetric(aspect, half_height, near, far)?;
        let mut camera = self.projection.build(frustum)?;
        camera.transform_mut().set_position(0.0, -distance, 0.0);
        Ok(camera)
    }

    pub fn render(&self, screen: Screen) -> prism_core::Result<(Framebuffer, RenderStats)> {
        let camera = self.camera(screen.ratio())?;
        Renderer::new(screen).render_with_stats(
            std::slice::from_ref(&self.mesh),
            camera.as_ref(),
            &self.light,
            &self.settings,
        )
    }
}
