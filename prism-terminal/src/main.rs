/// Prism - render a model once and show it in the terminal or save it as PNG
///
/// Controls (terminal mode):
///   - Q/ESC: Quit
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use prism_core::{stl, Mesh, ProjectionMode, RenderSettings, Screen, ShadingMode, Vec3};
use prism_terminal::{DisplayMode, Scene, SceneOptions, TerminalApp};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CameraArg {
    Orthographic,
    Perspective,
}

impl From<CameraArg> for ProjectionMode {
    fn from(camera: CameraArg) -> Self {
        match camera {
            CameraArg::Orthographic => ProjectionMode::Orthographic,
            CameraArg::Perspective => ProjectionMode::Perspective,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ShadingArg {
    Flat,
    Depth,
    Barycentric,
    Normal,
}

impl From<ShadingArg> for ShadingMode {
    fn from(shading: ShadingArg) -> Self {
        match shading {
            ShadingArg::Flat => ShadingMode::Flat,
            ShadingArg::Depth => ShadingMode::Depth,
            ShadingArg::Barycentric => ShadingMode::Barycentric,
            ShadingArg::Normal => ShadingMode::Normal,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "prism", version, about = "Software 3D rasterizer")]
struct Cli {
    /// STL model to render (a cube when omitted)
    model: Option<PathBuf>,

    /// Edge length of the default cube
    #[arg(long, default_value = "2.0")]
    cube_size: f64,

    #[arg(long, value_enum, default_value = "perspective", env = "PRISM_CAMERA")]
    camera: CameraArg,

    #[arg(long, value_enum, default_value = "flat", env = "PRISM_SHADING")]
    shading: ShadingArg,

    /// Model rotation in degrees as X,Y,Z
    #[arg(long, value_parser = parse_triple, default_value = "30,0,35", allow_hyphen_values = true)]
    rotate: [f64; 3],

    /// Diffuse color as R,G,B in [0, 1]
    #[arg(long, value_parser = parse_unit_color, default_value = "1,0,1")]
    color: [f64; 3],

    /// Background color as R,G,B in [0, 255]
    #[arg(long, value_parser = parse_byte_color, default_value = "0,0,0")]
    background: [u8; 3],

    /// Ambient light as R,G,B in [0, 1]
    #[arg(long, value_parser = parse_unit_color, default_value = "0.1,0.1,0.1")]
    ambient: [f64; 3],

    /// Point light intensity (scaled to the model when omitted)
    #[arg(long)]
    light_intensity: Option<f64>,

    /// Point light color as R,G,B in [0, 1]
    #[arg(long, value_parser = parse_unit_color, default_value = "1,1,1")]
    light_color: [f64; 3],

    /// Draw with ASCII characters instead of 24-bit color blocks
    #[arg(long)]
    ascii: bool,

    /// Render off-screen and save a PNG instead of opening the terminal view
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Image width for --output
    #[arg(long, default_value = "640")]
    width: u32,

    /// Image height for --output
    #[arg(long, default_value = "480")]
    height: u32,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", env = "PRISM_LOG_LEVEL")]
    log_level: String,
}

fn parse_triple(value: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected three comma-separated numbers, got '{}'", value));
    };
    let parse = |part: &str| {
        part.parse::<f64>()
            .map_err(|e| format!("invalid number '{}': {}", part, e))
    };
    Ok([parse(*x)?, parse(*y)?, parse(*z)?])
}

fn parse_unit_color(value: &str) -> Result<[f64; 3], String> {
    let color = parse_triple(value)?;
    if color.iter().any(|c| !(0.0..=1.0).contains(c)) {
        return Err(format!("color channels must be in [0, 1], got '{}'", value));
    }
    Ok(color)
}

fn parse_byte_color(value: &str) -> Result<[u8; 3], String> {
    let color = parse_triple(value)?;
    if color.iter().any(|c| !(0.0..=255.0).contains(c) || c.fract() != 0.0) {
        return Err(format!("color channels must be integers in [0, 255], got '{}'", value));
    }
    Ok(color.map(|c| c as u8))
}

fn load_model(cli: &Cli) -> Result<Mesh> {
    let Some(path) = &cli.model else {
        return Ok(Mesh::cube(cli.cube_size));
    };

    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mesh = stl::load_mesh(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    info!(
        "loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.vertices.len(),
        mesh.faces.len()
    );
    Ok(mesh)
}

fn scene_options(cli: &Cli) -> SceneOptions {
    SceneOptions {
        projection: cli.camera.into(),
        rotation: cli.rotate,
        diffuse_color: Vec3::from(cli.color),
        light_intensity: cli.light_intensity,
        light_color: Vec3::from(cli.light_color),
        settings: RenderSettings {
            shading: cli.shading.into(),
            background_color: cli.background,
            ambient_light: Vec3::from(cli.ambient),
        },
    }
}

fn save_png(scene: &Scene, cli: &Cli, path: &Path) -> Result<()> {
    if cli.width == 0 || cli.height == 0 {
        bail!("output size must be non-zero, got {}x{}", cli.width, cli.height);
    }

    let screen = Screen::new(cli.width as usize, cli.height as usize);
    let (frame, stats) = scene.render(screen).context("failed to render frame")?;
    info!(
        "{} faces drawn, {} culled, {} fragments written",
        stats.faces_drawn, stats.faces_culled, stats.fragments_written
    );

    let image = image::RgbImage::from_raw(cli.width, cli.height, frame.to_rgb_bytes())
        .context("framebuffer size does not match the image size")?;
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level.as_str())).init();

    let mesh = load_model(&cli)?;
    let scene = Scene::new(mesh, &scene_options(&cli));

    if let Some(path) = &cli.output {
        return save_png(&scene, &cli, path);
    }

    let mode = if cli.ascii {
        DisplayMode::Ascii
    } else {
        DisplayMode::TrueColor
    };
    let mut app = TerminalApp::new(scene, mode);
    app.run()
}
