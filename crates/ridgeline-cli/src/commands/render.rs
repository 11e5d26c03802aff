//! Headless terrain-to-PNG render command

use anyhow::{Context, Result};
use glam::Vec3;
use ridgeline_render::{Camera, OffscreenTerrain, RendererConfig};
use ridgeline_terrain::{GeoMipGrid, HeightSource, RenderMode};

use super::load_terrain;

pub struct RenderArgs {
    pub config: String,
    pub output: String,
    pub width: u32,
    pub height: u32,
    pub camera: Option<[f32; 3]>,
    pub target: Option<[f32; 3]>,
    pub yaw: Option<f32>,
    pub pitch: Option<f32>,
    pub fov: Option<f32>,
    pub mode: RenderMode,
    pub no_cull: bool,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let mut loaded = load_terrain(&args.config)?;

    let frame = pollster::block_on(OffscreenTerrain::new(
        &loaded.grid,
        args.width,
        args.height,
        RendererConfig {
            frustum_culling: !args.no_cull,
            ..Default::default()
        },
    ))
    .context("Failed to create offscreen terrain renderer")?;

    let camera = configure_camera(&args, &loaded.grid, &loaded.terrain, frame.aspect_ratio());
    log::info!(
        "Camera at ({:.1}, {:.1}, {:.1}), yaw {:.1}°, pitch {:.1}°",
        camera.position.x,
        camera.position.y,
        camera.position.z,
        camera.yaw.to_degrees(),
        camera.pitch.to_degrees()
    );

    let stats = frame.render(&camera, &mut loaded.grid, args.mode);

    let img = frame.capture().context("Failed to read rendered pixels")?;
    img.save(&args.output)
        .with_context(|| format!("Failed to save image to {}", args.output))?;

    frame.destroy();

    println!(
        "Rendered {}x{} image to {} ({}: {} patches, {} culled, {} indices)",
        args.width,
        args.height,
        args.output,
        args.mode.label(),
        stats.patches_drawn,
        stats.patches_culled,
        stats.indices_submitted
    );

    Ok(())
}

/// Camera from the command line, defaulting to a corner view of the terrain
fn configure_camera(
    args: &RenderArgs,
    grid: &GeoMipGrid,
    terrain: &impl HeightSource,
    aspect: f32,
) -> Camera {
    let scale = terrain.world_scale();
    let extent_x = (grid.width() - 1) as f32 * scale;
    let extent_z = (grid.depth() - 1) as f32 * scale;
    let center = Vec3::new(extent_x * 0.5, 0.0, extent_z * 0.5);

    let mut camera = Camera::new();
    camera.aspect = aspect;
    camera.far = camera.far.max(2.0 * (extent_x + extent_z));
    camera.position = match args.camera {
        Some(p) => Vec3::from(p),
        None => Vec3::new(0.0, 0.25 * extent_x.max(extent_z), 0.0),
    };

    match args.target {
        Some(t) => camera.look_at(Vec3::from(t)),
        None if args.yaw.is_none() && args.pitch.is_none() => camera.look_at(center),
        None => {}
    }
    if args.yaw.is_some() || args.pitch.is_some() {
        let yaw = args.yaw.map_or(camera.yaw, f32::to_radians);
        let pitch = args.pitch.map_or(camera.pitch, f32::to_radians);
        camera.set_angles(yaw, pitch);
    }
    if let Some(fov) = args.fov {
        camera.fov = fov;
    }
    camera
}
