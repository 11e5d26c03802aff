//! Ridgeline Render - wgpu renderer for GeoMip terrain
//!
//! Uploads a `GeoMipGrid` once and draws it each frame with one indexed draw
//! per patch, choosing each patch's index region from its current LOD.
//! Rendering is headless: frames land in an offscreen texture that can be
//! read back as an image.

mod camera;
mod context;
mod gpu_grid;
mod headless;
mod renderer;
mod terrain_pipeline;

pub use camera::{Camera, MAX_PITCH};
pub use context::RenderError;
pub use gpu_grid::{GpuTerrainMesh, RenderPassDrawer};
pub use headless::{OffscreenTerrain, COLOR_FORMAT, DEPTH_FORMAT};
pub use renderer::{RendererConfig, TerrainRenderer};
pub use terrain_pipeline::{vertex_layout, TerrainPipeline, TerrainUniforms};

#[cfg(test)]
mod tests {
    #[test]
    fn terrain_shader_wgsl_parses() {
        let source = include_str!("terrain_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("terrain_shader.wgsl failed to parse");
    }

    #[test]
    fn terrain_shader_validates() {
        let source = include_str!("terrain_shader.wgsl");
        let module = naga::front::wgsl::parse_str(source).expect("parse");
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        );
        validator.validate(&module).expect("terrain_shader.wgsl failed validation");

        let entry_points: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        for name in ["vs_main", "fs_main", "fs_points"] {
            assert!(entry_points.contains(&name), "missing entry point {}", name);
        }
    }
}
