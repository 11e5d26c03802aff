//! Per-frame terrain rendering

use glam::Vec3;
use ridgeline_terrain::{DrawStats, GeoMipGrid, RenderMode};
use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::gpu_grid::{GpuTerrainMesh, RenderPassDrawer};
use crate::terrain_pipeline::{TerrainPipeline, TerrainUniforms};

/// Renderer settings that stay fixed between frames
#[derive(Debug, Clone, Copy)]
pub struct RendererConfig {
    /// Direction towards the sun
    pub light_dir: Vec3,
    pub clear_color: wgpu::Color,
    /// Skip patches outside the view frustum
    pub frustum_culling: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            light_dir: Vec3::new(0.4, 1.0, 0.3),
            clear_color: wgpu::Color {
                r: 0.45,
                g: 0.62,
                b: 0.85,
                a: 1.0,
            },
            frustum_culling: true,
        }
    }
}

/// Draws a GeoMip grid with one indexed draw per patch
pub struct TerrainRenderer {
    pipeline: TerrainPipeline,
    mesh: GpuTerrainMesh,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    height_range: (f32, f32),
    config: RendererConfig,
}

impl TerrainRenderer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        grid: &GeoMipGrid,
        config: RendererConfig,
    ) -> Self {
        let pipeline = TerrainPipeline::new(device, format);
        let mesh = GpuTerrainMesh::upload(device, grid);

        let height_range = grid
            .vertices()
            .iter()
            .map(|v| v.position[1])
            .fold((f32::MAX, f32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));

        let uniforms = TerrainUniforms::new(
            glam::Mat4::IDENTITY,
            config.light_dir,
            height_range.0,
            height_range.1,
        );
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Terrain Uniform Bind Group"),
            layout: &pipeline.uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            mesh,
            uniform_buffer,
            uniform_bind_group,
            height_range,
            config,
        }
    }

    /// Update LODs for the camera and render one frame into `color_view`
    #[allow(clippy::too_many_arguments)]
    pub fn render_to(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        camera: &Camera,
        grid: &mut GeoMipGrid,
        mode: RenderMode,
    ) -> DrawStats {
        let uniforms = TerrainUniforms::new(
            camera.view_projection(),
            self.config.light_dir,
            self.height_range.0,
            self.height_range.1,
        );
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Terrain Render Encoder"),
        });

        let stats = {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Terrain Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            let mut drawer = RenderPassDrawer::new(
                &mut pass,
                &self.mesh,
                &self.pipeline.triangles,
                &self.pipeline.points,
            );

            if self.config.frustum_culling {
                grid.draw_culled(camera.position, &camera.frustum(), mode, &mut drawer)
            } else {
                grid.draw(camera.position, mode, &mut drawer)
            }
        };

        queue.submit(std::iter::once(encoder.finish()));

        log::debug!(
            "Frame: {} patches drawn, {} culled, {} indices",
            stats.patches_drawn,
            stats.patches_culled,
            stats.indices_submitted
        );

        stats
    }

    /// Release GPU buffers held by the renderer
    pub fn destroy(self) {
        self.uniform_buffer.destroy();
        self.mesh.destroy();
    }
}
