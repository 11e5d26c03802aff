//! GPU upload of a GeoMip grid and the render-pass patch drawer

use ridgeline_terrain::{GeoMipGrid, IndexRange, PatchDrawCall, PatchDrawer};
use wgpu::util::DeviceExt;

/// The grid's shared vertex and index buffers on the GPU
pub struct GpuTerrainMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub index_count: u32,
}

impl GpuTerrainMesh {
    /// Upload both buffers once; every frame reuses them.
    pub fn upload(device: &wgpu::Device, grid: &GeoMipGrid) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Vertex Buffer"),
            contents: bytemuck::cast_slice(grid.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Index Buffer"),
            contents: bytemuck::cast_slice(grid.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "Uploaded terrain mesh: {} vertices, {} indices",
            grid.vertices().len(),
            grid.indices().len()
        );

        Self {
            vertex_buffer,
            index_buffer,
            vertex_count: grid.vertices().len() as u32,
            index_count: grid.indices().len() as u32,
        }
    }

    /// Release the GPU memory now instead of waiting for drop
    pub fn destroy(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        log::debug!("Terrain mesh buffers destroyed");
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Bound {
    Triangles,
    Points,
}

/// Issues patch draws into a render pass with the terrain mesh bound.
///
/// Switches pipelines only when the draw kind changes.
pub struct RenderPassDrawer<'a, 'pass> {
    pass: &'a mut wgpu::RenderPass<'pass>,
    triangles: &'a wgpu::RenderPipeline,
    points: &'a wgpu::RenderPipeline,
    bound: Option<Bound>,
}

impl<'a, 'pass> RenderPassDrawer<'a, 'pass> {
    pub fn new(
        pass: &'a mut wgpu::RenderPass<'pass>,
        mesh: &GpuTerrainMesh,
        triangles: &'a wgpu::RenderPipeline,
        points: &'a wgpu::RenderPipeline,
    ) -> Self {
        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        Self {
            pass,
            triangles,
            points,
            bound: None,
        }
    }

    fn bind(&mut self, kind: Bound) {
        if self.bound != Some(kind) {
            let pipeline = match kind {
                Bound::Triangles => self.triangles,
                Bound::Points => self.points,
            };
            self.pass.set_pipeline(pipeline);
            self.bound = Some(kind);
        }
    }
}

impl PatchDrawer for RenderPassDrawer<'_, '_> {
    fn draw_patch(&mut self, call: &PatchDrawCall) {
        self.bind(Bound::Triangles);
        self.pass
            .draw_indexed(call.indices.as_range(), call.base_vertex as i32, 0..1);
    }

    fn draw_points(&mut self, indices: IndexRange, base_vertex: u32) {
        self.bind(Bound::Points);
        self.pass
            .draw_indexed(indices.as_range(), base_vertex as i32, 0..1);
    }
}
