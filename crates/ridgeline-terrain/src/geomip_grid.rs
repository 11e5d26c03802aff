//! GeoMip terrain grid: shared vertex buffer, precomputed LOD index regions
//! and per-patch draw submission

use glam::Vec3;
use ridgeline_core::{Axis, Frustum, Grid2, Result, RidgelineError};

use crate::draw::{DrawStats, PatchDrawCall, PatchDrawer, RenderMode};
use crate::fan::FanIndexGenerator;
use crate::lod_manager::{LodManager, Z_FAR};
use crate::lod_table::{IndexRange, LodKey, LodTable};
use crate::terrain::HeightSource;
use crate::vertex::TerrainVertex;

/// Optional settings for [`GeoMipGrid::create_with`]
#[derive(Debug, Clone, Copy)]
pub struct GridOptions {
    /// Far distance covered by the LOD bands
    pub z_far: f32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self { z_far: Z_FAR }
    }
}

/// A terrain grid split into square patches, each drawn at its own level of
/// detail from one vertex buffer and one index buffer.
pub struct GeoMipGrid {
    width: u32,
    depth: u32,
    patch_size: u32,
    num_patches_x: u32,
    num_patches_z: u32,
    max_lod: u32,
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
    lod_table: LodTable,
    lod_manager: LodManager,
    /// World-space (min, max) corners of each patch
    patch_bounds: Grid2<(Vec3, Vec3)>,
}

impl GeoMipGrid {
    /// Build a `width × depth` vertex grid from `terrain`, split into
    /// patches of `patch_size` vertices per edge.
    pub fn create(
        width: u32,
        depth: u32,
        patch_size: u32,
        terrain: &impl HeightSource,
    ) -> Result<Self> {
        Self::create_with(width, depth, patch_size, terrain, GridOptions::default())
    }

    pub fn create_with(
        width: u32,
        depth: u32,
        patch_size: u32,
        terrain: &impl HeightSource,
        options: GridOptions,
    ) -> Result<Self> {
        validate_dimensions(width, depth, patch_size, terrain.size())?;

        let num_patches_x = (width - 1) / (patch_size - 1);
        let num_patches_z = (depth - 1) / (patch_size - 1);

        let lod_manager = LodManager::with_z_far(
            patch_size,
            num_patches_x,
            num_patches_z,
            terrain.world_scale(),
            options.z_far,
        )?;
        let max_lod = lod_manager.max_lod();

        log::debug!("Preparing space for {} vertices", width * depth);
        let mut vertices = init_vertices(width, depth, terrain);

        let (indices, lod_table) = FanIndexGenerator::new(width, patch_size).generate(max_lod);
        debug_assert_eq!(lod_table.num_levels(), max_lod as usize + 1);

        let mut grid = Self {
            width,
            depth,
            patch_size,
            num_patches_x,
            num_patches_z,
            max_lod,
            vertices: Vec::new(),
            indices,
            lod_table,
            lod_manager,
            patch_bounds: Grid2::new(
                num_patches_x as usize,
                num_patches_z as usize,
                (Vec3::ZERO, Vec3::ZERO),
            ),
        };

        grid.calc_normals(&mut vertices);
        grid.vertices = vertices;
        grid.calc_patch_bounds();

        log::info!(
            "GeoMip grid {}x{}: {}x{} patches of {}, max LOD {}, {} indices",
            width,
            depth,
            num_patches_x,
            num_patches_z,
            patch_size,
            max_lod,
            grid.indices.len()
        );

        Ok(grid)
    }

    /// Update the LOD map for `camera_pos` and submit one draw per patch
    pub fn draw(
        &mut self,
        camera_pos: Vec3,
        mode: RenderMode,
        drawer: &mut impl PatchDrawer,
    ) -> DrawStats {
        self.submit(camera_pos, None, mode, drawer)
    }

    /// Like [`GeoMipGrid::draw`], skipping patches entirely outside `frustum`
    pub fn draw_culled(
        &mut self,
        camera_pos: Vec3,
        frustum: &Frustum,
        mode: RenderMode,
        drawer: &mut impl PatchDrawer,
    ) -> DrawStats {
        self.submit(camera_pos, Some(frustum), mode, drawer)
    }

    fn submit(
        &mut self,
        camera_pos: Vec3,
        frustum: Option<&Frustum>,
        mode: RenderMode,
        drawer: &mut impl PatchDrawer,
    ) -> DrawStats {
        self.lod_manager.update(camera_pos);

        let mut stats = DrawStats::default();
        let finest = self.lod_table.range(0, LodKey::NONE);

        for patch_z in 0..self.num_patches_z {
            for patch_x in 0..self.num_patches_x {
                if let Some(frustum) = frustum {
                    let (min, max) = self.patch_aabb(patch_x, patch_z);
                    if !frustum.intersects_aabb(min, max) {
                        stats.patches_culled += 1;
                        continue;
                    }
                }

                let base_vertex = self.base_vertex(patch_x, patch_z);

                if mode.draws_points() {
                    drawer.draw_points(finest, base_vertex);
                    stats.point_draws += 1;
                }

                if mode.draws_triangles() {
                    let lod = *self.lod_manager.patch_lod(patch_x, patch_z);
                    let indices = self.lod_table.range(lod.core, lod.key());

                    drawer.draw_patch(&PatchDrawCall {
                        patch_x,
                        patch_z,
                        base_vertex,
                        indices,
                        lod,
                    });
                    stats.patches_drawn += 1;
                    stats.indices_submitted += indices.count as u64;
                }
            }
        }

        stats
    }

    /// Index of the bottom-left vertex of a patch
    pub fn base_vertex(&self, patch_x: u32, patch_z: u32) -> u32 {
        let z = patch_z * (self.patch_size - 1);
        let x = patch_x * (self.patch_size - 1);
        z * self.width + x
    }

    /// Index region a patch uses with its LOD state from the last draw
    pub fn patch_index_range(&self, patch_x: u32, patch_z: u32) -> IndexRange {
        let lod = self.lod_manager.patch_lod(patch_x, patch_z);
        self.lod_table.range(lod.core, lod.key())
    }

    /// Triangles of a patch at its current LOD, as global vertex indices
    pub fn patch_triangles(&self, patch_x: u32, patch_z: u32) -> Vec<[u32; 3]> {
        let base = self.base_vertex(patch_x, patch_z);
        let range = self.patch_index_range(patch_x, patch_z);
        self.indices[range.start as usize..range.end() as usize]
            .chunks_exact(3)
            .map(|t| [base + t[0], base + t[1], base + t[2]])
            .collect()
    }

    /// World-space bounding box of a patch
    pub fn patch_aabb(&self, patch_x: u32, patch_z: u32) -> (Vec3, Vec3) {
        *self.patch_bounds.get(patch_x as usize, patch_z as usize)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn patch_size(&self) -> u32 {
        self.patch_size
    }

    pub fn num_patches(&self) -> (u32, u32) {
        (self.num_patches_x, self.num_patches_z)
    }

    pub fn max_lod(&self) -> u32 {
        self.max_lod
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn lod_table(&self) -> &LodTable {
        &self.lod_table
    }

    pub fn lod_manager(&self) -> &LodManager {
        &self.lod_manager
    }

    /// Accumulate the face normal of every finest-level triangle into its
    /// vertices, stamping the LOD-0 pattern at each patch origin, then
    /// normalize once.
    fn calc_normals(&self, vertices: &mut [TerrainVertex]) {
        let pattern = self.lod_table.range(0, LodKey::NONE);
        let pattern = &self.indices[pattern.start as usize..pattern.end() as usize];

        let mut normals = vec![Vec3::ZERO; vertices.len()];

        for patch_z in 0..self.num_patches_z {
            for patch_x in 0..self.num_patches_x {
                let base = self.base_vertex(patch_x, patch_z) as usize;
                for tri in pattern.chunks_exact(3) {
                    let i0 = base + tri[0] as usize;
                    let i1 = base + tri[1] as usize;
                    let i2 = base + tri[2] as usize;

                    let p0 = Vec3::from(vertices[i0].position);
                    let v1 = Vec3::from(vertices[i1].position) - p0;
                    let v2 = Vec3::from(vertices[i2].position) - p0;
                    let normal = v1.cross(v2).normalize_or_zero();

                    normals[i0] += normal;
                    normals[i1] += normal;
                    normals[i2] += normal;
                }
            }
        }

        for (vertex, normal) in vertices.iter_mut().zip(normals) {
            vertex.normal = normal.normalize_or_zero().to_array();
        }
    }

    fn calc_patch_bounds(&mut self) {
        let step = self.patch_size - 1;
        for patch_z in 0..self.num_patches_z {
            for patch_x in 0..self.num_patches_x {
                let mut min = Vec3::splat(f32::MAX);
                let mut max = Vec3::splat(f32::MIN);
                for z in patch_z * step..=(patch_z + 1) * step {
                    for x in patch_x * step..=(patch_x + 1) * step {
                        let p = Vec3::from(self.vertices[(z * self.width + x) as usize].position);
                        min = min.min(p);
                        max = max.max(p);
                    }
                }
                self.patch_bounds
                    .set(patch_x as usize, patch_z as usize, (min, max));
            }
        }
    }
}

fn init_vertices(width: u32, depth: u32, terrain: &impl HeightSource) -> Vec<TerrainVertex> {
    let world_scale = terrain.world_scale();
    let size = terrain.size() as f32;
    let tex_scale = terrain.tex_scale();

    let mut vertices = Vec::with_capacity((width * depth) as usize);
    for z in 0..depth {
        for x in 0..width {
            let y = terrain.height(x, z);
            vertices.push(TerrainVertex {
                position: [x as f32 * world_scale, y, z as f32 * world_scale],
                tex: [tex_scale * x as f32 / size, tex_scale * z as f32 / size],
                normal: [0.0; 3],
            });
        }
    }
    vertices
}

/// Nearest valid grid dimension at or above `value` for `patch_size`.
/// Patch sizes below 3 are treated as 3.
pub fn suggested_dimension(value: u32, patch_size: u32) -> u32 {
    let patch_size = patch_size.max(3);
    let segments = patch_size - 1;
    let rounded = value.saturating_sub(1).div_ceil(segments) * segments + 1;
    rounded.max(patch_size)
}

fn validate_dimensions(width: u32, depth: u32, patch_size: u32, terrain_size: u32) -> Result<()> {
    if patch_size < 3 {
        return Err(RidgelineError::PatchTooSmall(patch_size));
    }

    for (axis, value) in [(Axis::Width, width), (Axis::Depth, depth)] {
        if value < patch_size || (value - 1) % (patch_size - 1) != 0 {
            return Err(RidgelineError::GridNotDivisible {
                axis,
                value,
                patch_size,
                suggested: suggested_dimension(value, patch_size),
            });
        }
    }

    if patch_size % 2 == 0 {
        return Err(RidgelineError::PatchSizeEven(patch_size));
    }

    for (axis, value) in [(Axis::Width, width), (Axis::Depth, depth)] {
        if value > terrain_size {
            return Err(RidgelineError::GridExceedsHeightField {
                axis,
                value,
                size: terrain_size,
            });
        }
    }

    Ok(())
}
