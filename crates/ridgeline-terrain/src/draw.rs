//! Draw-call submission seam between the grid and a renderer

use crate::lod_manager::PatchLod;
use crate::lod_table::IndexRange;

/// What the terrain draw submits each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// One triangle-list draw per patch
    #[default]
    Triangles,
    /// Triangles plus the finest-level vertices of every patch as points
    PointsOverlay,
    /// Only the point overlay
    PointsOnly,
}

impl RenderMode {
    pub fn draws_triangles(self) -> bool {
        self != RenderMode::PointsOnly
    }

    pub fn draws_points(self) -> bool {
        self != RenderMode::Triangles
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Triangles => "Triangles",
            Self::PointsOverlay => "Triangles + Points",
            Self::PointsOnly => "Points",
        }
    }
}

/// A single indexed draw of one patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchDrawCall {
    pub patch_x: u32,
    pub patch_z: u32,
    /// Added to every index of the region
    pub base_vertex: u32,
    /// Region of the shared index buffer
    pub indices: IndexRange,
    pub lod: PatchLod,
}

/// Receives the draw calls issued by [`crate::GeoMipGrid::draw`]
pub trait PatchDrawer {
    fn draw_patch(&mut self, call: &PatchDrawCall);

    /// Draw `indices` as a point list offset by `base_vertex`
    fn draw_points(&mut self, indices: IndexRange, base_vertex: u32);
}

/// Per-frame submission counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub patches_drawn: u32,
    pub patches_culled: u32,
    pub indices_submitted: u64,
    pub point_draws: u32,
}

/// A drawer that keeps every call, for inspection and tests
#[derive(Debug, Default)]
pub struct DrawRecorder {
    pub patches: Vec<PatchDrawCall>,
    pub points: Vec<(IndexRange, u32)>,
}

impl DrawRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.patches.clear();
        self.points.clear();
    }
}

impl PatchDrawer for DrawRecorder {
    fn draw_patch(&mut self, call: &PatchDrawCall) {
        self.patches.push(*call);
    }

    fn draw_points(&mut self, indices: IndexRange, base_vertex: u32) {
        self.points.push((indices, base_vertex));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_flags() {
        assert!(RenderMode::Triangles.draws_triangles());
        assert!(!RenderMode::Triangles.draws_points());
        assert!(RenderMode::PointsOverlay.draws_triangles());
        assert!(RenderMode::PointsOverlay.draws_points());
        assert!(!RenderMode::PointsOnly.draws_triangles());
    }
}
