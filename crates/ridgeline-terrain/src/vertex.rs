//! GPU-ready terrain vertex

use bytemuck::{Pod, Zeroable};

/// One terrain grid point: world position, texture coordinate and normal
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub tex: [f32; 2],
    pub normal: [f32; 3],
}
