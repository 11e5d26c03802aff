//! Ridgeline Terrain - GeoMip level-of-detail terrain meshes
//!
//! Provides heightfield loading and generation, the per-patch LOD manager
//! and the GeoMip grid that turns a heightfield into one shared vertex
//! buffer plus precomputed index regions for every LOD permutation. Does not
//! depend on a graphics API: draws go through the `PatchDrawer` seam.

pub mod config;
pub mod draw;
pub mod fan;
pub mod geomip_grid;
pub mod heightfield;
pub mod lod_manager;
pub mod lod_table;
pub mod midpoint;
pub mod terrain;
pub mod vertex;

pub use config::TerrainConfig;
pub use draw::{DrawRecorder, DrawStats, PatchDrawCall, PatchDrawer, RenderMode};
pub use fan::{fan_index_count, FanIndexGenerator};
pub use geomip_grid::{suggested_dimension, GeoMipGrid, GridOptions};
pub use heightfield::HeightField;
pub use lod_manager::{max_lod_for_patch_size, LodManager, PatchLod, Z_FAR};
pub use lod_table::{IndexRange, LodKey, LodTable};
pub use midpoint::{midpoint_displacement, MidpointParams};
pub use terrain::{HeightSource, Terrain};
pub use vertex::TerrainVertex;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn generated_terrain_builds_a_drawable_grid() {
        let config = TerrainConfig::from_toml_str(
            r#"
            world_scale = 2.0
            patch_size = 17

            [generate]
            size = 65
            roughness = 1.2
            max_height = 100.0
            seed = 3
            "#,
        )
        .unwrap();

        let terrain = Terrain::from_config(&config, std::path::Path::new(".")).unwrap();
        let mut grid =
            GeoMipGrid::create(65, 65, config.patch_size, &terrain).unwrap();
        assert_eq!(grid.num_patches(), (4, 4));
        assert_eq!(grid.max_lod(), 3);

        let mut recorder = DrawRecorder::new();
        let stats = grid.draw(Vec3::new(64.0, 50.0, 64.0), RenderMode::Triangles, &mut recorder);
        assert_eq!(stats.patches_drawn, 16);
        assert!(recorder
            .patches
            .iter()
            .all(|call| call.indices.end() as usize <= grid.indices().len()));
    }
}
