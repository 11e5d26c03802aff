//! Grid summary command

use std::fmt::Write;

use anyhow::Result;
use ridgeline_terrain::GeoMipGrid;

use super::load_terrain;

pub fn run(config: &str) -> Result<()> {
    let loaded = load_terrain(config)?;
    let (min, max) = loaded.terrain.heights().height_range().unwrap_or((0.0, 0.0));

    println!("Config: {}", config);
    println!(
        "Height field: {}x{} samples, heights {:.2}..{:.2}",
        loaded.terrain.heights().size(),
        loaded.terrain.heights().size(),
        min,
        max
    );
    print!("{}", summary(&loaded.grid));

    Ok(())
}

/// Patch layout, LOD bands and index totals of a grid
pub fn summary(grid: &GeoMipGrid) -> String {
    let (nx, nz) = grid.num_patches();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Grid: {}x{} vertices, {}x{} patches of {}",
        grid.width(),
        grid.depth(),
        nx,
        nz,
        grid.patch_size()
    );
    let _ = writeln!(out, "Max LOD: {}", grid.max_lod());

    let mut lower = 0.0;
    for (lod, bound) in grid.lod_manager().regions().iter().enumerate() {
        let _ = writeln!(
            out,
            "  LOD {}: distance {:.1}..{:.1}, {} indices",
            lod,
            lower,
            bound,
            grid.lod_table().level_index_count(lod as u32)
        );
        lower = *bound;
    }

    let _ = writeln!(
        out,
        "Buffers: {} vertices, {} indices",
        grid.vertices().len(),
        grid.indices().len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridgeline_terrain::{HeightField, Terrain};

    #[test]
    fn summary_lists_every_level() {
        let terrain = Terrain::new(HeightField::flat(33, 0.0).unwrap(), 1.0, 1.0);
        let grid = GeoMipGrid::create(33, 33, 9, &terrain).unwrap();
        let text = summary(&grid);

        assert!(text.contains("4x4 patches of 9"));
        assert!(text.contains("Max LOD: 2"));
        assert!(text.contains("  LOD 0:"));
        assert!(text.contains("  LOD 2:"));
        assert!(!text.contains("  LOD 3:"));
        assert!(text.contains(&format!("{} indices\n", grid.indices().len())));
    }
}
