//! Prints the per-patch LOD map for a camera position

use std::fmt::Write;

use anyhow::Result;
use glam::Vec3;
use ridgeline_terrain::{DrawRecorder, GeoMipGrid, RenderMode};

use super::load_terrain;

pub fn run(config: &str, camera: [f32; 3], flags: bool) -> Result<()> {
    let mut loaded = load_terrain(config)?;
    print!("{}", lod_report(&mut loaded.grid, Vec3::from(camera), flags));
    Ok(())
}

/// Update the grid for `camera` and describe the resulting LOD state
pub fn lod_report(grid: &mut GeoMipGrid, camera: Vec3, flags: bool) -> String {
    let stats = grid.draw(camera, RenderMode::Triangles, &mut DrawRecorder::new());
    let manager = grid.lod_manager();
    let (nx, nz) = manager.num_patches();

    let mut out = String::new();
    let _ = writeln!(out, "Camera: {:.1}, {:.1}, {:.1}", camera.x, camera.y, camera.z);
    out.push_str(&manager.lod_map_string());

    if flags {
        // coarser-neighbour sides per patch, in L R T B order
        let _ = writeln!(out, "Boundary flags:");
        for z in (0..nz).rev() {
            let _ = write!(out, "{}:", z);
            for x in 0..nx {
                let lod = manager.patch_lod(x, z);
                let _ = write!(
                    out,
                    " {}{}{}{}",
                    lod.left as u8, lod.right as u8, lod.top as u8, lod.bottom as u8
                );
            }
            out.push('\n');
        }
    }

    let _ = writeln!(
        out,
        "{} patches, {} indices per frame",
        stats.patches_drawn, stats.indices_submitted
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridgeline_terrain::{GridOptions, HeightField, Terrain};

    #[test]
    fn report_shows_rows_top_down() {
        let terrain = Terrain::new(HeightField::flat(65, 0.0).unwrap(), 1.0, 1.0);
        let mut grid =
            GeoMipGrid::create_with(65, 65, 9, &terrain, GridOptions { z_far: 60.0 }).unwrap();

        let text = lod_report(&mut grid, Vec3::ZERO, true);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Camera:"));
        assert!(lines[1].starts_with("7:"));
        assert!(lines[8].starts_with("0: 0"));
        assert_eq!(lines[9], "Boundary flags:");
        // patch (0, 0) sees coarser neighbours on its right and top
        assert!(lines[17].starts_with("0: 0110"));
        assert!(text.ends_with("indices per frame\n"));
    }
}
