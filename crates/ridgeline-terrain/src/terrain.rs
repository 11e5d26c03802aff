//! Terrain ownership of the heightfield and the height query contract

use std::path::Path;

use ridgeline_core::Result;

use crate::config::TerrainConfig;
use crate::heightfield::HeightField;
use crate::midpoint::{midpoint_displacement, MidpointParams};

/// Height and scale queries consumed while building terrain vertices.
///
/// `height` must return a finite value for every integer `(x, z)` in
/// `[0, size) × [0, size)`. The scale values must stay constant for the
/// lifetime of any grid built from the source.
pub trait HeightSource {
    fn height(&self, x: u32, z: u32) -> f32;
    fn world_scale(&self) -> f32;
    fn tex_scale(&self) -> f32;
    fn size(&self) -> u32;
}

/// A heightfield with its world and texture scaling
pub struct Terrain {
    heights: HeightField,
    world_scale: f32,
    tex_scale: f32,
}

impl Terrain {
    pub fn new(heights: HeightField, world_scale: f32, tex_scale: f32) -> Self {
        Self {
            heights,
            world_scale,
            tex_scale,
        }
    }

    /// Build the terrain described by a config file.
    ///
    /// `.png` heightmaps are scaled by `height_scale`; any other extension is
    /// read as raw `f32` samples. Without a heightmap the terrain is
    /// generated by midpoint displacement.
    pub fn from_config(config: &TerrainConfig, base_dir: &Path) -> Result<Self> {
        let heights = match &config.heightmap {
            Some(rel) => {
                let path = base_dir.join(rel);
                let is_png = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("png"));
                if is_png {
                    let mut hf = HeightField::from_png(&path)?;
                    hf.normalize(0.0, config.height_scale);
                    hf
                } else {
                    HeightField::load_raw(&path)?
                }
            }
            None => midpoint_displacement(&config.generate)?,
        };

        log::info!(
            "Terrain ready: {}x{} samples, world scale {}",
            heights.size(),
            heights.size(),
            config.world_scale
        );

        Ok(Self::new(heights, config.world_scale, config.tex_scale))
    }

    /// Replace the heights with a freshly generated fractal field
    pub fn regenerate(&mut self, params: &MidpointParams) -> Result<()> {
        self.heights = midpoint_displacement(params)?;
        Ok(())
    }

    pub fn heights(&self) -> &HeightField {
        &self.heights
    }

    /// Interpolated height below world-space `(x, z)`
    pub fn height_at_world(&self, x: f32, z: f32) -> f32 {
        let extent = (self.heights.size() - 1) as f32 * self.world_scale;
        self.heights.sample(x / extent, z / extent)
    }
}

impl HeightSource for Terrain {
    fn height(&self, x: u32, z: u32) -> f32 {
        self.heights.get(x, z)
    }

    fn world_scale(&self) -> f32 {
        self.world_scale
    }

    fn tex_scale(&self) -> f32 {
        self.tex_scale
    }

    fn size(&self) -> u32 {
        self.heights.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_height_sampling() {
        let hf = HeightField::from_raw(vec![0.0, 0.0, 0.0, 4.0, 4.0, 4.0, 8.0, 8.0, 8.0], 3)
            .unwrap();
        let terrain = Terrain::new(hf, 10.0, 1.0);

        assert!((terrain.height_at_world(0.0, 0.0) - 0.0).abs() < 1e-4);
        assert!((terrain.height_at_world(5.0, 10.0) - 4.0).abs() < 1e-4);
        assert!((terrain.height_at_world(0.0, 15.0) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn generated_terrain_from_default_config() {
        let mut config = TerrainConfig::default();
        config.generate.size = 17;
        config.generate.max_height = 32.0;
        let terrain = Terrain::from_config(&config, Path::new(".")).unwrap();
        assert_eq!(terrain.size(), 17);
        assert_eq!(terrain.world_scale(), config.world_scale);
        let (lo, hi) = terrain.heights().height_range().unwrap();
        assert!(lo >= -1e-3 && hi <= 32.0 + 1e-3);
    }

    #[test]
    fn regenerate_replaces_heights() {
        let mut terrain = Terrain::new(HeightField::flat(9, 1.0).unwrap(), 1.0, 1.0);
        terrain
            .regenerate(&MidpointParams {
                size: 17,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(terrain.size(), 17);
    }
}
