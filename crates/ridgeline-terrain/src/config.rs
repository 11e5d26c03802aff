//! Terrain configuration, parsed from a TOML file

use std::path::Path;

use serde::Deserialize;

use ridgeline_core::Result;

use crate::lod_manager::Z_FAR;
use crate::midpoint::MidpointParams;

/// Configuration for a GeoMip terrain
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Heightmap path relative to the config file (`.raw` floats or `.png`).
    /// When absent the terrain is generated from `[generate]`.
    pub heightmap: Option<String>,
    /// World units between neighbouring samples
    pub world_scale: f32,
    /// Texture repeats across the whole terrain
    pub tex_scale: f32,
    /// Vertical scale applied to normalized PNG heightmaps
    pub height_scale: f32,
    /// Vertices per patch edge
    pub patch_size: u32,
    /// Grid vertices along X (defaults to the heightfield size)
    pub width: Option<u32>,
    /// Grid vertices along Z (defaults to the heightfield size)
    pub depth: Option<u32>,
    /// Far distance covered by the LOD bands
    pub z_far: f32,
    /// Midpoint displacement settings used when no heightmap is given
    pub generate: MidpointParams,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap: None,
            world_scale: 4.0,
            tex_scale: 4.0,
            height_scale: 256.0,
            patch_size: 33,
            width: None,
            depth: None,
            z_far: Z_FAR,
            generate: MidpointParams::default(),
        }
    }
}

impl TerrainConfig {
    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = TerrainConfig::from_toml_str("").unwrap();
        assert_eq!(config.patch_size, 33);
        assert_eq!(config.z_far, Z_FAR);
        assert!(config.heightmap.is_none());
        assert_eq!(config.generate.size, 513);
    }

    #[test]
    fn parses_full_config() {
        let text = r#"
            heightmap = "maps/terrain.raw"
            world_scale = 2.0
            tex_scale = 8.0
            patch_size = 17
            width = 257
            depth = 129
            z_far = 1200.0

            [generate]
            size = 257
            roughness = 1.5
            seed = 99
        "#;
        let config = TerrainConfig::from_toml_str(text).unwrap();
        assert_eq!(config.heightmap.as_deref(), Some("maps/terrain.raw"));
        assert_eq!(config.patch_size, 17);
        assert_eq!(config.width, Some(257));
        assert_eq!(config.depth, Some(129));
        assert_eq!(config.generate.seed, 99);
        assert_eq!(config.generate.max_height, 256.0);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = TerrainConfig::from_toml_str("patch_size = \"big\"").unwrap_err();
        assert!(err.to_string().contains("TOML parse error"));
    }
}
