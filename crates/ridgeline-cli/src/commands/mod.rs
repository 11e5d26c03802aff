//! CLI command implementations

pub mod generate;
pub mod info;
pub mod lod_map;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use ridgeline_terrain::{GeoMipGrid, GridOptions, Terrain, TerrainConfig};

/// A terrain config resolved into a built grid
pub struct LoadedTerrain {
    pub terrain: Terrain,
    pub grid: GeoMipGrid,
}

/// Load a config file, build its terrain and the GeoMip grid over it.
///
/// The grid covers the whole heightfield unless the config narrows it.
pub fn load_terrain(config_path: &str) -> Result<LoadedTerrain> {
    let path = Path::new(config_path);
    let config = TerrainConfig::load(path)
        .with_context(|| format!("Failed to load terrain config {}", config_path))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let terrain = Terrain::from_config(&config, base_dir).context("Failed to build terrain")?;

    let size = terrain.heights().size();
    let width = config.width.unwrap_or(size);
    let depth = config.depth.unwrap_or(size);

    let grid = GeoMipGrid::create_with(
        width,
        depth,
        config.patch_size,
        &terrain,
        GridOptions {
            z_far: config.z_far,
        },
    )
    .context("Invalid grid configuration")?;

    Ok(LoadedTerrain {
        terrain,
        grid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    pub(crate) fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ridgeline_cli_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_generated_terrain_at_full_size() {
        let dir = temp_dir();
        let config_path = dir.join("terrain.toml");
        std::fs::write(
            &config_path,
            "patch_size = 9\n[generate]\nsize = 33\nseed = 11\n",
        )
        .unwrap();

        let loaded = load_terrain(config_path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.grid.width(), 33);
        assert_eq!(loaded.grid.num_patches(), (4, 4));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn reports_grid_configuration_errors() {
        let dir = temp_dir();
        let config_path = dir.join("terrain.toml");
        std::fs::write(
            &config_path,
            "patch_size = 9\nwidth = 30\n[generate]\nsize = 33\n",
        )
        .unwrap();

        let err = load_terrain(config_path.to_str().unwrap()).err().unwrap();
        let chain = format!("{:#}", err);
        assert!(chain.contains("Invalid grid configuration"));
        assert!(chain.contains("try using Width = 33"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_config_is_an_error() {
        let err = load_terrain("/nonexistent/ridgeline.toml").err().unwrap();
        assert!(format!("{:#}", err).contains("Failed to load terrain config"));
    }
}
