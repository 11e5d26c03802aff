//! Heightfield storage, loading and sampling

use std::path::Path;

use ridgeline_core::{Grid2, Result, RidgelineError};

/// A square grid of height samples whose side minus one is a power of two
#[derive(Clone, Debug)]
pub struct HeightField {
    heights: Grid2<f32>,
}

impl HeightField {
    /// Create a heightfield from row-major samples.
    pub fn from_raw(heights: Vec<f32>, size: u32) -> Result<Self> {
        validate_size(size)?;
        let heights = Grid2::from_vec(size as usize, size as usize, heights)
            .map_err(|e| RidgelineError::HeightmapFormat(e.to_string()))?;
        Ok(Self { heights })
    }

    /// A constant-height field (mostly useful for testing)
    pub fn flat(size: u32, height: f32) -> Result<Self> {
        validate_size(size)?;
        Ok(Self {
            heights: Grid2::new(size as usize, size as usize, height),
        })
    }

    /// Load a flat binary file of little-endian `f32` samples.
    ///
    /// The byte count must be a whole number of floats and the float count a
    /// perfect square.
    pub fn load_raw(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_le_bytes(&bytes).map_err(|e| match e {
            RidgelineError::HeightmapFormat(msg) => {
                RidgelineError::HeightmapFormat(format!("'{}': {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Decode the raw heightfield format from memory
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self> {
        let float_size = std::mem::size_of::<f32>();
        if bytes.len() % float_size != 0 {
            return Err(RidgelineError::HeightmapFormat(format!(
                "does not contain a whole number of floats (size {})",
                bytes.len()
            )));
        }

        let count = bytes.len() / float_size;
        let size = integer_sqrt(count);
        if size * size != count {
            return Err(RidgelineError::HeightmapFormat(format!(
                "does not contain a square height map ({} samples)",
                count
            )));
        }

        let heights: Vec<f32> = bytes
            .chunks_exact(float_size)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Self::from_raw(heights, size as u32)
    }

    /// Write the samples in the format read by [`HeightField::load_raw`]
    pub fn save_raw(&self, path: &Path) -> Result<()> {
        let bytes: Vec<u8> = self
            .heights
            .iter()
            .flat_map(|h| h.to_le_bytes())
            .collect();
        std::fs::write(path, bytes)?;
        log::info!(
            "Saved {}x{} height field to {}",
            self.size(),
            self.size(),
            path.display()
        );
        Ok(())
    }

    /// Load a heightmap from a grayscale PNG file.
    /// Values are normalized to [0..1] regardless of bit depth.
    pub fn from_png(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|e| {
            RidgelineError::ImageError(format!(
                "Failed to load heightmap '{}': {}",
                path.display(),
                e
            ))
        })?;

        let gray = img.into_luma16();
        if gray.width() != gray.height() {
            return Err(RidgelineError::HeightmapFormat(format!(
                "'{}' is not square ({}x{})",
                path.display(),
                gray.width(),
                gray.height()
            )));
        }
        let size = gray.width();

        let heights: Vec<f32> = gray.pixels().map(|p| p.0[0] as f32 / 65535.0).collect();

        Self::from_raw(heights, size)
    }

    /// Number of samples along each side
    pub fn size(&self) -> u32 {
        self.heights.width() as u32
    }

    /// Height sample at integer grid coordinates
    pub fn get(&self, x: u32, z: u32) -> f32 {
        *self.heights.get(x as usize, z as usize)
    }

    pub fn set(&mut self, x: u32, z: u32, height: f32) {
        self.heights.set(x as usize, z as usize, height);
    }

    /// Bilinear sample at normalized coordinates (0..1, 0..1).
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let size = self.size();
        if size < 2 {
            return self.get(0, 0);
        }

        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);

        let fx = u * (size - 1) as f32;
        let fz = v * (size - 1) as f32;

        let x0 = (fx as u32).min(size - 2);
        let z0 = (fz as u32).min(size - 2);
        let x1 = x0 + 1;
        let z1 = z0 + 1;

        let tx = fx - x0 as f32;
        let tz = fz - z0 as f32;

        let h00 = self.get(x0, z0);
        let h10 = self.get(x1, z0);
        let h01 = self.get(x0, z1);
        let h11 = self.get(x1, z1);

        let h0 = h00 * (1.0 - tx) + h10 * tx;
        let h1 = h01 * (1.0 - tx) + h11 * tx;

        h0 * (1.0 - tz) + h1 * tz
    }

    /// Remap heights into `[min, max]`; a no-op on flat data
    pub fn normalize(&mut self, min: f32, max: f32) {
        self.heights.normalize(min, max);
    }

    /// Lowest and highest finite sample
    pub fn height_range(&self) -> Option<(f32, f32)> {
        self.heights.finite_range()
    }

    pub fn grid(&self) -> &Grid2<f32> {
        &self.heights
    }
}

fn validate_size(size: u32) -> Result<()> {
    if size < 2 || !(size - 1).is_power_of_two() {
        return Err(RidgelineError::HeightmapFormat(format!(
            "height field size minus one must be a power of two (size {})",
            size
        )));
    }
    Ok(())
}

fn integer_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}
