//! Fractal heightfield generation by midpoint displacement (diamond-square)

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use ridgeline_core::{Result, RidgelineError};

use crate::heightfield::HeightField;

/// Parameters for [`midpoint_displacement`]
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MidpointParams {
    /// Samples per side; `size - 1` must be a power of two
    pub size: u32,
    /// Higher values flatten the fine detail faster
    pub roughness: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub seed: u64,
}

impl Default for MidpointParams {
    fn default() -> Self {
        Self {
            size: 513,
            roughness: 1.0,
            min_height: 0.0,
            max_height: 256.0,
            seed: 7,
        }
    }
}

/// Generate a heightfield, normalized into `[min_height, max_height]`.
pub fn midpoint_displacement(params: &MidpointParams) -> Result<HeightField> {
    if !(params.min_height < params.max_height) {
        return Err(RidgelineError::InvalidRange(format!(
            "min height {} must be below max height {}",
            params.min_height, params.max_height
        )));
    }
    if !params.roughness.is_finite() || params.roughness < 0.0 {
        return Err(RidgelineError::InvalidRange(format!(
            "roughness must be a non-negative number (got {})",
            params.roughness
        )));
    }

    let size = params.size;
    let mut field = HeightField::flat(size, 0.0)?;
    let mut rng = StdRng::seed_from_u64(params.seed);

    let mut rect_size = size - 1;
    let mut cur_height = rect_size as f32 / 2.0;
    let height_reduce = 2f32.powf(-params.roughness);

    let last = size - 1;
    for (x, z) in [(0, 0), (last, 0), (0, last), (last, last)] {
        field.set(x, z, rng.gen_range(-cur_height..=cur_height));
    }

    while rect_size >= 2 {
        diamond_step(&mut field, &mut rng, rect_size, cur_height);
        square_step(&mut field, &mut rng, rect_size, cur_height);

        rect_size /= 2;
        cur_height *= height_reduce;
    }

    field.normalize(params.min_height, params.max_height);

    log::debug!(
        "Generated {}x{} midpoint displacement terrain (roughness {}, seed {})",
        size,
        size,
        params.roughness,
        params.seed
    );

    Ok(field)
}

/// Set the center of every `rect_size` square to its corner average plus noise
fn diamond_step(field: &mut HeightField, rng: &mut StdRng, rect_size: u32, cur_height: f32) {
    let half = rect_size / 2;
    let size = field.size();

    for z in (0..size - 1).step_by(rect_size as usize) {
        for x in (0..size - 1).step_by(rect_size as usize) {
            let average = (field.get(x, z)
                + field.get(x + rect_size, z)
                + field.get(x, z + rect_size)
                + field.get(x + rect_size, z + rect_size))
                / 4.0;

            let offset = rng.gen_range(-cur_height..=cur_height);
            field.set(x + half, z + half, average + offset);
        }
    }
}

/// Set every edge midpoint to the average of its in-bounds neighbours plus noise
fn square_step(field: &mut HeightField, rng: &mut StdRng, rect_size: u32, cur_height: f32) {
    let half = rect_size / 2;
    let size = field.size();

    for z in (0..size).step_by(half as usize) {
        let start = if (z / half) % 2 == 0 { half } else { 0 };
        for x in (start..size).step_by(rect_size as usize) {
            let mut sum = 0.0;
            let mut count = 0.0;

            if x >= half {
                sum += field.get(x - half, z);
                count += 1.0;
            }
            if x + half < size {
                sum += field.get(x + half, z);
                count += 1.0;
            }
            if z >= half {
                sum += field.get(x, z - half);
                count += 1.0;
            }
            if z + half < size {
                sum += field.get(x, z + half);
                count += 1.0;
            }

            let offset = rng.gen_range(-cur_height..=cur_height);
            field.set(x, z, sum / count + offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(seed: u64) -> MidpointParams {
        MidpointParams {
            size: 33,
            roughness: 1.0,
            min_height: 10.0,
            max_height: 60.0,
            seed,
        }
    }

    #[test]
    fn output_stays_in_range() {
        let field = midpoint_displacement(&params(3)).unwrap();
        let (lo, hi) = field.height_range().unwrap();
        assert!((lo - 10.0).abs() < 1e-3);
        assert!((hi - 60.0).abs() < 1e-3);
        assert!(field.grid().iter().all(|h| h.is_finite()));
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = midpoint_displacement(&params(11)).unwrap();
        let b = midpoint_displacement(&params(11)).unwrap();
        assert_eq!(a.grid().as_slice(), b.grid().as_slice());

        let c = midpoint_displacement(&params(12)).unwrap();
        assert_ne!(a.grid().as_slice(), c.grid().as_slice());
    }

    #[test]
    fn rejects_inverted_range() {
        let mut p = params(1);
        p.min_height = 5.0;
        p.max_height = 5.0;
        assert!(midpoint_displacement(&p).is_err());
    }

    #[test]
    fn rejects_bad_size() {
        let mut p = params(1);
        p.size = 30;
        assert!(midpoint_displacement(&p).is_err());
    }
}
