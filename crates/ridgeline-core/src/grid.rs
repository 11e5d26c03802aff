//! Dense row-major 2D storage

use crate::error::{Result, RidgelineError};

/// An owned, bounds-checked 2D array stored row by row (`z` selects the row).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2<T> {
    width: usize,
    depth: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid2<T> {
    /// Create a grid with every cell set to `fill`
    pub fn new(width: usize, depth: usize, fill: T) -> Self {
        Self {
            width,
            depth,
            data: vec![fill; width * depth],
        }
    }
}

impl<T> Grid2<T> {
    /// Wrap existing row-major data. Fails if the length does not match.
    pub fn from_vec(width: usize, depth: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * depth {
            return Err(RidgelineError::InvalidRange(format!(
                "grid {}x{} needs {} cells, got {}",
                width,
                depth,
                width * depth,
                data.len()
            )));
        }
        Ok(Self { width, depth, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Cell at column `x`, row `z`. Panics when out of range.
    pub fn get(&self, x: usize, z: usize) -> &T {
        &self.data[self.offset(x, z)]
    }

    pub fn get_mut(&mut self, x: usize, z: usize) -> &mut T {
        let i = self.offset(x, z);
        &mut self.data[i]
    }

    pub fn set(&mut self, x: usize, z: usize, value: T) {
        let i = self.offset(x, z);
        self.data[i] = value;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    fn offset(&self, x: usize, z: usize) -> usize {
        assert!(
            x < self.width && z < self.depth,
            "grid index ({}, {}) out of range for {}x{}",
            x,
            z,
            self.width,
            self.depth
        );
        z * self.width + x
    }
}

impl Grid2<f32> {
    /// Remap all finite samples linearly into `[min_range, max_range]`.
    ///
    /// Non-finite samples are ignored while scanning for the current range.
    /// When that range is within `f32::EPSILON` (constant data, or no finite
    /// data at all) the grid is left untouched.
    pub fn normalize(&mut self, min_range: f32, max_range: f32) {
        let (lo, hi) = match self.finite_range() {
            Some(range) => range,
            None => return,
        };

        let delta = hi - lo;
        if delta <= f32::EPSILON {
            return;
        }

        let range = max_range - min_range;
        for h in &mut self.data {
            if h.is_finite() {
                *h = (*h - lo) / delta * range + min_range;
            }
        }
    }

    /// Smallest and largest finite sample
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|h| h.is_finite())
            .fold(None, |acc, h| match acc {
                None => Some((h, h)),
                Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_layout() {
        let grid = Grid2::from_vec(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(*grid.get(0, 0), 0);
        assert_eq!(*grid.get(2, 0), 2);
        assert_eq!(*grid.get(0, 1), 3);
        assert_eq!(*grid.get(2, 1), 5);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        assert!(Grid2::from_vec(3, 3, vec![0.0f32; 8]).is_err());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_out_of_range_panics() {
        let grid = Grid2::new(2, 2, 0u8);
        grid.get(2, 0);
    }

    #[test]
    fn set_and_get_mut() {
        let mut grid = Grid2::new(2, 2, 0u32);
        grid.set(1, 1, 7);
        *grid.get_mut(0, 1) += 3;
        assert_eq!(grid.as_slice(), &[0, 0, 3, 7]);
    }

    #[test]
    fn normalize_remaps_range() {
        let mut grid = Grid2::from_vec(2, 2, vec![10.0, 20.0, 30.0, 50.0]).unwrap();
        grid.normalize(0.0, 1.0);
        let v = grid.as_slice();
        assert!((v[0] - 0.0).abs() < 1e-6);
        assert!((v[1] - 0.25).abs() < 1e-6);
        assert!((v[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_constant_is_noop() {
        let mut grid = Grid2::new(4, 4, 3.5f32);
        grid.normalize(0.0, 100.0);
        assert!(grid.iter().all(|&v| v == 3.5));
    }

    #[test]
    fn normalize_ignores_nan() {
        let mut grid = Grid2::from_vec(3, 1, vec![f32::NAN, 0.0, 2.0]).unwrap();
        grid.normalize(-1.0, 1.0);
        let v = grid.as_slice();
        assert!(v[0].is_nan());
        assert!((v[1] + 1.0).abs() < 1e-6);
        assert!((v[2] - 1.0).abs() < 1e-6);

        let mut all_nan = Grid2::new(2, 2, f32::NAN);
        all_nan.normalize(0.0, 1.0);
        assert!(all_nan.iter().all(|v| v.is_nan()));
    }
}
