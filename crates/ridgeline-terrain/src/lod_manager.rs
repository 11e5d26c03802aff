//! Per-patch level-of-detail selection from camera distance

use glam::Vec3;
use ridgeline_core::{Grid2, Result, RidgelineError};

use crate::lod_table::LodKey;

/// Default far distance covered by the LOD bands
pub const Z_FAR: f32 = 5000.0;

/// LOD state of one patch for the current frame.
///
/// `core` is the patch's own detail level (0 = finest). Each side flag is set
/// when the neighbour across that edge has a coarser core level, in which
/// case the edge is drawn at the neighbour's vertex density.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchLod {
    pub core: u32,
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl PatchLod {
    /// Pack the four side flags into an index-table key
    pub fn key(&self) -> LodKey {
        LodKey::new(self.left, self.right, self.top, self.bottom)
    }
}

/// Maximum LOD level supported by a patch of `patch_size` vertices per edge.
///
/// `patch_size - 1` must be a power of two of at least 2.
pub fn max_lod_for_patch_size(patch_size: u32) -> Result<u32> {
    let segments = patch_size.saturating_sub(1);
    if segments < 2 || !segments.is_power_of_two() {
        return Err(RidgelineError::InvalidPatchSize(patch_size));
    }
    Ok(segments.trailing_zeros() - 1)
}

/// Translates camera distance into boundary-consistent LOD selections for a
/// grid of patches.
pub struct LodManager {
    max_lod: u32,
    patch_size: u32,
    num_patches_x: u32,
    num_patches_z: u32,
    world_scale: f32,
    z_far: f32,
    map: Grid2<PatchLod>,
    /// Upper distance bound of each LOD band, ascending
    regions: Vec<f32>,
}

impl LodManager {
    /// Create a manager covering `[0, Z_FAR]`
    pub fn new(
        patch_size: u32,
        num_patches_x: u32,
        num_patches_z: u32,
        world_scale: f32,
    ) -> Result<Self> {
        Self::with_z_far(patch_size, num_patches_x, num_patches_z, world_scale, Z_FAR)
    }

    pub fn with_z_far(
        patch_size: u32,
        num_patches_x: u32,
        num_patches_z: u32,
        world_scale: f32,
        z_far: f32,
    ) -> Result<Self> {
        let max_lod = max_lod_for_patch_size(patch_size)?;
        if !(z_far > 0.0) {
            return Err(RidgelineError::InvalidRange(format!(
                "far distance must be positive (got {})",
                z_far
            )));
        }

        log::debug!(
            "log2 of patch size {} is {}, max LOD {}",
            patch_size,
            max_lod + 1,
            max_lod
        );

        let map = Grid2::new(
            num_patches_x as usize,
            num_patches_z as usize,
            PatchLod::default(),
        );
        let regions = lod_regions(max_lod, z_far);

        for (i, bound) in regions.iter().enumerate() {
            log::debug!("LOD band {}: up to {:.1}", i, bound);
        }

        Ok(Self {
            max_lod,
            patch_size,
            num_patches_x,
            num_patches_z,
            world_scale,
            z_far,
            map,
            regions,
        })
    }

    pub fn max_lod(&self) -> u32 {
        self.max_lod
    }

    pub fn num_patches(&self) -> (u32, u32) {
        (self.num_patches_x, self.num_patches_z)
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    /// Upper distance bound of each LOD band
    pub fn regions(&self) -> &[f32] {
        &self.regions
    }

    /// Recompute every patch's LOD for a new camera position
    pub fn update(&mut self, camera_pos: Vec3) {
        self.update_core_lods(camera_pos);
        self.limit_neighbour_steps();
        self.update_boundary_flags();
    }

    /// LOD state of a patch as of the last `update`. Panics when out of range.
    pub fn patch_lod(&self, patch_x: u32, patch_z: u32) -> &PatchLod {
        self.map.get(patch_x as usize, patch_z as usize)
    }

    /// Smallest band whose upper bound exceeds `distance`, or the coarsest
    /// level when the distance is beyond every band
    pub fn distance_to_lod(&self, distance: f32) -> u32 {
        self.regions
            .iter()
            .position(|&bound| distance < bound)
            .map(|i| i as u32)
            .unwrap_or(self.max_lod)
    }

    /// World-space center of a patch on the `y = 0` plane
    pub fn patch_center(&self, patch_x: u32, patch_z: u32) -> Vec3 {
        let center_step = self.patch_size / 2;
        let x = patch_x * (self.patch_size - 1) + center_step;
        let z = patch_z * (self.patch_size - 1) + center_step;
        Vec3::new(x as f32 * self.world_scale, 0.0, z as f32 * self.world_scale)
    }

    /// Core levels as text, highest row first
    pub fn lod_map_string(&self) -> String {
        let mut out = String::new();
        for z in (0..self.num_patches_z).rev() {
            out.push_str(&format!("{}:", z));
            for x in 0..self.num_patches_x {
                out.push_str(&format!(" {}", self.patch_lod(x, z).core));
            }
            out.push('\n');
        }
        out
    }

    fn update_core_lods(&mut self, camera_pos: Vec3) {
        for z in 0..self.num_patches_z {
            for x in 0..self.num_patches_x {
                let distance = camera_pos.distance(self.patch_center(x, z));
                let core = self.distance_to_lod(distance);
                self.map.get_mut(x as usize, z as usize).core = core;
            }
        }
    }

    /// Refine cores until no two edge neighbours are more than one level
    /// apart. A degraded side can only stitch to the next coarser level, so
    /// wide patch spacing against narrow bands would otherwise leave
    /// T-junctions. Cores only ever decrease, so this terminates.
    fn limit_neighbour_steps(&mut self) {
        let (nx, nz) = (self.num_patches_x as usize, self.num_patches_z as usize);

        let mut changed = true;
        while changed {
            changed = false;
            for z in 0..nz {
                for x in 0..nx {
                    let core = self.map.get(x, z).core;
                    let mut limit = core;
                    if x > 0 {
                        limit = limit.min(self.map.get(x - 1, z).core + 1);
                    }
                    if x + 1 < nx {
                        limit = limit.min(self.map.get(x + 1, z).core + 1);
                    }
                    if z > 0 {
                        limit = limit.min(self.map.get(x, z - 1).core + 1);
                    }
                    if z + 1 < nz {
                        limit = limit.min(self.map.get(x, z + 1).core + 1);
                    }

                    if limit < core {
                        self.map.get_mut(x, z).core = limit;
                        changed = true;
                    }
                }
            }
        }
    }

    // Must run after every core level is final: each flag reads a neighbour.
    fn update_boundary_flags(&mut self) {
        let (nx, nz) = (self.num_patches_x as usize, self.num_patches_z as usize);

        for z in 0..nz {
            for x in 0..nx {
                let core = self.map.get(x, z).core;
                let coarser = |cx: usize, cz: usize| self.map.get(cx, cz).core > core;

                let left = x > 0 && coarser(x - 1, z);
                let right = x + 1 < nx && coarser(x + 1, z);
                let bottom = z > 0 && coarser(x, z - 1);
                let top = z + 1 < nz && coarser(x, z + 1);

                let lod = self.map.get_mut(x, z);
                lod.left = left;
                lod.right = right;
                lod.bottom = bottom;
                lod.top = top;
            }
        }
    }
}

/// Cumulative band bounds: band `i` is `(i + 1)` parts of `z_far` split into
/// `Σ(j + 1)` parts, so coarser bands cover wider distance ranges.
fn lod_regions(max_lod: u32, z_far: f32) -> Vec<f32> {
    let parts: u32 = (0..=max_lod).map(|i| i + 1).sum();
    let part = z_far / parts as f32;

    let mut regions = Vec::with_capacity(max_lod as usize + 1);
    let mut covered = 0u32;
    for i in 0..=max_lod {
        covered += i + 1;
        regions.push(if covered == parts {
            z_far
        } else {
            part * covered as f32
        });
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_lod_from_patch_size() {
        assert_eq!(max_lod_for_patch_size(3).unwrap(), 0);
        assert_eq!(max_lod_for_patch_size(5).unwrap(), 1);
        assert_eq!(max_lod_for_patch_size(9).unwrap(), 2);
        assert_eq!(max_lod_for_patch_size(33).unwrap(), 4);
        assert!(max_lod_for_patch_size(2).is_err());
        assert!(max_lod_for_patch_size(7).is_err());
        assert!(max_lod_for_patch_size(0).is_err());
    }

    #[test]
    fn init_patch_size_nine() {
        let manager = LodManager::new(9, 4, 4, 1.0).unwrap();
        assert_eq!(manager.max_lod(), 2);
        assert_eq!(manager.regions().len(), 3);
        assert_eq!(*manager.patch_lod(3, 3), PatchLod::default());
    }

    #[test]
    fn invalid_patch_size_is_configuration_error() {
        let err = LodManager::new(10, 2, 2, 1.0).err().unwrap();
        assert!(matches!(err, RidgelineError::InvalidPatchSize(10)));
        assert!(err.is_configuration());
    }

    #[test]
    fn regions_widen_and_cover_z_far() {
        let manager = LodManager::new(33, 1, 1, 1.0).unwrap();
        let regions = manager.regions();
        assert_eq!(regions.len(), 5);

        // 1 + 2 + 3 + 4 + 5 = 15 parts
        let part = Z_FAR / 15.0;
        assert!((regions[0] - part).abs() < 1e-2);
        assert!((regions[1] - 3.0 * part).abs() < 1e-2);
        assert_eq!(*regions.last().unwrap(), Z_FAR);

        let mut previous_bound = 0.0;
        let mut previous_width = 0.0;
        for &bound in regions {
            let width = bound - previous_bound;
            assert!(width > previous_width);
            previous_width = width;
            previous_bound = bound;
        }
    }

    #[test]
    fn distance_to_lod_is_monotonic() {
        let manager = LodManager::new(17, 1, 1, 1.0).unwrap();
        let mut previous = 0;
        let mut d = 0.0;
        while d < Z_FAR * 1.5 {
            let lod = manager.distance_to_lod(d);
            assert!(lod >= previous, "lod dropped at distance {}", d);
            previous = lod;
            d += 7.3;
        }
        assert_eq!(manager.distance_to_lod(0.0), 0);
        assert_eq!(manager.distance_to_lod(Z_FAR), manager.max_lod());
        assert_eq!(manager.distance_to_lod(f32::MAX), manager.max_lod());
    }

    #[test]
    fn regions_have_no_gaps() {
        let manager = LodManager::new(17, 1, 1, 1.0).unwrap();
        for (i, &bound) in manager.regions().iter().enumerate() {
            // just below a bound belongs to that band, the bound itself to the next
            assert_eq!(manager.distance_to_lod(bound - 0.01), i as u32);
            let next = (i as u32 + 1).min(manager.max_lod());
            assert_eq!(manager.distance_to_lod(bound), next);
        }
    }

    #[test]
    fn camera_at_patch_center_is_finest() {
        let mut manager = LodManager::new(9, 4, 4, 1.0).unwrap();
        let center = manager.patch_center(0, 0);
        assert_eq!(center, Vec3::new(4.0, 0.0, 4.0));

        manager.update(center);
        assert_eq!(manager.patch_lod(0, 0).core, 0);

        // far beyond every band
        manager.update(Vec3::new(0.0, Z_FAR * 2.0, 0.0));
        for z in 0..4 {
            for x in 0..4 {
                assert_eq!(manager.patch_lod(x, z).core, manager.max_lod());
            }
        }
    }

    #[test]
    fn distant_patch_is_coarsest() {
        // a short far distance so the row of patches spans every band
        let mut manager = LodManager::with_z_far(9, 64, 1, 4.0, 300.0).unwrap();
        manager.update(manager.patch_center(0, 0));
        assert_eq!(manager.patch_lod(0, 0).core, 0);
        assert_eq!(manager.patch_lod(63, 0).core, manager.max_lod());
    }

    #[test]
    fn flags_mark_coarser_neighbours() {
        let mut manager = LodManager::new(9, 3, 3, 1.0).unwrap();
        for z in 0..3 {
            for x in 0..3 {
                manager.map.get_mut(x, z).core = if (x, z) == (1, 1) { 0 } else { 1 };
            }
        }
        manager.update_boundary_flags();

        let center = manager.patch_lod(1, 1);
        assert!(center.left && center.right && center.top && center.bottom);

        // neighbours are coarser than the center, never flagged towards it,
        // and corner patches only touch equal-level neighbours
        for z in 0..3 {
            for x in 0..3 {
                if (x, z) == (1, 1) {
                    continue;
                }
                assert_eq!(manager.patch_lod(x, z).key(), LodKey::NONE);
            }
        }
    }

    #[test]
    fn flags_ignore_finer_neighbours_and_grid_edges() {
        let mut manager = LodManager::new(9, 2, 1, 1.0).unwrap();
        manager.map.get_mut(0, 0).core = 1;
        manager.map.get_mut(1, 0).core = 0;
        manager.update_boundary_flags();

        assert_eq!(manager.patch_lod(0, 0).key(), LodKey::NONE);
        let fine = manager.patch_lod(1, 0);
        assert!(fine.left);
        assert!(!fine.right && !fine.top && !fine.bottom);
    }

    /// Largest core difference between any two edge neighbours
    fn max_neighbour_step(manager: &LodManager) -> u32 {
        let (nx, nz) = manager.num_patches();
        let mut step = 0;
        for z in 0..nz {
            for x in 0..nx {
                let core = manager.patch_lod(x, z).core;
                if x + 1 < nx {
                    step = step.max(core.abs_diff(manager.patch_lod(x + 1, z).core));
                }
                if z + 1 < nz {
                    step = step.max(core.abs_diff(manager.patch_lod(x, z + 1).core));
                }
            }
        }
        step
    }

    #[test]
    fn wide_patches_never_skip_a_level() {
        // 64 world units between patch centers against a 20 unit first band:
        // raw distances put row 0 at 0 2 3 3 ...
        let mut manager = LodManager::with_z_far(17, 8, 8, 4.0, 200.0).unwrap();
        manager.update(Vec3::new(32.0, 0.0, 32.0));

        assert_eq!(max_neighbour_step(&manager), 1);
        let row: Vec<u32> = (0..5).map(|x| manager.patch_lod(x, 0).core).collect();
        assert_eq!(row, vec![0, 1, 2, 3, 3]);
        assert_eq!(manager.patch_lod(7, 7).core, manager.max_lod());

        // every flag now marks a neighbour exactly one level coarser
        let lod = manager.patch_lod(1, 0);
        assert!(lod.right && !lod.left);
    }

    #[test]
    fn refinement_spreads_across_the_grid() {
        let mut manager = LodManager::new(9, 5, 1, 1.0).unwrap();
        manager.map.get_mut(0, 0).core = 0;
        for x in 1..5 {
            manager.map.get_mut(x, 0).core = 2;
        }
        manager.limit_neighbour_steps();
        let row: Vec<u32> = (0..5).map(|x| manager.patch_lod(x, 0).core).collect();
        assert_eq!(row, vec![0, 1, 2, 2, 2]);
    }

    #[test]
    fn lod_map_prints_top_row_first() {
        let mut manager = LodManager::new(5, 2, 2, 1.0).unwrap();
        manager.map.get_mut(1, 1).core = 1;
        assert_eq!(manager.lod_map_string(), "1: 0 1\n0: 0 0\n");
    }
}
