//! Triangle-fan index generation for every LOD permutation of a patch
//!
//! A patch at core level `c` is split into square cells of `2^(c+1)` quads.
//! Each cell is an 8-triangle fan around its center vertex. On a patch edge
//! whose neighbour is one level coarser, the two fan triangles along that
//! edge collapse into one so the edge only uses every other vertex, matching
//! the neighbour exactly and leaving no T-junction.
//!
//! Indices are relative to the patch's bottom-left vertex but use the full
//! grid row stride, so one region serves every patch via a base-vertex offset.

use crate::lod_table::{IndexRange, LodKey, LodTable};

/// Levels used for the four sides of a single fan cell
#[derive(Clone, Copy, Debug)]
struct CellLods {
    core: u32,
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
}

/// Builds the shared index buffer for a grid `width` vertices wide
pub struct FanIndexGenerator {
    width: u32,
    patch_size: u32,
}

impl FanIndexGenerator {
    pub fn new(width: u32, patch_size: u32) -> Self {
        Self { width, patch_size }
    }

    /// Generate every permutation for levels `0..=max_lod`, returning the
    /// index buffer and the region of each permutation within it.
    pub fn generate(&self, max_lod: u32) -> (Vec<u32>, LodTable) {
        let capacity: u32 = (0..=max_lod)
            .flat_map(|lod| LodKey::all().map(move |key| (lod, key)))
            .map(|(lod, key)| fan_index_count(self.patch_size, lod, key))
            .sum();

        let mut indices = Vec::with_capacity(capacity as usize);
        let mut table = LodTable::with_levels(max_lod as usize + 1);

        for lod in 0..=max_lod {
            for key in LodKey::all() {
                let start = indices.len() as u32;
                self.push_permutation(&mut indices, lod, key);
                let count = indices.len() as u32 - start;

                debug_assert_eq!(count, fan_index_count(self.patch_size, lod, key));
                table.set(lod, key, IndexRange { start, count });
            }
            log::debug!(
                "Total indices for LOD {}: {}",
                lod,
                table.level_index_count(lod)
            );
        }

        debug_assert_eq!(indices.len(), capacity as usize);
        log::debug!("Final number of indices {}", indices.len());

        (indices, table)
    }

    fn push_permutation(&self, out: &mut Vec<u32>, core: u32, key: LodKey) {
        let fan_step = 1 << (core + 1);
        let end_pos = self.patch_size - 1 - fan_step;

        let side = |flag: bool| core + flag as u32;

        for z in (0..=end_pos).step_by(fan_step as usize) {
            for x in (0..=end_pos).step_by(fan_step as usize) {
                let lods = CellLods {
                    core,
                    left: if x == 0 { side(key.left()) } else { core },
                    right: if x == end_pos { side(key.right()) } else { core },
                    bottom: if z == 0 { side(key.bottom()) } else { core },
                    top: if z == end_pos { side(key.top()) } else { core },
                };
                self.push_fan(out, lods, x, z);
            }
        }
    }

    /// Fan around the cell center, walking the left side up (+z), the top
    /// side right (+x), the right side down and the bottom side back left.
    fn push_fan(&self, out: &mut Vec<u32>, lods: CellLods, x: u32, z: u32) {
        let w = self.width;
        let step_left = 1 << lods.left;
        let step_right = 1 << lods.right;
        let step_top = 1 << lods.top;
        let step_bottom = 1 << lods.bottom;
        let step_center = 1 << lods.core;

        let center = (z + step_center) * w + x + step_center;
        let mut tri = |a: u32, b: u32| out.extend_from_slice(&[center, a, b]);

        // left side
        let mut prev = z * w + x;
        let mut next = prev + step_left * w;
        tri(prev, next);
        if lods.left == lods.core {
            prev = next;
            next += step_left * w;
            tri(prev, next);
        }

        // top side
        prev = next;
        next += step_top;
        tri(prev, next);
        if lods.top == lods.core {
            prev = next;
            next += step_top;
            tri(prev, next);
        }

        // right side
        prev = next;
        next -= step_right * w;
        tri(prev, next);
        if lods.right == lods.core {
            prev = next;
            next -= step_right * w;
            tri(prev, next);
        }

        // bottom side
        prev = next;
        next -= step_bottom;
        tri(prev, next);
        if lods.bottom == lods.core {
            prev = next;
            next -= step_bottom;
            tri(prev, next);
        }

        debug_assert_eq!(next, z * w + x, "fan did not close");
    }
}

/// Exact number of indices the generator writes for one permutation:
/// 8 triangles per cell, minus one per degraded cell side.
pub fn fan_index_count(patch_size: u32, core: u32, key: LodKey) -> u32 {
    let cells_per_side = (patch_size - 1) >> (core + 1);
    let triangles = 8 * cells_per_side * cells_per_side - cells_per_side * key.count_set();
    triangles * 3
}
