//! Lookup of precomputed index-buffer regions by core LOD and side flags

/// Four independent "neighbour is coarser" flags packed into the low four
/// bits: bit 0 left, bit 1 right, bit 2 top, bit 3 bottom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LodKey(u8);

impl LodKey {
    pub const NONE: Self = Self(0);
    /// Number of distinct side-flag combinations per LOD level
    pub const COUNT: usize = 16;

    const LEFT: u8 = 1 << 0;
    const RIGHT: u8 = 1 << 1;
    const TOP: u8 = 1 << 2;
    const BOTTOM: u8 = 1 << 3;

    pub fn new(left: bool, right: bool, top: bool, bottom: bool) -> Self {
        let mut bits = 0;
        if left {
            bits |= Self::LEFT;
        }
        if right {
            bits |= Self::RIGHT;
        }
        if top {
            bits |= Self::TOP;
        }
        if bottom {
            bits |= Self::BOTTOM;
        }
        Self(bits)
    }

    /// Key from its packed index (`0..16`)
    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < Self::COUNT);
        Self(index as u8 & 0x0f)
    }

    /// Every key in table order
    pub fn all() -> impl Iterator<Item = LodKey> {
        (0..Self::COUNT).map(Self::from_index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn left(self) -> bool {
        self.0 & Self::LEFT != 0
    }

    pub fn right(self) -> bool {
        self.0 & Self::RIGHT != 0
    }

    pub fn top(self) -> bool {
        self.0 & Self::TOP != 0
    }

    pub fn bottom(self) -> bool {
        self.0 & Self::BOTTOM != 0
    }

    /// Number of degraded sides
    pub fn count_set(self) -> u32 {
        self.0.count_ones()
    }
}

/// A contiguous run of the shared index buffer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexRange {
    pub start: u32,
    pub count: u32,
}

impl IndexRange {
    pub fn end(&self) -> u32 {
        self.start + self.count
    }

    pub fn as_range(&self) -> std::ops::Range<u32> {
        self.start..self.end()
    }
}

/// Index regions for every core level × 16 side-flag combinations
#[derive(Clone, Debug, Default)]
pub struct LodTable {
    levels: Vec<[IndexRange; LodKey::COUNT]>,
}

impl LodTable {
    pub fn with_levels(num_levels: usize) -> Self {
        Self {
            levels: vec![[IndexRange::default(); LodKey::COUNT]; num_levels],
        }
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn range(&self, core: u32, key: LodKey) -> IndexRange {
        self.levels[core as usize][key.index()]
    }

    pub fn set(&mut self, core: u32, key: LodKey, range: IndexRange) {
        self.levels[core as usize][key.index()] = range;
    }

    /// Total indices stored for one core level
    pub fn level_index_count(&self, core: u32) -> u32 {
        self.levels[core as usize].iter().map(|r| r.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_packs_each_side_independently() {
        let key = LodKey::new(true, false, true, false);
        assert!(key.left() && key.top());
        assert!(!key.right() && !key.bottom());
        assert_eq!(key.index(), 0b0101);
        assert_eq!(key.count_set(), 2);
        assert_eq!(LodKey::new(true, true, true, true).index(), 15);
    }

    #[test]
    fn all_keys_are_distinct() {
        let keys: Vec<_> = LodKey::all().collect();
        assert_eq!(keys.len(), 16);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(key.index(), i);
            assert_eq!(
                LodKey::new(key.left(), key.right(), key.top(), key.bottom()),
                *key
            );
        }
    }

    #[test]
    fn table_lookup() {
        let mut table = LodTable::with_levels(2);
        let key = LodKey::new(false, true, false, true);
        table.set(1, key, IndexRange { start: 30, count: 12 });
        assert_eq!(table.range(1, key).as_range(), 30..42);
        assert_eq!(table.range(0, key), IndexRange::default());
        assert_eq!(table.level_index_count(1), 12);
    }
}
