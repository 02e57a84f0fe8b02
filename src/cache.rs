use crate::config::Geometry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Block {
    tag: u32,
    valid: bool,
    dirty: bool,
}

/// A block pushed out of a full set to make room for an install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Victim {
    pub tag: u32,
    pub dirty: bool,
}

/// A displaced block, located by its block-aligned address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evicted {
    pub address: u32,
    pub dirty: bool,
}

#[derive(Debug, Clone)]
pub struct CacheSet {
    blocks: Vec<Block>,
    // Round-robin replacement cursor. Hits never move it.
    next_victim: usize,
}

impl CacheSet {
    pub fn new(associativity: usize) -> Self {
        CacheSet {
            blocks: vec![Block::default(); associativity],
            next_victim: 0,
        }
    }

    /// Returns `(hit, dirty)`. A write hit leaves the block dirty.
    pub fn contains(&mut self, tag: u32, is_write: bool) -> (bool, bool) {
        match self.blocks.iter_mut().find(|b| b.valid && b.tag == tag) {
            Some(block) => {
                block.dirty |= is_write;
                (true, block.dirty)
            }
            None => (false, false),
        }
    }

    pub fn probe(&self, tag: u32) -> bool {
        self.blocks.iter().any(|b| b.valid && b.tag == tag)
    }

    pub fn invalidate(&mut self, tag: u32) {
        if let Some(block) = self.blocks.iter_mut().find(|b| b.valid && b.tag == tag) {
            block.valid = false;
        }
    }

    /// Fills the first empty slot, or overwrites the slot under the cursor
    /// and hands back what was there.
    pub fn install(&mut self, tag: u32, dirty: bool) -> Option<Victim> {
        let incoming = Block {
            tag,
            valid: true,
            dirty,
        };
        if let Some(free) = self.blocks.iter_mut().find(|b| !b.valid) {
            *free = incoming;
            return None;
        }

        let slot = self.next_victim;
        self.next_victim = (self.next_victim + 1) % self.blocks.len();
        let old = std::mem::replace(&mut self.blocks[slot], incoming);
        Some(Victim {
            tag: old.tag,
            dirty: old.dirty,
        })
    }
}

/// One level of the hierarchy, addressed by 32-bit byte addresses.
#[derive(Debug, Clone)]
pub struct Cache {
    geometry: Geometry,
    sets: Vec<CacheSet>,
}

impl Cache {
    pub fn new(geometry: Geometry) -> Self {
        let sets = (0..geometry.num_sets())
            .map(|_| CacheSet::new(geometry.ways() as usize))
            .collect();
        Cache { geometry, sets }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Splits `addr` into `(tag, set index)`, discarding the block offset.
    pub fn decompose(&self, addr: u32) -> (u32, usize) {
        let offset_bits = self.geometry.offset_bits();
        let index_mask = self.geometry.num_sets() - 1;
        let set_index = addr.checked_shr(offset_bits).unwrap_or(0) & index_mask;
        // A 32-bit shift happens when offset and index use the whole address.
        let tag = addr
            .checked_shr(offset_bits + self.geometry.index_bits())
            .unwrap_or(0);
        (tag, set_index as usize)
    }

    /// Inverse of [`Cache::decompose`] with a zero offset.
    pub fn block_address(&self, tag: u32, set_index: usize) -> u32 {
        let index_bits = self.geometry.index_bits();
        let upper = ((tag as u64) << index_bits) | set_index as u64;
        (upper << self.geometry.offset_bits()) as u32
    }

    fn access(&mut self, addr: u32, is_write: bool) -> (bool, bool) {
        let (tag, index) = self.decompose(addr);
        self.sets[index].contains(tag, is_write)
    }

    pub fn read_access(&mut self, addr: u32) -> (bool, bool) {
        self.access(addr, false)
    }

    pub fn write_access(&mut self, addr: u32) -> (bool, bool) {
        self.access(addr, true)
    }

    /// Lookup without touching any dirty bit.
    pub fn probe(&self, addr: u32) -> bool {
        let (tag, index) = self.decompose(addr);
        self.sets[index].probe(tag)
    }

    pub fn invalidate(&mut self, addr: u32) {
        let (tag, index) = self.decompose(addr);
        self.sets[index].invalidate(tag);
    }

    /// Installs the block holding `addr`, returning the block it displaced.
    ///
    /// The block must not already be resident; installing it twice would
    /// leave two valid copies of one tag in the set.
    pub fn evict_and_install(&mut self, addr: u32, dirty: bool) -> Option<Evicted> {
        debug_assert!(
            !self.probe(addr),
            "block 0x{addr:08x} installed while already resident"
        );
        let (tag, index) = self.decompose(addr);
        self.sets[index].install(tag, dirty).map(|victim| Evicted {
            address: self.block_address(victim.tag, index),
            dirty: victim.dirty,
        })
    }
}
