//! Exclusive, write-back L1/L2 hierarchy.
//!
//! A block lives in at most one of the two levels. Reads promote a block into
//! L1 (pulling it out of L2 if it was there) and push whatever L1 displaces
//! down into L2; a dirty block leaving L2 is written back to memory. Writes
//! never allocate: they dirty an existing copy or go straight to memory.

use std::fmt;

use tracing::{debug, trace};

use crate::cache::Cache;
use crate::config::Geometry;
use crate::memory_access::{MemoryAccess, Op};

/// Per-level outcome, with the numeric codes used in the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AccessState {
    NoAction = 0,
    ReadHit = 1,
    ReadMiss = 2,
    WriteHit = 3,
    WriteMiss = 4,
    NoWriteMem = 5,
    WriteMem = 6,
}

impl AccessState {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessResult {
    pub l1: AccessState,
    pub l2: AccessState,
    pub mem: AccessState,
}

impl AccessResult {
    const fn new(l1: AccessState, l2: AccessState, mem: AccessState) -> Self {
        AccessResult { l1, l2, mem }
    }
}

impl fmt::Display for AccessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.l1, self.l2, self.mem)
    }
}

#[derive(Debug, Clone)]
pub struct CacheSystem {
    l1: Cache,
    l2: Cache,
}

impl CacheSystem {
    pub fn new(l1: Geometry, l2: Geometry) -> Self {
        CacheSystem {
            l1: Cache::new(l1),
            l2: Cache::new(l2),
        }
    }

    pub fn l1(&self) -> &Cache {
        &self.l1
    }

    pub fn l2(&self) -> &Cache {
        &self.l2
    }

    pub fn access(&mut self, access: &MemoryAccess) -> AccessResult {
        let res = match access.op {
            Op::Read => self.read(access.address),
            Op::Write => self.write(access.address),
        };
        trace!(%access, %res, "access");
        res
    }

    pub fn read(&mut self, addr: u32) -> AccessResult {
        use AccessState::*;

        if self.l1.read_access(addr).0 {
            return AccessResult::new(ReadHit, NoAction, NoWriteMem);
        }

        let (l2_hit, dirty) = self.l2.read_access(addr);
        let mut res = if l2_hit {
            // The block moves up; L2 must not keep a second copy.
            self.l2.invalidate(addr);
            AccessResult::new(ReadMiss, ReadHit, NoWriteMem)
        } else {
            AccessResult::new(ReadMiss, ReadMiss, NoWriteMem)
        };

        // L2 never holds L1's victim, so this install cannot duplicate it.
        let Some(victim) = self.l1.evict_and_install(addr, dirty) else {
            return res;
        };
        debug!(
            dirty = victim.dirty,
            "L1 victim 0x{:08x} moved to L2",
            victim.address
        );
        if let Some(spilled) = self.l2.evict_and_install(victim.address, victim.dirty) {
            if spilled.dirty {
                debug!("L2 victim 0x{:08x} written back", spilled.address);
                res.mem = WriteMem;
            }
        }
        res
    }

    pub fn write(&mut self, addr: u32) -> AccessResult {
        use AccessState::*;

        if self.l1.write_access(addr).0 {
            AccessResult::new(WriteHit, NoAction, NoWriteMem)
        } else if self.l2.write_access(addr).0 {
            AccessResult::new(WriteMiss, WriteHit, NoWriteMem)
        } else {
            AccessResult::new(WriteMiss, WriteMiss, WriteMem)
        }
    }
}
