use std::fs;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ConfigError, GeometryError};

/// A `L1:`/`L2:` label followed by block size, associativity and size in KB.
static LEVEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(L[12]):\s*(\S+)\s+(\S+)\s+(\S+)").expect("failed to compile regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `n` blocks per set.
    Ways(u32),
    /// A single set holding every block of the cache.
    Full,
}

impl From<u32> for Associativity {
    /// The config file spells fully-associative as `0`.
    fn from(ways: u32) -> Self {
        match ways {
            0 => Associativity::Full,
            n => Associativity::Ways(n),
        }
    }
}

/// Validated shape of one cache level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    block_size: u32, // in bytes
    num_sets: u32,
    ways: u32,
}

impl Geometry {
    pub fn new(
        block_size: u32,
        associativity: Associativity,
        size_bytes: u64,
    ) -> Result<Self, GeometryError> {
        if !block_size.is_power_of_two() {
            return Err(GeometryError::BlockSize(block_size));
        }
        let block = u64::from(block_size);
        let ways = match associativity {
            Associativity::Ways(0) => return Err(GeometryError::NoWays),
            Associativity::Ways(n) => u64::from(n),
            Associativity::Full => size_bytes / block,
        };
        let set_bytes = block * ways;
        if ways == 0 || size_bytes % set_bytes != 0 || ways > u64::from(u32::MAX) {
            return Err(GeometryError::Capacity {
                size: size_bytes,
                block_size,
                ways,
            });
        }
        let num_sets = size_bytes / set_bytes;
        if !num_sets.is_power_of_two() || num_sets > u64::from(u32::MAX) {
            return Err(GeometryError::SetCount(num_sets));
        }
        let address_bits = block_size.trailing_zeros() + num_sets.trailing_zeros();
        if address_bits > u32::BITS {
            return Err(GeometryError::AddressBits(address_bits));
        }

        Ok(Geometry {
            block_size,
            num_sets: num_sets as u32,
            ways: ways as u32,
        })
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn num_sets(&self) -> u32 {
        self.num_sets
    }

    pub fn ways(&self) -> u32 {
        self.ways
    }

    pub fn offset_bits(&self) -> u32 {
        self.block_size.trailing_zeros()
    }

    pub fn index_bits(&self) -> u32 {
        self.num_sets.trailing_zeros()
    }

    pub fn tag_bits(&self) -> u32 {
        u32::BITS - self.offset_bits() - self.index_bits()
    }

    pub fn size_bytes(&self) -> u64 {
        u64::from(self.block_size) * u64::from(self.num_sets) * u64::from(self.ways)
    }
}

/// One level's record exactly as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelConfig {
    pub block_size: u32,
    pub associativity: u32,
    pub size_kb: u32,
}

impl LevelConfig {
    pub fn geometry(&self, level: &'static str) -> Result<Geometry, ConfigError> {
        Geometry::new(
            self.block_size,
            Associativity::from(self.associativity),
            u64::from(self.size_kb) * 1024,
        )
        .map_err(|source| ConfigError::Geometry { level, source })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub l1: LevelConfig,
    pub l2: LevelConfig,
}

impl CacheConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        fs::read_to_string(path)?.parse()
    }

    /// Checks the block sizes agree, then validates both levels.
    pub fn geometries(&self) -> Result<(Geometry, Geometry), ConfigError> {
        if self.l1.block_size != self.l2.block_size {
            return Err(ConfigError::BlockSizeMismatch {
                l1: self.l1.block_size,
                l2: self.l2.block_size,
            });
        }
        Ok((self.l1.geometry("L1")?, self.l2.geometry("L2")?))
    }
}

fn parse_field(level: &'static str, field: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::BadNumber {
        level,
        field,
        value: value.to_string(),
    })
}

fn parse_level(s: &str, level: &'static str) -> Result<LevelConfig, ConfigError> {
    // A repeated label overrides the earlier record.
    let caps = LEVEL_PATTERN
        .captures_iter(s)
        .filter(|caps| &caps[1] == level)
        .last()
        .ok_or(ConfigError::MissingLevel(level))?;

    Ok(LevelConfig {
        block_size: parse_field(level, "block size", &caps[2])?,
        associativity: parse_field(level, "associativity", &caps[3])?,
        size_kb: parse_field(level, "size", &caps[4])?,
    })
}

impl FromStr for CacheConfig {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CacheConfig {
            l1: parse_level(s, "L1")?,
            l2: parse_level(s, "L2")?,
        })
    }
}
