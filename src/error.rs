use std::io;
use std::num::ParseIntError;
use std::str::Utf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read cache config: {0}")]
    Io(#[from] io::Error),

    #[error("no `{0}:` record in cache config")]
    MissingLevel(&'static str),

    #[error("{level} {field} `{value}` is not a valid number")]
    BadNumber {
        level: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("invalid {level} geometry: {source}")]
    Geometry {
        level: &'static str,
        #[source]
        source: GeometryError,
    },

    /// L1 and L2 must share one block size.
    #[error("L1 block size ({l1} B) differs from L2 block size ({l2} B)")]
    BlockSizeMismatch { l1: u32, l2: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("trace line is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),

    #[error("trace record must have an operation and an address")]
    MissingField,

    #[error("unknown trace operation `{0}`")]
    UnknownOp(String),

    #[error("bad trace address `{addr}`: {source}")]
    BadAddress {
        addr: String,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("trace i/o failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("block size {0} is not a non-zero power of two")]
    BlockSize(u32),

    #[error("associativity must be at least one way")]
    NoWays,

    #[error("{size} B does not divide into {ways}-way sets of {block_size} B blocks")]
    Capacity { size: u64, block_size: u32, ways: u64 },

    #[error("set count {0} is not a power of two")]
    SetCount(u64),

    #[error("offset and index fields need {0} bits, the address has 32")]
    AddressBits(u32),
}
