use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read,
    Write,
}

/// One `<op> <hex address>` line of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryAccess {
    pub op: Op,
    pub address: u32,
}

impl MemoryAccess {
    pub fn read(address: u32) -> Self {
        MemoryAccess {
            op: Op::Read,
            address,
        }
    }

    pub fn write(address: u32) -> Self {
        MemoryAccess {
            op: Op::Write,
            address,
        }
    }
}

impl fmt::Display for MemoryAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Read => 'R',
            Op::Write => 'W',
        };
        write!(f, "{} 0x{:08x}", op, self.address)
    }
}

fn parse_hex_addr(addr: &str) -> Result<u32, ParseError> {
    let digits = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr);
    u32::from_str_radix(digits, 16).map_err(|source| ParseError::BadAddress {
        addr: addr.to_string(),
        source,
    })
}

impl FromStr for MemoryAccess {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(op), Some(addr)) = (parts.next(), parts.next()) else {
            return Err(ParseError::MissingField);
        };
        let op = match op {
            "R" => Op::Read,
            "W" => Op::Write,
            other => return Err(ParseError::UnknownOp(other.to_string())),
        };
        Ok(MemoryAccess {
            op,
            address: parse_hex_addr(addr)?,
        })
    }
}
