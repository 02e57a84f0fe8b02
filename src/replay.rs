use std::fmt;
use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::error::ParseError;
use crate::hierarchy::{AccessResult, AccessState, CacheSystem};
use crate::memory_access::MemoryAccess;

/// Totals collected over one trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub accesses: u64,
    pub reads: u64,
    pub writes: u64,
    pub l1_hits: u64,
    pub l2_hits: u64,
    pub l2_misses: u64,
    pub memory_writes: u64,
}

impl Stats {
    pub fn record(&mut self, res: &AccessResult) {
        use AccessState::*;

        self.accesses += 1;
        match res.l1 {
            ReadHit | ReadMiss => self.reads += 1,
            _ => self.writes += 1,
        }
        if matches!(res.l1, ReadHit | WriteHit) {
            self.l1_hits += 1;
        }
        match res.l2 {
            ReadHit | WriteHit => self.l2_hits += 1,
            ReadMiss | WriteMiss => self.l2_misses += 1,
            _ => {}
        }
        if res.mem == WriteMem {
            self.memory_writes += 1;
        }
    }

    pub fn l1_misses(&self) -> u64 {
        self.accesses - self.l1_hits
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} accesses ({} R / {} W), L1 {} hit / {} miss, L2 {} hit / {} miss, {} memory writes",
            self.accesses,
            self.reads,
            self.writes,
            self.l1_hits,
            self.l1_misses(),
            self.l2_hits,
            self.l2_misses,
            self.memory_writes
        )
    }
}

/// Feeds every trace line through `system`, writing one `L1 L2 MEM` line
/// per access. The first line that does not parse ends the trace.
pub fn replay<R: BufRead, W: Write>(
    system: &mut CacheSystem,
    reader: R,
    mut writer: W,
) -> io::Result<Stats> {
    let mut stats = Stats::default();
    for (lineno, raw) in reader.split(b'\n').enumerate() {
        let raw = raw?;
        let parsed = std::str::from_utf8(&raw)
            .map_err(ParseError::from)
            .and_then(str::parse::<MemoryAccess>);
        let access = match parsed {
            Ok(access) => access,
            Err(e) => {
                warn!(line = lineno + 1, "trace ends early: {e}");
                break;
            }
        };
        let res = system.access(&access);
        stats.record(&res);
        writeln!(writer, "{}", res)?;
    }
    writer.flush()?;
    Ok(stats)
}
