use cachesim::{AccessState, Associativity, Cache, CacheSystem, Geometry, MemoryAccess};
use proptest::prelude::*;

fn geometry(block: u32, assoc: Associativity, size: u64) -> Geometry {
    Geometry::new(block, assoc, size).unwrap()
}

/// Small enough that a short trace keeps evicting.
fn tiny_system() -> CacheSystem {
    CacheSystem::new(
        geometry(16, Associativity::Ways(2), 64),
        geometry(16, Associativity::Ways(2), 128),
    )
}

fn access_strategy() -> impl Strategy<Value = MemoryAccess> {
    (any::<bool>(), 0u32..0x400).prop_map(|(is_write, addr)| {
        if is_write {
            MemoryAccess::write(addr)
        } else {
            MemoryAccess::read(addr)
        }
    })
}

proptest! {
    #[test]
    fn no_block_is_cached_twice(trace in prop::collection::vec(access_strategy(), 1..200)) {
        let mut sys = tiny_system();
        for access in &trace {
            sys.access(access);
            for block in (0..0x400).step_by(16) {
                prop_assert!(!(sys.l1().probe(block) && sys.l2().probe(block)));
            }
        }
    }

    #[test]
    fn write_misses_never_allocate(trace in prop::collection::vec(access_strategy(), 1..200)) {
        let mut sys = tiny_system();
        for access in &trace {
            let res = sys.access(access);
            if res.l2 == AccessState::WriteMiss {
                prop_assert_eq!(res.mem, AccessState::WriteMem);
                prop_assert!(!sys.l1().probe(access.address));
                prop_assert!(!sys.l2().probe(access.address));
            }
        }
    }

    #[test]
    fn clean_only_traces_never_write_memory(addrs in prop::collection::vec(0u32..0x1000, 1..200)) {
        let mut sys = tiny_system();
        for addr in addrs {
            prop_assert_eq!(sys.read(addr).mem, AccessState::NoWriteMem);
        }
    }

    #[test]
    fn decompose_round_trips_to_block_address(
        addr in any::<u32>(),
        block_shift in 2u32..8,
        ways in prop::sample::select(vec![0u32, 1, 2, 4, 8]),
        size_kb in prop::sample::select(vec![1u64, 4, 32, 256]),
    ) {
        let block = 1u32 << block_shift;
        let cache = Cache::new(geometry(block, Associativity::from(ways), size_kb * 1024));
        let (tag, index) = cache.decompose(addr);
        prop_assert_eq!(cache.block_address(tag, index), addr & !(block - 1));
    }
}

#[test]
fn fully_associative_l2_evicts_in_fifo_order() {
    // One L1 slot per set makes every new read push its predecessor into L2.
    let mut sys = CacheSystem::new(
        geometry(16, Associativity::Ways(1), 16),
        geometry(16, Associativity::Full, 48),
    );
    sys.read(0x000);
    sys.write(0x000);
    for addr in [0x010, 0x020, 0x030] {
        assert_eq!(sys.read(addr).mem, AccessState::NoWriteMem);
    }
    // L2 now holds 0x000 (dirty), 0x010, 0x020 and is full.
    assert!(sys.l2().probe(0x000));
    // Touching 0x010 in L2 does not save it or 0x000 from eviction.
    assert_eq!(sys.write(0x010).l2, AccessState::WriteHit);
    assert_eq!(sys.read(0x040).mem, AccessState::WriteMem);
    assert!(!sys.l2().probe(0x000));
    assert_eq!(sys.read(0x050).mem, AccessState::WriteMem);
    assert!(!sys.l2().probe(0x010));
    assert_eq!(sys.read(0x060).mem, AccessState::NoWriteMem);
    assert!(!sys.l2().probe(0x020));
}
