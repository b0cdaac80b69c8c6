//! Growth, alignment and reuse across many blocks.

use proptest::prelude::*;
use strata_arena::{Arena, ArenaConfig};
use strata_test_utils::strategies::{arb_alloc_requests, arb_alloc_sizes, arb_block_size};
use strata_test_utils::{is_aligned, StatsProbe};

proptest! {
    #[test]
    fn every_pointer_honours_its_alignment(
        block_size in arb_block_size(),
        requests in arb_alloc_requests(40),
    ) {
        let arena = Arena::with_block_size(block_size).unwrap();
        for (size, align) in requests {
            let ptr = arena.alloc_aligned(size, align).unwrap();
            prop_assert!(is_aligned(ptr, align), "size {} align {}", size, align);
        }
    }

    #[test]
    fn growth_preserves_earlier_allocations(
        block_size in arb_block_size(),
        sizes in arb_alloc_sizes(32),
    ) {
        let arena = Arena::with_block_size(block_size).unwrap();
        let mut live = Vec::new();
        for (i, &size) in sizes.iter().enumerate() {
            let fill = (i % 251) as u8;
            live.push((arena.alloc_slice_fill(size, fill).unwrap(), fill));
        }
        for (slice, fill) in &live {
            prop_assert!(slice.iter().all(|b| b == fill));
        }
    }

    #[test]
    fn reserved_grows_monotonically(
        block_size in arb_block_size(),
        requests in arb_alloc_requests(40),
    ) {
        let arena = Arena::with_block_size(block_size).unwrap();
        let mut last = 0;
        for (size, align) in requests {
            arena.alloc_aligned(size, align).unwrap();
            let stats = arena.stats();
            prop_assert!(stats.reserved_bytes >= last);
            prop_assert!(stats.used_bytes <= stats.reserved_bytes);
            last = stats.reserved_bytes;
        }
    }

    #[test]
    fn reset_then_replay_needs_no_new_blocks(
        block_size in arb_block_size(),
        requests in arb_alloc_requests(30),
    ) {
        let mut arena = Arena::with_block_size(block_size).unwrap();
        for &(size, align) in &requests {
            arena.alloc_aligned(size, align).unwrap();
        }
        arena.reset();
        let probe = StatsProbe::capture(&arena);
        for &(size, align) in &requests {
            arena.alloc_aligned(size, align).unwrap();
        }
        prop_assert_eq!(probe.growth_since(&arena), 0);
        prop_assert_eq!(arena.reserved_bytes(), probe.stats().reserved_bytes);
    }
}

#[test]
fn default_config_uses_one_mebibyte_blocks() {
    let arena = Arena::new(ArenaConfig::default()).unwrap();
    arena.alloc(1).unwrap();
    assert_eq!(arena.reserved_bytes(), ArenaConfig::DEFAULT_BLOCK_SIZE);
    assert_eq!(ArenaConfig::DEFAULT_BLOCK_SIZE, 1024 * 1024);
}

#[test]
fn shrink_then_free_returns_everything() {
    let mut arena = Arena::with_block_size(256).unwrap();
    for _ in 0..20 {
        arena.alloc(200).unwrap();
    }
    assert_eq!(arena.stats().block_count, 20);
    arena.reset_and_shrink();
    assert_eq!(arena.reserved_bytes(), 256);
    arena.free();
    assert_eq!(arena.reserved_bytes(), 0);
    assert_eq!(arena.growth_count(), 20);
}

#[test]
fn arena_moves_between_threads() {
    let arena = Arena::with_block_size(1024).unwrap();
    arena.alloc_str("before").unwrap();
    let handle = std::thread::spawn(move || {
        arena.alloc_str("after").unwrap();
        arena.stats().allocation_count
    });
    assert_eq!(handle.join().unwrap(), 2);
}
