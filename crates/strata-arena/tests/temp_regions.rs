//! Marker and scratch behaviour over random workloads.

use proptest::prelude::*;
use strata_arena::{Arena, ArenaConfig, ArenaError};
use strata_test_utils::strategies::{arb_alloc_requests, arb_block_size};
use strata_test_utils::StatsProbe;

fn run(arena: &Arena, requests: &[(usize, usize)]) {
    for &(size, align) in requests {
        arena.alloc_aligned(size, align).unwrap();
    }
}

proptest! {
    #[test]
    fn temp_end_restores_exact_state(
        block_size in arb_block_size(),
        before in arb_alloc_requests(12),
        inside in arb_alloc_requests(24),
    ) {
        let mut arena = Arena::with_block_size(block_size).unwrap();
        run(&arena, &before);
        let probe = StatsProbe::capture(&arena);
        let marker = arena.temp_begin();
        run(&arena, &inside);
        arena.temp_end(marker).unwrap();
        prop_assert!(probe.matches(&arena));
        prop_assert_eq!(arena.open_markers(), 0);
    }

    #[test]
    fn nested_markers_restore_each_level(
        block_size in arb_block_size(),
        levels in proptest::collection::vec(arb_alloc_requests(6), 1..6),
    ) {
        let mut arena = Arena::with_block_size(block_size).unwrap();
        let mut stack = Vec::new();
        for level in &levels {
            let probe = StatsProbe::capture(&arena);
            stack.push((arena.temp_begin(), probe));
            run(&arena, level);
        }
        while let Some((marker, probe)) = stack.pop() {
            arena.temp_end(marker).unwrap();
            prop_assert!(probe.matches(&arena));
        }
        prop_assert_eq!(arena.stats().block_count, 0);
    }

    #[test]
    fn restore_after_reset_reuses_reserved_blocks(
        block_size in arb_block_size(),
        warmup in arb_alloc_requests(16),
        inside in arb_alloc_requests(16),
    ) {
        let mut arena = Arena::with_block_size(block_size).unwrap();
        run(&arena, &warmup);
        arena.reset();
        let probe = StatsProbe::capture(&arena);
        let marker = arena.temp_begin();
        run(&arena, &inside);
        arena.temp_end(marker).unwrap();
        prop_assert_eq!(arena.used_bytes(), 0);
        prop_assert!(arena.reserved_bytes() <= probe.stats().reserved_bytes);
    }

    #[test]
    fn scratch_always_restores_parent(
        block_size in arb_block_size(),
        before in arb_alloc_requests(8),
        inside in arb_alloc_requests(16),
    ) {
        let mut arena = Arena::with_block_size(block_size).unwrap();
        run(&arena, &before);
        let probe = StatsProbe::capture(&arena);
        arena.with_scratch(|scratch| run(scratch, &inside));
        prop_assert!(probe.matches(&arena));
    }
}

#[test]
fn concrete_block_boundary_scenario() {
    let mut arena = Arena::with_block_size(64).unwrap();
    arena.alloc(40).unwrap();
    let marker = arena.temp_begin();
    arena.alloc(40).unwrap();
    assert_eq!(arena.stats().block_count, 2);
    arena.alloc_aligned(8, 16).unwrap();
    arena.temp_end(marker).unwrap();

    let blocks = arena.blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].used, 40);
    assert_eq!(arena.current_block(), Some(0));
    assert_eq!(arena.reserved_bytes(), 64);
}

#[test]
fn markers_from_one_arena_cannot_rewind_another() {
    let first = Arena::with_block_size(64).unwrap();
    let mut second = Arena::with_block_size(64).unwrap();
    second.alloc(32).unwrap();
    let probe = StatsProbe::capture(&second);
    let marker = first.temp_begin();
    let err = second.temp_end(marker).unwrap_err();
    assert!(matches!(err, ArenaError::ForeignMarker { .. }));
    probe.assert_restored(&second);
}

#[test]
fn nested_scratch_releases_inner_first() {
    let mut arena = Arena::with_block_size(128).unwrap();
    arena.alloc(16).unwrap();
    let outer_probe = StatsProbe::capture(&arena);
    {
        let mut outer = arena.scratch();
        let kept = outer.alloc_slice_fill(100, 0x5Au8).unwrap().len();
        assert_eq!(kept, 100);
        let inner_probe = StatsProbe::capture(&outer);
        {
            let inner = outer.scratch();
            inner.alloc_bytes(500).unwrap();
            inner.alloc_bytes(500).unwrap();
        }
        inner_probe.assert_restored(&outer);
    }
    outer_probe.assert_restored(&arena);
}

#[test]
fn budget_applies_inside_temp_regions() {
    let config = ArenaConfig::new(64).with_max_reserved_bytes(192);
    let mut arena = Arena::new(config).unwrap();
    arena.alloc(60).unwrap();
    let marker = arena.temp_begin();
    arena.alloc(60).unwrap();
    arena.alloc(60).unwrap();
    assert!(arena.alloc(60).unwrap_err().is_exhaustion());
    arena.temp_end(marker).unwrap();
    assert_eq!(arena.reserved_bytes(), 64);
    arena.alloc(60).unwrap();
    arena.alloc(60).unwrap();
}

#[test]
fn kept_regions_leave_no_open_markers() {
    let mut arena = Arena::with_block_size(4096).unwrap();
    for i in 0..100_000usize {
        let marker = arena.temp_begin();
        arena.alloc(i % 16 + 1).unwrap();
        arena.temp_commit(marker).unwrap();
    }
    assert_eq!(arena.open_markers(), 0);

    let probe = StatsProbe::capture(&arena);
    let marker = arena.temp_begin();
    arena.alloc(64).unwrap();
    arena.temp_end(marker).unwrap();
    probe.assert_restored(&arena);
}
