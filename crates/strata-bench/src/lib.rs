//! Allocation workloads for benchmarking Strata arenas.
//!
//! Provides deterministic request streams and arena profiles:
//!
//! - [`small_requests`]: many small, 8-byte-aligned requests
//! - [`mixed_requests`]: sizes and alignments spread across several orders
//!   of magnitude, including requests larger than a block
//! - [`frame_profile`] / [`growth_profile`]: arena configs for steady-state
//!   and growth-heavy runs

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strata_arena::{Arena, ArenaConfig, ArenaError};

/// Block size for steady-state runs: large enough that a frame never grows.
pub const FRAME_BLOCK_SIZE: usize = 1024 * 1024;

/// Block size for growth runs: small enough that most frames grow.
pub const GROWTH_BLOCK_SIZE: usize = 4 * 1024;

/// Arena config for steady-state frame workloads.
pub fn frame_profile() -> ArenaConfig {
    ArenaConfig::new(FRAME_BLOCK_SIZE)
}

/// Arena config that forces frequent block growth.
pub fn growth_profile() -> ArenaConfig {
    ArenaConfig::new(GROWTH_BLOCK_SIZE)
}

/// Step a 64-bit LCG.
fn next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state >> 33
}

/// `count` requests of 1..=64 bytes at the default alignment.
pub fn small_requests(count: usize, seed: u64) -> Vec<(usize, usize)> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            let size = 1 + (next(&mut state) % 64) as usize;
            (size, ArenaConfig::DEFAULT_ALIGNMENT)
        })
        .collect()
}

/// `count` requests with sizes up to 16 KiB and alignments up to 64.
///
/// Roughly one request in 64 exceeds [`GROWTH_BLOCK_SIZE`].
pub fn mixed_requests(count: usize, seed: u64) -> Vec<(usize, usize)> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            let roll = next(&mut state);
            let size = match roll % 64 {
                0 => GROWTH_BLOCK_SIZE + (roll as usize % (12 * 1024)),
                1..=8 => 256 + (roll as usize % 1024),
                _ => 1 + (roll as usize % 128),
            };
            let align = 1usize << (next(&mut state) % 7);
            (size, align)
        })
        .collect()
}

/// Serve every request from `arena`, returning the total bytes requested.
pub fn run_requests(arena: &Arena, requests: &[(usize, usize)]) -> Result<usize, ArenaError> {
    let mut total = 0;
    for &(size, align) in requests {
        arena.alloc_aligned(size, align)?;
        total += size;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_deterministic() {
        assert_eq!(mixed_requests(100, 7), mixed_requests(100, 7));
        assert_ne!(mixed_requests(100, 7), mixed_requests(100, 8));
    }

    #[test]
    fn small_requests_stay_small() {
        let reqs = small_requests(1000, 42);
        assert!(reqs.iter().all(|&(s, a)| (1..=64).contains(&s) && a == 8));
    }

    #[test]
    fn mixed_requests_have_valid_alignment_and_some_oversize() {
        let reqs = mixed_requests(4096, 42);
        assert!(reqs.iter().all(|&(_, a)| a.is_power_of_two() && a <= 64));
        assert!(reqs.iter().any(|&(s, _)| s > GROWTH_BLOCK_SIZE));
    }

    #[test]
    fn growth_profile_grows_and_reset_reuses() {
        let mut arena = Arena::new(growth_profile()).unwrap();
        let reqs = mixed_requests(512, 1);
        let total = run_requests(&arena, &reqs).unwrap();
        assert!(arena.used_bytes() >= total);
        let grown = arena.growth_count();
        assert!(grown > 1);
        arena.reset();
        run_requests(&arena, &reqs).unwrap();
        assert_eq!(arena.growth_count(), grown);
    }
}
