//! Proptest strategies for arena workloads.

use proptest::collection::vec;
use proptest::prelude::*;

/// Block sizes from tiny (frequent growth) to a few pages.
pub fn arb_block_size() -> impl Strategy<Value = usize> {
    prop_oneof![16usize..=256, 256usize..=8192]
}

/// Power-of-two alignments from 1 to 256.
pub fn arb_alignment() -> impl Strategy<Value = usize> {
    (0u32..=8).prop_map(|shift| 1usize << shift)
}

/// A single `(size, alignment)` request. Sizes include zero and requests
/// larger than a typical small block.
pub fn arb_alloc_request() -> impl Strategy<Value = (usize, usize)> {
    (prop_oneof![Just(0usize), 1usize..=64, 64usize..=2048], arb_alignment())
}

/// A sequence of up to `max_len` requests.
pub fn arb_alloc_requests(max_len: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    vec(arb_alloc_request(), 1..=max_len.max(1))
}

/// Non-zero byte sizes, for workloads that fill what they allocate.
pub fn arb_alloc_sizes(max_len: usize) -> impl Strategy<Value = Vec<usize>> {
    vec(1usize..=512, 1..=max_len.max(1))
}
