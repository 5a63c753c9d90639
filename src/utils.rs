use rand::{rngs::StdRng, SeedableRng};

use crate::signal::Signal;

pub async fn clock_cycles(signal: &Signal, n_cycles: u32) {
    for _ in 0..n_cycles {
        signal.rising_edge().await;
    }
}

/// Reproducible random stream; `stream` separates independent users of one seed.
#[inline]
pub fn seeded_rng(seed: u64, stream: u64) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
}
