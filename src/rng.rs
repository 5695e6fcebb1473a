//! Seed derivation for per-pipeline RNG streams.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Derives an independent sampling stream from the master seed, a stream id
/// (the category ordinal), and the recompute generation. Same inputs, same
/// stream: reruns with a pinned seed reproduce their sampling exactly.
pub fn stream_rng(master_seed: u64, stream: u64, generation: u64) -> ChaCha8Rng {
    let mut seed = master_seed;
    seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    seed ^= stream.wrapping_mul(1103515245);
    seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    seed ^= generation.wrapping_mul(69069);
    ChaCha8Rng::seed_from_u64(seed)
}
