//! Rayon-parallel anchor-block driver (feature-gated).
//!
//! Anchor blocks have no data dependency on each other, so each block is
//! decoded on its own task. Per-element arithmetic is identical to the
//! sequential driver, which keeps the output bit-identical.

use rayon::prelude::*;

/// Runs `decode_block(anchor, block)` for every anchor block of `buffer` in parallel.
pub(crate) fn for_each_anchor_block_par<F>(buffer: &mut [f32], block_len: usize, decode_block: F)
where
    F: Fn(usize, &mut [f32]) + Sync,
{
    buffer
        .par_chunks_mut(block_len)
        .enumerate()
        .for_each(|(anchor, block)| decode_block(anchor, block));
}
