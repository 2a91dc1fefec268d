//! Monte-Carlo estimation of the test integrands. The optimiser calls
//! this once per slot per round, so the loop is kept allocation free.

use bits::sample_to_float;
use sampler::BaseSequence;
use scramble::{self, ScrambleOp};
use shapes::Shape;

/// Incremental-mean estimate of a shape integral from the first
/// `nsamples` draws of a sequence under a slot's scramble parameters.
/// Stateless; the same inputs always give the same estimate.
pub fn evaluate<S: Shape + ?Sized>(
    sequence: &BaseSequence,
    op: ScrambleOp,
    key: u32,
    rank: u32,
    nsamples: u32,
    shape: &S,
) -> f32 {
    debug_assert!(nsamples > 0);

    let mut mean = 0.0;
    for i in 0..nsamples {
        let index = scramble::sequence_index(rank, i, nsamples);
        let x = sample_to_float(scramble::apply(sequence.sample(index, 0), key, 0, op));
        let y = sample_to_float(scramble::apply(sequence.sample(index, 1), key, 1, op));

        mean += (shape.evaluate(x, y) - mean) / (i + 1) as f32;
    }

    mean
}
