//! Randomisation of base sequence values. A slot's 32 bit scramble key
//! rotates the digits of every sample it draws, and its rank offsets
//! where in the sequence drawing starts. Both are pure functions of
//! their inputs, so they are safe to evaluate from any thread.

use bits::rotate_bytes;

/// How a key combines with a fixed-point sample. Base-2 digit
/// constructions keep their stratification under XOR (the random digit
/// scramble of Kollig and Keller); lattices keep theirs under a
/// toroidal shift, which wrapping addition gives for free.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScrambleOp {
    Digit,
    Shift,
}

/// Apply a scramble key to a sample in the given dimension. The
/// per-dimension key is a byte rotation of the slot key, so one key
/// decorrelates up to four dimensions. Key zero is the identity.
pub fn apply(sample: u32, key: u32, dimension: usize, op: ScrambleOp) -> u32 {
    let key = rotate_bytes(key, dimension);

    match op {
        ScrambleOp::Digit => sample ^ key,
        ScrambleOp::Shift => sample.wrapping_add(key),
    }
}

/// Sequence index consumed by draw i under a rank offset. The sequence
/// is walked cyclically from the rank. Rank zero is the identity order.
pub fn sequence_index(rank: u32, i: u32, nsamples: u32) -> u32 {
    debug_assert!(nsamples > 0);

    rank.wrapping_add(i) % nsamples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_zero_is_the_identity() {
        for &op in &[ScrambleOp::Digit, ScrambleOp::Shift] {
            for dimension in 0..4 {
                assert_eq!(apply(0xdead_beef, 0, dimension, op), 0xdead_beef);
            }
        }
    }

    #[test]
    fn digit_scramble_is_an_involution() {
        let scrambled = apply(0x1234_5678, 0xcafe_f00d, 2, ScrambleOp::Digit);
        assert_eq!(
            apply(scrambled, 0xcafe_f00d, 2, ScrambleOp::Digit),
            0x1234_5678
        );
    }

    #[test]
    fn shift_wraps_toroidally() {
        assert_eq!(apply(0xffff_ffff, 1, 0, ScrambleOp::Shift), 0);
    }

    #[test]
    fn dimensions_see_different_keys() {
        let key = 0x0102_0304;
        assert_ne!(
            apply(0, key, 0, ScrambleOp::Digit),
            apply(0, key, 1, ScrambleOp::Digit)
        );
    }

    #[test]
    fn rank_zero_walks_in_order() {
        for i in 0..16 {
            assert_eq!(sequence_index(0, i, 16), i);
        }
    }

    #[test]
    fn rank_offsets_cyclically() {
        assert_eq!(sequence_index(14, 0, 16), 14);
        assert_eq!(sequence_index(14, 3, 16), 1);
    }
}
