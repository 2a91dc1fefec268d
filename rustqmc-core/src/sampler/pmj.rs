//! Stochastic progressive multi-jittered (0,2) sequence, built with
//! the xor-tree construction of Helmer et al. ("Stochastic Generation
//! of (t, s) Sample Sequences"). The construction only yields the
//! first pair of dimensions, so the second pair is an independently
//! shuffled and scrambled randomisation of the first.

use bits::{owen_shuffle, rotate_bytes};
use rng::{self, RNG};

/// Per-level xor offsets of the (0,2) tree, one set per dimension of
/// the base pair. Each new sample at tree level l is placed in the
/// stratum diagonally opposite its partner at index `i ^ PMJ_XORS[k][l]`.
const PMJ_XORS: [[u16; 16]; 2] = [
    [
        0b0000_0000_0000_0000,
        0b0000_0000_0000_0000,
        0b0000_0000_0000_0010,
        0b0000_0000_0000_0110,
        0b0000_0000_0000_0110,
        0b0000_0000_0000_1110,
        0b0000_0000_0011_0110,
        0b0000_0000_0100_1110,
        0b0000_0000_0001_0110,
        0b0000_0000_0010_1110,
        0b0000_0010_0111_0110,
        0b0000_0110_1100_1110,
        0b0000_0111_0001_0110,
        0b0000_1100_0010_1110,
        0b0011_0000_0111_0110,
        0b0100_0000_1100_1110,
    ],
    [
        0b0000_0000_0000_0000,
        0b0000_0000_0000_0001,
        0b0000_0000_0000_0011,
        0b0000_0000_0000_0011,
        0b0000_0000_0000_0111,
        0b0000_0000_0001_1011,
        0b0000_0000_0010_0111,
        0b0000_0000_0000_1011,
        0b0000_0000_0001_0111,
        0b0000_0001_0011_1011,
        0b0000_0011_0110_0111,
        0b0000_0011_1000_1011,
        0b0000_0110_0001_0111,
        0b0001_1000_0011_1011,
        0b0010_0000_0110_0111,
        0b0000_0000_1000_1011,
    ],
];

/// Build a table of 4-dimensional pmj(0,2) samples as 32 bit
/// fixed-point fractions. The construction doubles the sample count
/// level by level, so power-of-two sizes fill every stratum; nsamples
/// must be in [1, 2^16].
pub fn stochastic_pmj_table(nsamples: usize) -> Vec<[u32; 4]> {
    debug_assert!(nsamples >= 1);
    debug_assert!(nsamples <= 1 << 16);

    let mut buffer = vec![[0u32; 2]; nsamples];
    let mut rng = RNG::new();

    for k in 0..2 {
        buffer[0][k] = rng.uniform_u32();
    }

    let mut prev_len = 1;
    let mut log_n = 0;
    while prev_len < nsamples {
        for i2 in prev_len..nsamples.min(prev_len * 2) {
            let i1 = i2 - prev_len;
            for k in 0..2 {
                let swap_bit = 0x8000_0000u32 >> log_n;
                let bit_mask = swap_bit - 1;

                let j = i1 ^ PMJ_XORS[k][log_n] as usize;

                let prev_stratum = buffer[j][k] & !bit_mask;
                let next_stratum = prev_stratum ^ swap_bit;

                buffer[i2][k] = next_stratum | (rng.uniform_u32() & bit_mask);
            }
        }
        prev_len *= 2;
        log_n += 1;
    }

    // Dimensions 2 and 3 reuse the base pair under an independent
    // shuffle and digit scramble.
    (0..nsamples)
        .map(|i| {
            let mut sample = [0u32; 4];
            for pair in 0..2 {
                let hash = rng::hash(pair as u32);
                let shuffled = owen_shuffle(i as u32, hash) as usize % nsamples;
                for k in 0..2 {
                    sample[pair * 2 + k] = buffer[shuffled][k] ^ rotate_bytes(hash, k);
                }
            }
            sample
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_pair_prefixes_are_stratified() {
        let n = 256;
        let table = stochastic_pmj_table(n);

        for dimension in 0..2 {
            for log_n in 1..9 {
                let strata = 1usize << log_n;
                let mut seen = vec![false; strata];
                for sample in table.iter().take(strata) {
                    let stratum = (sample[dimension] >> (32 - log_n)) as usize;
                    seen[stratum] = true;
                }
                assert!(
                    seen.iter().all(|&s| s),
                    "dimension {} with {} samples leaves an empty stratum",
                    dimension,
                    strata
                );
            }
        }
    }

    #[test]
    fn construction_is_deterministic() {
        assert_eq!(stochastic_pmj_table(64), stochastic_pmj_table(64));
    }

    #[test]
    fn second_pair_differs_from_the_first() {
        let table = stochastic_pmj_table(64);
        assert!(table.iter().any(|s| s[0] != s[2] || s[1] != s[3]));
    }
}
