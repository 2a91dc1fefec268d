//! Bit manipulation shared by the sequence constructions: radical
//! inversion (bit reversal), hash-based Owen-style permutations and
//! fixed-point to float conversion.

use ONE_MINUS_EPSILON;

/// Reverse the bits of a 32 bit value, so the most significant bits
/// become the least significant and vice versa. Also known as the
/// radical inverse in base 2.
pub fn reverse_bits_32(mut value: u32) -> u32 {
    value = ((value & 0xaaaa_aaaa) >> 1) | ((value & 0x5555_5555) << 1);
    value = ((value & 0xcccc_cccc) >> 2) | ((value & 0x3333_3333) << 2);
    value = ((value & 0xf0f0_f0f0) >> 4) | ((value & 0x0f0f_0f0f) << 4);
    value.swap_bytes()
}

/// Reverse the bits of a 16 bit value.
pub fn reverse_bits_16(mut value: u16) -> u16 {
    value = ((value & 0xaaaa) >> 1) | ((value & 0x5555) << 1);
    value = ((value & 0xcccc) >> 2) | ((value & 0x3333) << 2);
    value = ((value & 0xf0f0) >> 4) | ((value & 0x0f0f) << 4);
    value.swap_bytes()
}

/// Laine and Karras style permutation: lower bits affect higher bits
/// but not the other way around. Combined with a bit reversal before
/// and after, this forms a hash based Owen scramble.
pub fn laine_karras_permutation(mut value: u32, seed: u32) -> u32 {
    value ^= value.wrapping_mul(0x3d20_adea);
    value = value.wrapping_add(seed);
    value = value.wrapping_mul((seed >> 16) | 1);
    value ^= value.wrapping_mul(0x0552_6c56);
    value ^= value.wrapping_mul(0x53a2_2864);
    value
}

/// Reverse input bits, then permute.
pub fn reverse_and_shuffle(value: u32, seed: u32) -> u32 {
    laine_karras_permutation(reverse_bits_32(value), seed)
}

/// Permute, then reverse the resulting bits. Equivalent to an Owen
/// scramble when the input bits are already reversed.
pub fn scramble_and_reverse(value: u32, seed: u32) -> u32 {
    reverse_bits_32(laine_karras_permutation(value, seed))
}

/// Hash based Owen scramble of a value in normal bit order. Preserves
/// every power-of-two prefix of the index range, which makes it safe
/// for shuffling progressive sequences.
pub fn owen_shuffle(value: u32, seed: u32) -> u32 {
    reverse_bits_32(reverse_and_shuffle(value, seed))
}

/// Rotate bits in an integer a given distance, wrapping around.
pub fn rotate_bits(value: u32, distance: u32) -> u32 {
    value.rotate_right(distance & 31)
}

/// Rotate whole bytes. Used to derive up to four decorrelated
/// per-dimension keys from a single 32 bit scramble key.
pub fn rotate_bytes(value: u32, distance: usize) -> u32 {
    rotate_bits(value, distance as u32 * 8)
}

/// Map a 32 bit fixed-point sample onto [0, 1).
pub fn sample_to_float(value: u32) -> f32 {
    (value as f32 * 2.3283064365386963e-10).min(ONE_MINUS_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_32_is_an_involution() {
        for &v in &[0u32, 1, 2, 0x8000_0000, 0xdead_beef, 0xffff_ffff] {
            assert_eq!(reverse_bits_32(reverse_bits_32(v)), v);
        }
        assert_eq!(reverse_bits_32(1), 0x8000_0000);
    }

    #[test]
    fn reverse_16_is_an_involution() {
        for &v in &[0u16, 1, 2, 0x8000, 0xbeef, 0xffff] {
            assert_eq!(reverse_bits_16(reverse_bits_16(v)), v);
        }
        assert_eq!(reverse_bits_16(1), 0x8000);
    }

    #[test]
    fn owen_shuffle_preserves_power_of_two_prefixes() {
        // A progressive shuffle must map [0, 2^k) onto itself for every k.
        let seed = 0x9e37_79b9;
        for log_n in 1..8 {
            let n = 1u32 << log_n;
            let mut seen = vec![false; n as usize];
            for i in 0..n {
                let j = owen_shuffle(i, seed) & (n - 1);
                seen[j as usize] = true;
            }
            assert!(seen.iter().all(|&s| s));
        }
    }

    #[test]
    fn rotate_bytes_wraps_every_four() {
        assert_eq!(rotate_bytes(0xdead_beef, 0), 0xdead_beef);
        assert_eq!(rotate_bytes(0xdead_beef, 4), 0xdead_beef);
        assert_eq!(rotate_bytes(0x0000_00ff, 1), 0xff00_0000);
    }

    #[test]
    fn sample_to_float_covers_unit_interval() {
        assert_eq!(sample_to_float(0), 0.0);
        assert!(sample_to_float(0xffff_ffff) < 1.0);
        assert!(sample_to_float(0x8000_0000) - 0.5 < 1e-6);
    }
}
