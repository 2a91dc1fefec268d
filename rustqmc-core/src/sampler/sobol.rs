//! Sobol sequence over 16-bit direction matrices, four dimensions. The
//! matrices give a (0, 2)-sequence in every consecutive dimension pair,
//! and 16 bits of index are enough for the table-free constructions
//! used here.

use bits::{reverse_bits_16, reverse_bits_32};

/// Binary direction matrices, one per dimension, columns as rows of
/// bits. Dimension zero is the identity, so its value is the radical
/// inverse of the index.
const DIRECTIONS: [[u16; 16]; 4] = [
    [
        0b1000_0000_0000_0000,
        0b0100_0000_0000_0000,
        0b0010_0000_0000_0000,
        0b0001_0000_0000_0000,
        0b0000_1000_0000_0000,
        0b0000_0100_0000_0000,
        0b0000_0010_0000_0000,
        0b0000_0001_0000_0000,
        0b0000_0000_1000_0000,
        0b0000_0000_0100_0000,
        0b0000_0000_0010_0000,
        0b0000_0000_0001_0000,
        0b0000_0000_0000_1000,
        0b0000_0000_0000_0100,
        0b0000_0000_0000_0010,
        0b0000_0000_0000_0001,
    ],
    [
        0b1111_1111_1111_1111,
        0b0101_0101_0101_0101,
        0b0011_0011_0011_0011,
        0b0001_0001_0001_0001,
        0b0000_1111_0000_1111,
        0b0000_0101_0000_0101,
        0b0000_0011_0000_0011,
        0b0000_0001_0000_0001,
        0b0000_0000_1111_1111,
        0b0000_0000_0101_0101,
        0b0000_0000_0011_0011,
        0b0000_0000_0001_0001,
        0b0000_0000_0000_1111,
        0b0000_0000_0000_0101,
        0b0000_0000_0000_0011,
        0b0000_0000_0000_0001,
    ],
    [
        0b1010_1010_0000_1001,
        0b0111_0111_0000_0110,
        0b0011_1001_0000_0011,
        0b0001_0110_0000_0001,
        0b0000_1001_1010_1010,
        0b0000_0110_0111_0111,
        0b0000_0011_0011_1001,
        0b0000_0001_0001_0110,
        0b0000_0000_1010_0011,
        0b0000_0000_0111_0001,
        0b0000_0000_0011_1010,
        0b0000_0000_0001_0111,
        0b0000_0000_0000_1001,
        0b0000_0000_0000_0110,
        0b0000_0000_0000_0011,
        0b0000_0000_0000_0001,
    ],
    [
        0b1010_0000_1100_0011,
        0b0100_0000_0100_0001,
        0b0011_0000_0010_1101,
        0b0001_0000_0001_1110,
        0b0000_1011_0110_0111,
        0b0000_0111_1001_1010,
        0b0000_0010_1010_0100,
        0b0000_0001_0001_1011,
        0b0000_0000_1100_1001,
        0b0000_0000_0100_0101,
        0b0000_0000_0010_1110,
        0b0000_0000_0001_1111,
        0b0000_0000_0000_1010,
        0b0000_0000_0000_0100,
        0b0000_0000_0000_0011,
        0b0000_0000_0000_0001,
    ],
];

/// Sobol sequence value for a 16 bit index whose bits have already been
/// reversed, to 16 bits of precision. Dimension must be below four.
pub fn sobol_reversed_index(index: u16, dimension: usize) -> u16 {
    debug_assert!(dimension < 4);

    if dimension == 0 {
        return reverse_bits_16(index);
    }

    let matrix = &DIRECTIONS[dimension];

    let mut sample = 0;
    for (i, &column) in matrix.iter().enumerate() {
        if index & (1 << i) != 0 {
            sample ^= column;
        }
    }

    sample
}

/// Raw (unscrambled) sobol sequence value as a 32 bit fixed-point
/// fraction. Indices at and beyond 2^16 repeat earlier values.
pub fn sobol(index: u32, dimension: usize) -> u32 {
    let reversed = (reverse_bits_32(index) >> 16) as u16;
    reverse_bits_32(u32::from(sobol_reversed_index(reversed, dimension)))
}
