//! Rank-1 lattice with a fixed generator vector, made progressive by
//! radical inversion of the sample index (Hickernell et al., "Weighted
//! Compound Integration Rules with Higher Order Convergence for all
//! N").

use bits::reverse_bits_32;

/// Generator vector, one multiplier per dimension.
const GENERATOR: [u32; 4] = [1, 364_981, 245_389, 97_823];

/// Lattice value for an index whose bits have already been reversed,
/// as a 32 bit fixed-point fraction. Dimension must be below four.
pub fn lattice_reversed_index(index: u32, dimension: usize) -> u32 {
    debug_assert!(dimension < 4);

    GENERATOR[dimension].wrapping_mul(index)
}

/// Raw (unshifted) progressive lattice value.
pub fn lattice(index: u32, dimension: usize) -> u32 {
    lattice_reversed_index(reverse_bits_32(index), dimension)
}
