//! PCG-RXS-M-XS-32 pseudo-random number generator. One 32-bit word of
//! state is enough for the sequence machinery, and the same output
//! permutation doubles as a hash function for seeding parallel streams.

use ONE_MINUS_EPSILON;

/// LCG state transition. Incrementing the input state selects a new
/// stream.
pub fn state_transition(state: u32) -> u32 {
    state.wrapping_mul(747796405).wrapping_add(2891336453)
}

/// Output permutation of the PRNG state (RXS-M-XS).
pub fn output(mut state: u32) -> u32 {
    state ^= state >> (4 + (state >> 28));
    state = state.wrapping_mul(277803737);
    state ^ (state >> 22)
}

/// Hash an input key into a statistically random value. Used to seed a
/// system or to compute arrays of random values in parallel.
pub fn hash(key: u32) -> u32 {
    output(state_transition(key))
}

#[derive(Debug, Copy, Clone)]
pub struct RNG {
    state: u32,
}

impl RNG {
    pub fn new() -> RNG {
        RNG {
            state: state_transition(0),
        }
    }

    pub fn with_seed(seed: u32) -> RNG {
        RNG {
            state: state_transition(0).wrapping_add(seed),
        }
    }

    pub fn uniform_u32(&mut self) -> u32 {
        self.state = state_transition(self.state);
        output(self.state)
    }

    /// Unbiased integer in [0, b). Rejection by the method of Lemire;
    /// the expected number of divisions is close to one.
    pub fn uniform_u32_bounded(&mut self, b: u32) -> u32 {
        assert!(b > 0);

        let mut x = self.uniform_u32();
        let mut r = x % b;
        while x.wrapping_sub(r) > b.wrapping_neg() {
            x = self.uniform_u32();
            r = x % b;
        }
        r
    }

    pub fn uniform_f32(&mut self) -> f32 {
        (self.uniform_u32() as f32 * 2.3283064365386963e-10).min(ONE_MINUS_EPSILON)
    }
}

impl Default for RNG {
    fn default() -> RNG {
        RNG::new()
    }
}
