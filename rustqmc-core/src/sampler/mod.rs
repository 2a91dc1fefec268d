//! Sequence families and point set generation.

use std::fmt;
use std::str::FromStr;

use bits::sample_to_float;
use bntables;
use errors::{Error, Result};
use rng;
use scramble::{self, ScrambleOp};

pub mod lattice;
pub mod pmj;
pub mod sobol;

/// Dimension limit of the compiled direction and generator tables.
pub const MAX_DIMS: usize = 4;

/// Index range of the 16 bit constructions. Larger sample counts would
/// silently repeat table entries, so they are rejected instead.
pub const MAX_SAMPLES: usize = 1 << 16;

/// The supported low-discrepancy constructions. The `*Bn` variants use
/// the same base construction but draw their per-sequence scramble
/// parameters from the pre-optimised blue-noise tables.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SequenceFamily {
    Pmj,
    Sobol,
    Lattice,
    PmjBn,
    SobolBn,
    LatticeBn,
}

impl SequenceFamily {
    pub fn name(&self) -> &'static str {
        match *self {
            SequenceFamily::Pmj => "pmj",
            SequenceFamily::Sobol => "sobol",
            SequenceFamily::Lattice => "lattice",
            SequenceFamily::PmjBn => "pmjbn",
            SequenceFamily::SobolBn => "sobolbn",
            SequenceFamily::LatticeBn => "latticebn",
        }
    }

    /// The base construction, stripping any blue-noise variant.
    pub fn base(&self) -> SequenceFamily {
        match *self {
            SequenceFamily::Pmj | SequenceFamily::PmjBn => SequenceFamily::Pmj,
            SequenceFamily::Sobol | SequenceFamily::SobolBn => SequenceFamily::Sobol,
            SequenceFamily::Lattice | SequenceFamily::LatticeBn => SequenceFamily::Lattice,
        }
    }

    pub fn is_bn(&self) -> bool {
        match *self {
            SequenceFamily::PmjBn | SequenceFamily::SobolBn | SequenceFamily::LatticeBn => true,
            _ => false,
        }
    }

    /// How scramble keys combine with this family's samples.
    pub fn scramble_op(&self) -> ScrambleOp {
        match self.base() {
            SequenceFamily::Lattice => ScrambleOp::Shift,
            _ => ScrambleOp::Digit,
        }
    }

    pub fn all() -> &'static [SequenceFamily] {
        &[
            SequenceFamily::Pmj,
            SequenceFamily::Sobol,
            SequenceFamily::Lattice,
            SequenceFamily::PmjBn,
            SequenceFamily::SobolBn,
            SequenceFamily::LatticeBn,
        ]
    }
}

impl fmt::Display for SequenceFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SequenceFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<SequenceFamily> {
        SequenceFamily::all()
            .iter()
            .cloned()
            .find(|family| family.name() == s)
            .ok_or_else(|| Error::UnsupportedFamily(s.to_string()))
    }
}

/// A realised base construction, sampled per (index, dimension) as 32
/// bit fixed-point fractions. The pmj family carries its stochastic
/// table; sobol and lattice values are computed on the fly.
pub enum BaseSequence {
    Pmj(Vec<[u32; 4]>),
    Sobol,
    Lattice,
}

impl BaseSequence {
    pub fn build(family: SequenceFamily, nsamples: usize) -> BaseSequence {
        match family.base() {
            SequenceFamily::Pmj => BaseSequence::Pmj(pmj::stochastic_pmj_table(nsamples)),
            SequenceFamily::Sobol => BaseSequence::Sobol,
            SequenceFamily::Lattice => BaseSequence::Lattice,
            _ => unreachable!(),
        }
    }

    pub fn sample(&self, index: u32, dimension: usize) -> u32 {
        match *self {
            BaseSequence::Pmj(ref table) => table[index as usize % table.len()][dimension],
            BaseSequence::Sobol => sobol::sobol(index, dimension),
            BaseSequence::Lattice => lattice::lattice(index, dimension),
        }
    }
}

/// A generated set of sequences, row-major over (sequence, sample,
/// dimension), every coordinate in [0, 1). Immutable once produced.
#[derive(Debug, Clone)]
pub struct PointSet {
    nsequences: usize,
    nsamples: usize,
    ndims: usize,
    data: Vec<f32>,
}

impl PointSet {
    pub fn nsequences(&self) -> usize {
        self.nsequences
    }

    pub fn nsamples(&self) -> usize {
        self.nsamples
    }

    pub fn ndims(&self) -> usize {
        self.ndims
    }

    /// Coordinates of one sample of one sequence.
    pub fn point(&self, sequence: usize, sample: usize) -> &[f32] {
        let start = (sequence * self.nsamples + sample) * self.ndims;
        &self.data[start..start + self.ndims]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

pub(crate) fn validate(family: SequenceFamily, nsamples: usize, ndims: usize) -> Result<()> {
    if ndims == 0 || ndims > MAX_DIMS {
        return Err(Error::InvalidDimensions(format!(
            "ndims must be in [1, {}], got {}",
            MAX_DIMS, ndims
        )));
    }

    if nsamples == 0 || nsamples > MAX_SAMPLES {
        return Err(Error::InvalidDimensions(format!(
            "nsamples must be in [1, {}], got {}",
            MAX_SAMPLES, nsamples
        )));
    }

    if family.scramble_op() == ScrambleOp::Digit && !nsamples.is_power_of_two() {
        return Err(Error::InvalidDimensions(format!(
            "{} sequences need a power-of-two sample count, got {}",
            family, nsamples
        )));
    }

    Ok(())
}

/// Generate `nsequences` independent realizations of a sequence
/// family, `nsamples` points each in `ndims` dimensions.
///
/// Sequence zero is the raw construction (scramble key zero); later
/// sequences scramble it with hash-derived keys. Blue-noise families
/// instead draw key and rank from the pre-optimised tables.
pub fn generate(
    family: SequenceFamily,
    nsequences: usize,
    nsamples: usize,
    ndims: usize,
) -> Result<PointSet> {
    validate(family, nsamples, ndims)?;

    debug!(
        "generating points";
        "family" => family.name(),
        "nsequences" => nsequences,
        "nsamples" => nsamples,
        "ndims" => ndims
    );

    let base = BaseSequence::build(family, nsamples);
    let op = family.scramble_op();

    let mut data = Vec::with_capacity(nsequences * nsamples * ndims);
    for s in 0..nsequences {
        let (key, rank) = if family.is_bn() {
            bntables::lookup(family.base(), s)?
        } else if s == 0 {
            (0, 0)
        } else {
            (rng::hash(s as u32), 0)
        };

        for i in 0..nsamples as u32 {
            let index = scramble::sequence_index(rank, i, nsamples as u32);
            for d in 0..ndims {
                let sample = scramble::apply(base.sample(index, d), key, d, op);
                data.push(sample_to_float(sample));
            }
        }
    }

    Ok(PointSet {
        nsequences,
        nsamples,
        ndims,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_names_round_trip() {
        for &family in SequenceFamily::all() {
            assert_eq!(family.name().parse::<SequenceFamily>().unwrap(), family);
        }
    }

    #[test]
    fn unknown_family_is_rejected() {
        match "halton".parse::<SequenceFamily>() {
            Err(Error::UnsupportedFamily(name)) => assert_eq!(name, "halton"),
            other => panic!("unexpected result: {:?}", other.map(|f| f.name())),
        }
    }

    #[test]
    fn dimension_limits_are_enforced() {
        assert!(generate(SequenceFamily::Sobol, 1, 16, 5).is_err());
        assert!(generate(SequenceFamily::Sobol, 1, 16, 0).is_err());
        assert!(generate(SequenceFamily::Sobol, 1, 0, 2).is_err());
        assert!(generate(SequenceFamily::Sobol, 1, MAX_SAMPLES * 2, 2).is_err());
        // Digit constructions need power-of-two sample counts.
        assert!(generate(SequenceFamily::Pmj, 1, 24, 2).is_err());
        // Lattices take any count.
        assert!(generate(SequenceFamily::Lattice, 1, 24, 2).is_ok());
    }

    #[test]
    fn generated_shape_and_range() {
        for &family in &[
            SequenceFamily::Pmj,
            SequenceFamily::Sobol,
            SequenceFamily::Lattice,
        ] {
            let points = generate(family, 3, 32, 4).unwrap();
            assert_eq!(points.as_slice().len(), 3 * 32 * 4);
            assert!(
                points.as_slice().iter().all(|&v| v >= 0.0 && v < 1.0),
                "{} produced a coordinate outside [0, 1)",
                family
            );
        }
    }

    #[test]
    fn sequence_zero_is_the_raw_sobol_construction() {
        let points = generate(SequenceFamily::Sobol, 2, 4, 2).unwrap();
        assert_eq!(points.point(0, 0), [0.0, 0.0]);
        assert_eq!(points.point(0, 1), [0.5, 0.5]);
        assert_eq!(points.point(0, 2), [0.25, 0.75]);
        assert_eq!(points.point(0, 3), [0.75, 0.25]);
        // Later sequences are scrambled realizations.
        assert_ne!(points.point(1, 1), points.point(0, 1));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate(SequenceFamily::Lattice, 2, 64, 3).unwrap();
        let b = generate(SequenceFamily::Lattice, 2, 64, 3).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }
}
