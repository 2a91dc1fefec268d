extern crate rustqmc_core as qmc;

use qmc::estimator;
use qmc::rng::{self, RNG};
use qmc::sampler::BaseSequence;
use qmc::shapes::QuarterGaussian;
use qmc::{frequency_band, frequency_discrete_2d, optimise, OptimiseParams, SequenceFamily};

fn params() -> OptimiseParams {
    OptimiseParams {
        family: SequenceFamily::Sobol,
        ntests: 1,
        niterations: 16,
        nsamples: 16,
        resolution: 16,
        depth: 1,
        seed: 7,
    }
}

#[test]
fn identical_parameters_give_identical_grids() {
    let a = optimise(&params()).unwrap();
    let b = optimise(&params()).unwrap();

    assert_eq!(a.keys.as_slice(), b.keys.as_slice());
    assert_eq!(a.ranks.as_slice(), b.ranks.as_slice());
    assert_eq!(a.estimates.as_slice(), b.estimates.as_slice());
    assert_eq!(a.frequencies.as_slice(), b.frequencies.as_slice());
}

#[test]
fn optimisation_moves_error_out_of_low_frequencies() {
    let params = params();
    let out = optimise(&params).unwrap();

    // Rebuild the estimate field the run starts from: sequential
    // seed-derived keys, identity ranks.
    let sequence = BaseSequence::build(params.family, params.nsamples);
    let op = params.family.scramble_op();
    let mut init_rng = RNG::with_seed(rng::hash(params.seed));

    let nslots = params.resolution * params.resolution;
    let mut initial = Vec::with_capacity(nslots);
    for _ in 0..nslots {
        let key = init_rng.uniform_u32();
        initial.push(estimator::evaluate(
            &sequence,
            op,
            key,
            0,
            params.nsamples as u32,
            &QuarterGaussian,
        ));
    }

    let radius = params.resolution as f32 / 4.0;
    let before = frequency_band(
        &frequency_discrete_2d(&initial, params.resolution).unwrap(),
        params.resolution,
        radius,
    )
    .unwrap();
    let after = frequency_band(
        out.frequencies.as_slice(),
        params.resolution,
        radius,
    )
    .unwrap();

    assert!(
        after < before,
        "low-frequency energy grew: {} -> {}",
        before,
        after
    );
}

#[test]
fn results_depend_on_the_seed() {
    let a = optimise(&params()).unwrap();

    let mut reseeded = params();
    reseeded.seed = 8;
    let b = optimise(&reseeded).unwrap();

    assert_ne!(a.keys.as_slice(), b.keys.as_slice());
}
