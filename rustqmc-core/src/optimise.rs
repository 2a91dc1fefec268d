//! Per-pixel scramble parameter search. Every screen-space slot of a
//! (resolution, resolution, depth) grid gets its own scramble key and
//! rank, optimised so that neighbouring slots carry decorrelated
//! integration error; the residual error field then concentrates in
//! high spatial frequencies where it is least objectionable. The
//! method follows 'Lessons Learned and Improvements when Building
//! Screen-Space Samplers with Blue-Noise Error Distribution' by
//! Belcour and Heitz.

use std::sync::mpsc::channel;

use crossbeam;
use indicatif::ProgressBar;
use num_cpus;

use block_queue::BlockQueue;
use errors::{Error, Result};
use estimator;
use frequency;
use grid::{Grid3, GridShape};
use progress;
use rng::{self, RNG};
use sampler::{self, BaseSequence, SequenceFamily};
use scramble::ScrambleOp;
use shapes::{OrientedHeaviside, QuarterGaussian, Shape};

/// Size of the per-slot error vector: how many oriented heaviside
/// integrands contribute to a slot's error signature.
const ERROR_TESTS: usize = 16;

/// Half width of the Gaussian neighbourhood kernels, in slots.
const KERNEL_WIDTH: isize = 6;

const SIGMA_SPATIAL: f32 = 2.1;
const SIGMA_TEMPORAL: f32 = 1.5;

/// Pixel blocks handed to one worker at a time.
const BLOCK_SIZE: u32 = 8;

/// Caller-facing parameter set of one optimisation call.
#[derive(Debug, Copy, Clone)]
pub struct OptimiseParams {
    pub family: SequenceFamily,
    /// Independent restarts; the best-scoring restart is returned.
    pub ntests: usize,
    /// Full rounds over the grid per restart.
    pub niterations: usize,
    /// Samples per estimate.
    pub nsamples: usize,
    /// Spatial grid extent, a power of two.
    pub resolution: usize,
    /// Temporal grid extent, a power of two.
    pub depth: usize,
    pub seed: u32,
}

/// The four result grids of a finished run, all shaped (resolution,
/// resolution, depth).
#[derive(Debug, Clone)]
pub struct OptimizationOutput {
    pub keys: Grid3<u32>,
    pub ranks: Grid3<u32>,
    pub estimates: Grid3<f32>,
    pub frequencies: Grid3<f32>,
}

/// Per-round progress record handed to the observer hook.
#[derive(Debug, Copy, Clone)]
pub struct RoundReport {
    /// Restart index.
    pub test: usize,
    /// Round index within the restart.
    pub iteration: usize,
    /// Slots whose proposal was accepted this round.
    pub accepted: usize,
    /// Total objective of the grid after this round.
    pub objective: f64,
    /// Best total objective seen so far in this restart.
    pub retained: f64,
}

/// Mutable per-restart state: one value per slot, error vectors flat
/// with `ERROR_TESTS` entries per slot.
#[derive(Clone)]
struct TrialState {
    keys: Vec<u32>,
    ranks: Vec<u32>,
    estimates: Vec<f32>,
    errors: Vec<f32>,
}

impl TrialState {
    fn new(nslots: usize) -> TrialState {
        TrialState {
            keys: vec![0; nslots],
            ranks: vec![0; nslots],
            estimates: vec![0.0; nslots],
            errors: vec![0.0; nslots * ERROR_TESTS],
        }
    }
}

struct SlotUpdate {
    slot: usize,
    objective: f32,
    accepted: Option<Accepted>,
}

struct Accepted {
    key: u32,
    rank: u32,
    estimate: f32,
    errors: Vec<f32>,
}

/// Precomputed Gaussian kernels and shared inputs of one run.
struct Driver {
    params: OptimiseParams,
    shape: GridShape,
    sequence: BaseSequence,
    op: ScrambleOp,
    heavisides: Vec<OrientedHeaviside>,
    spatial: Vec<f32>,
    temporal: Vec<f32>,
}

impl Driver {
    fn new(params: OptimiseParams) -> Driver {
        let width = (2 * KERNEL_WIDTH + 1) as usize;

        let mut spatial = Vec::with_capacity(width * width);
        for j in -KERNEL_WIDTH..=KERNEL_WIDTH {
            for i in -KERNEL_WIDTH..=KERNEL_WIDTH {
                let r2 = (i * i + j * j) as f32;
                spatial.push((-r2 / (SIGMA_SPATIAL * SIGMA_SPATIAL)).exp());
            }
        }

        let mut temporal = Vec::with_capacity(width);
        for i in -KERNEL_WIDTH..=KERNEL_WIDTH {
            let r2 = (i * i) as f32;
            temporal.push((-r2 / (SIGMA_TEMPORAL * SIGMA_TEMPORAL)).exp());
        }

        Driver {
            shape: GridShape::new(params.resolution, params.depth),
            sequence: BaseSequence::build(params.family, params.nsamples),
            op: params.family.scramble_op(),
            heavisides: OrientedHeaviside::build(ERROR_TESTS),
            spatial,
            temporal,
            params,
        }
    }

    /// Estimate plus error vector of one slot under the given scramble
    /// parameters.
    fn measure(&self, key: u32, rank: u32, errors: &mut [f32]) -> f32 {
        let nsamples = self.params.nsamples as u32;

        for (error, heaviside) in errors.iter_mut().zip(&self.heavisides) {
            *error = estimator::evaluate(&self.sequence, self.op, key, rank, nsamples, heaviside);
        }

        estimator::evaluate(&self.sequence, self.op, key, rank, nsamples, &QuarterGaussian)
    }

    /// Scalar objective of a slot: squared deviation of its reference
    /// estimate, minus the kernel-weighted error-vector distance to
    /// its neighbours. Neighbour reads come from the round snapshot;
    /// lower is better, so descent decorrelates neighbours.
    fn objective(
        &self,
        x: usize,
        y: usize,
        z: usize,
        estimate: f32,
        slot_errors: &[f32],
        snapshot: &[f32],
    ) -> f32 {
        let deviation = estimate - QuarterGaussian.integral();
        deviation * deviation - self.neighbourhood(x, y, z, slot_errors, snapshot)
    }

    fn neighbourhood(
        &self,
        x: usize,
        y: usize,
        z: usize,
        slot_errors: &[f32],
        snapshot: &[f32],
    ) -> f32 {
        let width = (2 * KERNEL_WIDTH + 1) as usize;

        let mut sum = 0.0;
        for j in -KERNEL_WIDTH..=KERNEL_WIDTH {
            for i in -KERNEL_WIDTH..=KERNEL_WIDTH {
                let q = self
                    .shape
                    .wrapping_index(x as isize + i, y as isize + j, z as isize);
                if q == self.shape.index(x, y, z) {
                    continue;
                }

                let weight = self.spatial
                    [(j + KERNEL_WIDTH) as usize * width + (i + KERNEL_WIDTH) as usize];
                sum += weight * distance_squared(slot_errors, neighbour_errors(snapshot, q));
            }
        }

        for i in -KERNEL_WIDTH..=KERNEL_WIDTH {
            let q = self
                .shape
                .wrapping_index(x as isize, y as isize, z as isize + i);
            if q == self.shape.index(x, y, z) {
                continue;
            }

            let weight = self.temporal[(i + KERNEL_WIDTH) as usize];
            sum += weight * distance_squared(slot_errors, neighbour_errors(snapshot, q));
        }

        sum
    }
}

fn neighbour_errors(snapshot: &[f32], slot: usize) -> &[f32] {
    &snapshot[slot * ERROR_TESTS..(slot + 1) * ERROR_TESTS]
}

fn distance_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

/// Deterministic proposal stream for one (restart, round, slot) cell.
/// Worker decisions depend only on this chain and the round snapshot,
/// never on thread interleaving.
fn proposal_stream(seed: u32, test: u32, iteration: u32, slot: u32) -> RNG {
    let mut h = rng::hash(seed);
    h = rng::hash(h.wrapping_add(test));
    h = rng::hash(h.wrapping_add(iteration));
    h = rng::hash(h.wrapping_add(slot));

    RNG::with_seed(h)
}

fn validate(params: &OptimiseParams) -> Result<()> {
    sampler::validate(params.family, params.nsamples, 2)?;

    if params.ntests == 0 {
        return Err(Error::InvalidDimensions(
            "ntests must be at least one".to_string(),
        ));
    }

    if !params.resolution.is_power_of_two() || !params.depth.is_power_of_two() {
        return Err(Error::InvalidDimensions(format!(
            "resolution and depth must be powers of two, got {} and {}",
            params.resolution, params.depth
        )));
    }

    Ok(())
}

/// Search per-slot scramble parameters for the given family. See
/// [`optimise_observed`] for the run structure; this entry point
/// discards the per-round reports.
pub fn optimise(params: &OptimiseParams) -> Result<OptimizationOutput> {
    optimise_observed(params, |_| {})
}

/// As [`optimise`], invoking `observer` after every completed round.
///
/// Each of the `ntests` restarts seeds its key grid from a hash of the
/// caller seed, then runs `niterations` full rounds over the grid.
/// A round proposes a fresh (key, rank) pair for every slot, scores it
/// against a read-only snapshot of the previous round, and commits
/// only strict improvements. The best-scoring round of the
/// best-scoring restart is returned. Identical parameters give
/// bit-identical grids.
///
/// With `niterations` of zero, the initial all-zero grids come back
/// untouched and no work is performed.
pub fn optimise_observed<F>(params: &OptimiseParams, mut observer: F) -> Result<OptimizationOutput>
where
    F: FnMut(&RoundReport),
{
    validate(params)?;

    let shape = GridShape::new(params.resolution, params.depth);

    if params.niterations == 0 {
        return Ok(OptimizationOutput {
            keys: Grid3::new(shape),
            ranks: Grid3::new(shape),
            estimates: Grid3::new(shape),
            frequencies: Grid3::new(shape),
        });
    }

    info!(
        "optimising scramble parameters";
        "family" => params.family.name(),
        "ntests" => params.ntests,
        "niterations" => params.niterations,
        "nsamples" => params.nsamples,
        "resolution" => params.resolution,
        "depth" => params.depth,
        "seed" => params.seed
    );

    let driver = Driver::new(*params);

    let bar = progress::bar(
        (params.ntests * params.niterations) as u64,
        "Optimising scramble parameters",
    );

    let mut best: Option<(f64, TrialState)> = None;

    for test in 0..params.ntests {
        let (objective, state) = run_test(&driver, test, &mut observer, &bar)?;

        debug!("restart finished"; "test" => test, "objective" => objective);

        let improved = match best {
            Some((best_objective, _)) => objective < best_objective,
            None => true,
        };
        if improved {
            best = Some((objective, state));
        }
    }

    bar.finish_and_clear();

    // ntests >= 1, so a best restart always exists.
    let (_, state) = best
        .ok_or_else(|| Error::NativeFailure("no optimisation restart completed".to_string()))?;

    let frequencies =
        frequency::frequency_discrete_3d(&state.estimates, params.resolution, params.depth)?;

    Ok(OptimizationOutput {
        keys: Grid3::from_vec(shape, state.keys),
        ranks: Grid3::from_vec(shape, state.ranks),
        estimates: Grid3::from_vec(shape, state.estimates),
        frequencies: Grid3::from_vec(shape, frequencies),
    })
}

/// One restart: seed the grids, run the rounds, return the retained
/// best state and its total objective.
fn run_test<F>(
    driver: &Driver,
    test: usize,
    observer: &mut F,
    bar: &ProgressBar,
) -> Result<(f64, TrialState)>
where
    F: FnMut(&RoundReport),
{
    let params = &driver.params;
    let shape = driver.shape;
    let nslots = shape.len();

    // INIT: seed-derived keys, identity ranks, fresh measurements.
    let mut cur = TrialState::new(nslots);
    let mut init_rng = RNG::with_seed(rng::hash(params.seed).wrapping_add(test as u32));
    for key in cur.keys.iter_mut() {
        *key = init_rng.uniform_u32();
    }

    for slot in 0..nslots {
        let errors = &mut cur.errors[slot * ERROR_TESTS..(slot + 1) * ERROR_TESTS];
        cur.estimates[slot] = driver.measure(cur.keys[slot], cur.ranks[slot], errors);
    }

    let mut objectives = vec![0.0f32; nslots];
    for slot in 0..nslots {
        let (x, y, z) = shape.coordinate(slot);
        objectives[slot] = driver.objective(
            x,
            y,
            z,
            cur.estimates[slot],
            neighbour_errors(&cur.errors, slot),
            &cur.errors,
        );
    }

    let mut retained = total_objective(&objectives);
    let mut best = cur.clone();

    let mut next = cur.clone();

    for iteration in 0..params.niterations {
        next.clone_from(&cur);

        let mut accepted_count = 0;

        let queue = BlockQueue::new(
            (
                params.resolution as u32,
                (params.resolution * params.depth) as u32,
            ),
            BLOCK_SIZE,
        );
        let nthreads = num_cpus::get().max(1);
        let (tx, rx) = channel::<Vec<SlotUpdate>>();

        let snapshot = &cur;
        let queue_ref = &queue;
        let driver_ref = driver;

        crossbeam::scope(|scope| {
            for _ in 0..nthreads {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    while let Some(block) = queue_ref.next() {
                        let mut updates = Vec::with_capacity(block.area() as usize);
                        for (x, row) in block {
                            let x = x as usize;
                            let y = row as usize % params.resolution;
                            let z = row as usize / params.resolution;
                            let slot = shape.index(x, y, z);

                            let mut stream = proposal_stream(
                                params.seed,
                                test as u32,
                                iteration as u32,
                                slot as u32,
                            );
                            let key = stream.uniform_u32();
                            let rank = stream.uniform_u32_bounded(params.nsamples as u32);

                            let current = driver_ref.objective(
                                x,
                                y,
                                z,
                                snapshot.estimates[slot],
                                neighbour_errors(&snapshot.errors, slot),
                                &snapshot.errors,
                            );

                            let mut errors = vec![0.0f32; ERROR_TESTS];
                            let estimate = driver_ref.measure(key, rank, &mut errors);
                            let candidate =
                                driver_ref.objective(x, y, z, estimate, &errors, &snapshot.errors);

                            let update = if candidate < current {
                                SlotUpdate {
                                    slot,
                                    objective: candidate,
                                    accepted: Some(Accepted {
                                        key,
                                        rank,
                                        estimate,
                                        errors,
                                    }),
                                }
                            } else {
                                SlotUpdate {
                                    slot,
                                    objective: current,
                                    accepted: None,
                                }
                            };
                            updates.push(update);
                        }

                        if tx.send(updates).is_err() {
                            return;
                        }
                    }
                });
            }
            drop(tx);

            for updates in rx.iter() {
                for update in updates {
                    objectives[update.slot] = update.objective;
                    if let Some(accepted) = update.accepted {
                        accepted_count += 1;
                        next.keys[update.slot] = accepted.key;
                        next.ranks[update.slot] = accepted.rank;
                        next.estimates[update.slot] = accepted.estimate;
                        next.errors[update.slot * ERROR_TESTS..(update.slot + 1) * ERROR_TESTS]
                            .copy_from_slice(&accepted.errors);
                    }
                }
            }
        })
        .map_err(|_| Error::NativeFailure("optimisation worker panicked".to_string()))?;

        ::std::mem::swap(&mut cur, &mut next);

        let objective = total_objective(&objectives);
        if objective < retained {
            retained = objective;
            best.clone_from(&cur);
        }

        observer(&RoundReport {
            test,
            iteration,
            accepted: accepted_count,
            objective,
            retained,
        });
        bar.inc(1);
    }

    Ok((retained, best))
}

fn total_objective(objectives: &[f32]) -> f64 {
    objectives.iter().map(|&o| f64::from(o)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> OptimiseParams {
        OptimiseParams {
            family: SequenceFamily::Sobol,
            ntests: 1,
            niterations: 2,
            nsamples: 8,
            resolution: 8,
            depth: 2,
            seed: 11,
        }
    }

    #[test]
    fn zero_iterations_return_zero_grids() {
        let mut params = params();
        params.niterations = 0;

        let out = optimise(&params).unwrap();
        assert!(out.keys.as_slice().iter().all(|&k| k == 0));
        assert!(out.ranks.as_slice().iter().all(|&r| r == 0));
        assert!(out.estimates.as_slice().iter().all(|&e| e == 0.0));
        assert!(out.frequencies.as_slice().iter().all(|&f| f == 0.0));
    }

    #[test]
    fn parameters_are_validated() {
        let mut bad = params();
        bad.resolution = 12;
        assert!(optimise(&bad).is_err());

        let mut bad = params();
        bad.ntests = 0;
        assert!(optimise(&bad).is_err());

        let mut bad = params();
        bad.nsamples = 0;
        assert!(optimise(&bad).is_err());
    }

    #[test]
    fn ranks_stay_within_the_sample_count() {
        let out = optimise(&params()).unwrap();
        assert!(out.ranks.as_slice().iter().all(|&r| r < 8));
    }

    #[test]
    fn retained_objective_never_worsens() {
        let mut last: Option<f64> = None;
        optimise_observed(&params(), |report| {
            if let Some(last) = last {
                assert!(report.retained <= last);
            }
            last = Some(report.retained);
        })
        .unwrap();
        assert!(last.is_some());
    }
}
