//! Quasi-Monte-Carlo sampling toolkit for rendering.
//!
//! The crate builds low-discrepancy point sequences (progressive
//! multi-jittered, Sobol and rank-1 lattice constructions, plus
//! blue-noise optimised variants), searches for per-pixel scramble
//! parameters that push integration error into high spatial
//! frequencies, and exposes spectral analysis entry points for
//! diagnostics.

extern crate crossbeam;
extern crate failure;
#[macro_use]
extern crate failure_derive;
extern crate indicatif;
#[macro_use]
extern crate lazy_static;
extern crate num_cpus;
extern crate parking_lot;
#[macro_use]
extern crate slog;
#[macro_use]
extern crate slog_scope;

#[cfg(test)]
#[macro_use]
extern crate approx;
#[cfg(test)]
extern crate rand;

pub mod bits;
pub mod block_queue;
pub mod bntables;
pub mod errors;
pub mod estimator;
pub mod frequency;
pub mod grid;
pub mod optimise;
pub mod progress;
pub mod rng;
pub mod sampler;
pub mod scramble;
pub mod shapes;

pub use errors::{Error, Result};
pub use frequency::{frequency_band, frequency_continuous, frequency_discrete_2d,
                    frequency_discrete_3d};
pub use grid::Grid3;
pub use optimise::{optimise, optimise_observed, OptimiseParams, OptimizationOutput, RoundReport};
pub use sampler::{generate, PointSet, SequenceFamily};

/// Largest f32 strictly less than one. Samples are clamped to this so
/// that every generated coordinate stays inside [0, 1).
pub const ONE_MINUS_EPSILON: f32 = 1.0 - ::std::f32::EPSILON / 2.0;
