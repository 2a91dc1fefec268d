extern crate clap;
#[macro_use]
extern crate failure;
extern crate rustqmc_core as qmc;
#[macro_use]
extern crate slog;
#[macro_use]
extern crate slog_scope;
extern crate slog_term;

mod argparse;

use std::fmt::Display;
use std::io::{self, BufWriter, Write};
use std::str::FromStr;

use clap::ArgMatches;
use failure::Error;
use slog::{Drain, Level, LevelFilter, Logger};

use qmc::{Grid3, OptimiseParams, SequenceFamily};

fn main() {
    let matches = argparse::parse_args();

    let level = if matches.is_present("verbose") {
        Level::Debug
    } else {
        Level::Info
    };
    let _guard = configure_logger(level);

    if matches.is_present("quiet") {
        qmc::progress::set_enabled(false);
    }

    if let Err(ref e) = run(&matches) {
        error!("Application error: {}", e);
        ::std::process::exit(1);
    }
}

fn configure_logger(level: Level) -> slog_scope::GlobalLoggerGuard {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = ::std::sync::Mutex::new(drain).fuse();
    let drain = LevelFilter::new(drain, level).fuse();

    slog_scope::set_global_logger(Logger::root(drain, o!()))
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    match matches.subcommand() {
        ("generate", Some(matches)) => generate(matches),
        ("optimise", Some(matches)) => optimise(matches),
        ("frequency", Some(matches)) => frequency(matches),
        _ => unreachable!(),
    }
}

fn family_arg(matches: &ArgMatches) -> Result<SequenceFamily, Error> {
    // "family" is a required positional argument.
    Ok(matches.value_of("family").unwrap().parse()?)
}

fn parse_arg<T>(matches: &ArgMatches, name: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing value for --{}", name))?
        .parse()
        .map_err(|e| format_err!("invalid value for --{}: {}", name, e))
}

fn generate(matches: &ArgMatches) -> Result<(), Error> {
    let family = family_arg(matches)?;
    let nsequences = parse_arg(matches, "nsequences")?;
    let nsamples = parse_arg(matches, "nsamples")?;
    let ndims = parse_arg(matches, "ndims")?;

    let points = qmc::generate(family, nsequences, nsamples, ndims)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for s in 0..points.nsequences() {
        if s > 0 {
            writeln!(out)?;
        }
        for i in 0..points.nsamples() {
            let coordinates: Vec<String> =
                points.point(s, i).iter().map(|v| v.to_string()).collect();
            writeln!(out, "{}", coordinates.join(" "))?;
        }
    }

    Ok(())
}

fn optimise(matches: &ArgMatches) -> Result<(), Error> {
    let params = OptimiseParams {
        family: family_arg(matches)?,
        ntests: parse_arg(matches, "ntests")?,
        niterations: parse_arg(matches, "niterations")?,
        nsamples: parse_arg(matches, "nsamples")?,
        resolution: parse_arg(matches, "resolution")?,
        depth: parse_arg(matches, "depth")?,
        seed: parse_arg(matches, "seed")?,
    };

    let output = qmc::optimise(&params)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_grid(&mut out, "keys", &output.keys)?;
    write_grid(&mut out, "ranks", &output.ranks)?;
    write_grid(&mut out, "estimates", &output.estimates)?;
    write_grid(&mut out, "frequencies", &output.frequencies)?;

    Ok(())
}

fn frequency(matches: &ArgMatches) -> Result<(), Error> {
    let family = family_arg(matches)?;
    let nsequences = parse_arg(matches, "nsequences")?;
    let nsamples = parse_arg(matches, "nsamples")?;
    let ndims = parse_arg(matches, "ndims")?;
    let depth_a = parse_arg(matches, "depth-a")?;
    let depth_b = parse_arg(matches, "depth-b")?;
    let resolution: usize = parse_arg(matches, "resolution")?;

    let points = qmc::generate(family, nsequences, nsamples, ndims)?;
    let spectrum = qmc::frequency_continuous(
        nsequences,
        nsamples,
        ndims,
        depth_a,
        depth_b,
        resolution,
        points.as_slice(),
    )?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in spectrum.chunks(resolution) {
        let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", values.join(" "))?;
    }

    Ok(())
}

fn write_grid<W, T>(out: &mut W, header: &str, grid: &Grid3<T>) -> Result<(), Error>
where
    W: Write,
    T: Display,
{
    writeln!(out, "# {}", header)?;

    let shape = grid.shape();
    for z in 0..shape.depth {
        if z > 0 {
            writeln!(out)?;
        }
        for y in 0..shape.resolution {
            let values: Vec<String> = (0..shape.resolution)
                .map(|x| grid.get(x, y, z).to_string())
                .collect();
            writeln!(out, "{}", values.join(" "))?;
        }
    }

    Ok(())
}
