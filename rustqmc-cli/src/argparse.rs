use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

pub fn parse_args<'a>() -> ArgMatches<'a> {
    App::new("rustqmc")
        .version("0.1")
        .author("Antoine Büsch")
        .about("Quasi-Monte-Carlo sampling toolkit for rendering")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .global(true)
                .help("Log debug information"),
        )
        .arg(
            Arg::with_name("quiet")
                .long("quiet")
                .short("q")
                .global(true)
                .help("Suppress progress reporting"),
        )
        .subcommand(
            SubCommand::with_name("generate")
                .about("Generate low-discrepancy point sequences")
                .arg(
                    Arg::with_name("family")
                        .required(true)
                        .index(1)
                        .help("pmj, sobol, lattice, pmjbn, sobolbn or latticebn"),
                )
                .arg(
                    Arg::with_name("nsequences")
                        .long("nsequences")
                        .default_value("1")
                        .help("Number of independent sequences"),
                )
                .arg(
                    Arg::with_name("nsamples")
                        .long("nsamples")
                        .default_value("256")
                        .help("Samples per sequence"),
                )
                .arg(
                    Arg::with_name("ndims")
                        .long("ndims")
                        .default_value("2")
                        .help("Dimensions per sample, up to 4"),
                ),
        )
        .subcommand(
            SubCommand::with_name("optimise")
                .about("Optimise per-pixel scramble keys and ranks")
                .arg(
                    Arg::with_name("family")
                        .required(true)
                        .index(1)
                        .help("pmj, sobol or lattice"),
                )
                .arg(
                    Arg::with_name("ntests")
                        .long("ntests")
                        .default_value("1")
                        .help("Independent restarts, keeping the best"),
                )
                .arg(
                    Arg::with_name("niterations")
                        .long("niterations")
                        .default_value("32")
                        .help("Optimisation rounds per restart"),
                )
                .arg(
                    Arg::with_name("nsamples")
                        .long("nsamples")
                        .default_value("16")
                        .help("Samples per estimate"),
                )
                .arg(
                    Arg::with_name("resolution")
                        .long("resolution")
                        .default_value("64")
                        .help("Spatial grid extent, a power of two"),
                )
                .arg(
                    Arg::with_name("depth")
                        .long("depth")
                        .default_value("1")
                        .help("Temporal grid extent, a power of two"),
                )
                .arg(
                    Arg::with_name("seed")
                        .long("seed")
                        .default_value("0")
                        .help("Seed of the optimisation run"),
                ),
        )
        .subcommand(
            SubCommand::with_name("frequency")
                .about("Continuous Fourier spectrum of a generated point set")
                .arg(
                    Arg::with_name("family")
                        .required(true)
                        .index(1)
                        .help("pmj, sobol, lattice, pmjbn, sobolbn or latticebn"),
                )
                .arg(
                    Arg::with_name("nsequences")
                        .long("nsequences")
                        .default_value("16")
                        .help("Sequences averaged into the spectrum"),
                )
                .arg(
                    Arg::with_name("nsamples")
                        .long("nsamples")
                        .default_value("256")
                        .help("Samples per sequence"),
                )
                .arg(
                    Arg::with_name("ndims")
                        .long("ndims")
                        .default_value("2")
                        .help("Dimensions per sample, up to 4"),
                )
                .arg(
                    Arg::with_name("depth-a")
                        .long("depth-a")
                        .default_value("0")
                        .help("First dimension of the analysed pair"),
                )
                .arg(
                    Arg::with_name("depth-b")
                        .long("depth-b")
                        .default_value("1")
                        .help("Second dimension of the analysed pair"),
                )
                .arg(
                    Arg::with_name("resolution")
                        .long("resolution")
                        .default_value("128")
                        .help("Output spectrum resolution"),
                ),
        )
        .get_matches()
}
