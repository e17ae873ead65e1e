//! Command-line interface for the lattice sieve

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

use lattice_sieve::{
    combiner::{DEFAULT_NOISE_KICKS, DEFAULT_NOISE_STEP},
    io::{self, ReportFormat},
    sampler::PopulationSampler,
    utils::{matrix_utils, profiling, statistics, PopulationStatistics},
    CoefficientRange, Combiner, Lattice, Seeding, SieveParams, SieveSolver,
};

/// Randomized population sieve for short lattice vectors
#[derive(Parser, Debug)]
#[clap(name = "lattice-sieve")]
#[clap(about = "Search integer lattices for short nonzero vectors with a population sieve")]
#[clap(version)]
struct Args {
    /// Input file containing the lattice basis (text or JSON)
    #[clap(short, long, global = true)]
    input: Option<PathBuf>,

    /// Output file for results
    #[clap(short, long, global = true)]
    output: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,

    /// Enable verbose (debug) logging
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Set logging level (error, warn, info, debug, trace)
    #[clap(long, default_value = "info", global = true)]
    log_level: String,

    /// Output format
    #[clap(long, value_enum, default_value = "plain", global = true)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Sieve for a short vector
    Sieve {
        /// JSON file with sieve parameters; flags below override it
        #[clap(long)]
        config: Option<PathBuf>,

        /// Target population size
        #[clap(long)]
        population_size: Option<usize>,

        /// Fraction of shortest points kept each round, in (0, 1]
        #[clap(long)]
        retention: Option<f64>,

        /// Lowest random coefficient (inclusive)
        #[clap(long, allow_hyphen_values = true)]
        low: Option<i64>,

        /// Highest random coefficient (exclusive)
        #[clap(long, allow_hyphen_values = true)]
        high: Option<i64>,

        /// Combination rule
        #[clap(long, value_enum)]
        combiner: Option<CombinerCli>,

        /// Noise kicks for the noisy combiner
        #[clap(long)]
        noise_kicks: Option<usize>,

        /// Noise step for the noisy combiner (nonzero, even)
        #[clap(long)]
        noise_step: Option<i64>,

        /// Initial population mode
        #[clap(long, value_enum)]
        seeding: Option<SeedingCli>,

        /// Number of sieve rounds
        #[clap(long)]
        rounds: Option<usize>,

        /// Wall-clock budget in seconds
        #[clap(long)]
        time_budget: Option<f64>,

        /// Seed for reproducible runs
        #[clap(long)]
        seed: Option<u64>,

        /// Candidate draws per phase of a round
        #[clap(long)]
        max_attempts: Option<usize>,

        /// Rounds between progress messages
        #[clap(long)]
        log_interval: Option<usize>,
    },

    /// Generate a random basis file
    Generate {
        /// Number of rows
        #[clap(long, default_value = "10")]
        rows: usize,

        /// Number of columns (defaults to rows)
        #[clap(long)]
        cols: Option<usize>,

        /// Smallest entry
        #[clap(long, default_value = "1", allow_hyphen_values = true)]
        min_entry: i64,

        /// Largest entry
        #[clap(long, default_value = "99", allow_hyphen_values = true)]
        max_entry: i64,

        /// Comma-separated vector to plant as a basis column
        #[clap(long, value_delimiter = ',', allow_hyphen_values = true)]
        plant: Option<Vec<i64>>,

        /// Column that receives the planted vector
        #[clap(long, default_value = "0")]
        plant_column: usize,

        /// Seed for reproducible random generation
        #[clap(long)]
        seed: Option<u64>,
    },

    /// Analyze a lattice basis
    Analyze {
        /// Also seed a random population of this size and report its norms
        #[clap(long)]
        sample: Option<usize>,

        /// Seed for the sample population
        #[clap(long)]
        seed: Option<u64>,

        /// Include the orthogonalized basis
        #[clap(long)]
        detailed: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum OutputFormat {
    Plain,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CombinerCli {
    Difference,
    Average,
    ModifiedAverage,
    Noisy,
    Random,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SeedingCli {
    Basis,
    Random,
}

impl From<SeedingCli> for Seeding {
    fn from(seeding: SeedingCli) -> Self {
        match seeding {
            SeedingCli::Basis => Seeding::BasisVectors,
            SeedingCli::Random => Seeding::Random,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    setup_logging(&args)?;
    lattice_sieve::log_features();

    let command = args.command.clone();

    match command {
        Commands::Sieve {
            config,
            population_size,
            retention,
            low,
            high,
            combiner,
            noise_kicks,
            noise_step,
            seeding,
            rounds,
            time_budget,
            seed,
            max_attempts,
            log_interval,
        } => {
            let mut params = match config {
                Some(path) => load_params(&path)?,
                None => SieveParams::default(),
            };

            if let Some(n) = population_size {
                params.population_size = n;
            }
            if let Some(p) = retention {
                params.retention = p;
            }
            if let Some(l) = low {
                params.coefficient_range.low = l;
            }
            if let Some(h) = high {
                params.coefficient_range.high = h;
            }
            if let Some(c) = combiner {
                params.combiner = resolve_combiner(c, &params, noise_kicks, noise_step);
            } else if noise_kicks.is_some() || noise_step.is_some() {
                log::warn!("--noise-kicks/--noise-step only apply with --combiner noisy");
            }
            if let Some(s) = seeding {
                params.seeding = s.into();
            }
            if let Some(r) = rounds {
                params.rounds = r;
            }
            if let Some(t) = time_budget {
                params.time_budget_secs = Some(t);
            }
            if let Some(s) = seed {
                params.seed = Some(s);
            }
            if let Some(a) = max_attempts {
                params.max_attempts = a;
            }
            if let Some(i) = log_interval {
                params.log_interval = i;
            }

            run_sieve(&args, params)?;
        }
        Commands::Generate {
            rows,
            cols,
            min_entry,
            max_entry,
            plant,
            plant_column,
            seed,
        } => {
            run_generate(
                &args,
                rows,
                cols.unwrap_or(rows),
                min_entry,
                max_entry,
                plant,
                plant_column,
                seed,
            )?;
        }
        Commands::Analyze { sample, seed, detailed } => {
            run_analyze(&args, sample, seed, detailed)?;
        }
    }

    Ok(())
}

fn resolve_combiner(
    choice: CombinerCli,
    params: &SieveParams,
    kicks: Option<usize>,
    step: Option<i64>,
) -> Combiner {
    match choice {
        CombinerCli::Difference => Combiner::Difference,
        CombinerCli::Average => Combiner::Average,
        CombinerCli::ModifiedAverage => Combiner::ModifiedAverage,
        CombinerCli::Noisy => Combiner::ModifiedAverageWithNoise {
            kicks: kicks.unwrap_or(DEFAULT_NOISE_KICKS),
            step: step.unwrap_or(DEFAULT_NOISE_STEP),
        },
        CombinerCli::Random => Combiner::Random {
            range: params.coefficient_range,
        },
    }
}

fn run_sieve(args: &Args, params: SieveParams) -> Result<(), Box<dyn std::error::Error>> {
    let lattice = load_input_lattice(args)?;
    let solver = SieveSolver::with_params(params);
    log::info!("{}", solver.algorithm_info());

    let result = solver.solve(&lattice)?;
    if result.status.is_early_termination() {
        log::warn!("Sieve stopped early: {}", result.status);
    }

    let content = io::format_result(&lattice, &result, report_format(args.format))?;
    save_output(args, &content)
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    args: &Args,
    rows: usize,
    cols: usize,
    min_entry: i64,
    max_entry: i64,
    plant: Option<Vec<i64>>,
    plant_column: usize,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lattice =
        matrix_utils::generate_random_lattice(rows, cols, min_entry, max_entry, seed)?;
    if let Some(vector) = plant {
        lattice = matrix_utils::plant_short_vector(&lattice, plant_column, &vector)?;
        log::info!("Planted {:?} in column {}", vector, plant_column);
    }

    match &args.output {
        Some(path) if args.format == OutputFormat::Plain => {
            io::save_basis(&lattice, path)?;
            log::info!("Wrote {}x{} basis to {}", rows, cols, path.display());
            Ok(())
        }
        _ => {
            let content = match args.format {
                OutputFormat::Plain => format!("B =\n{}", lattice),
                OutputFormat::Json => serde_json::to_string_pretty(&lattice.basis().to_vec())?,
            };
            save_output(args, &content)
        }
    }
}

#[derive(Serialize)]
struct AnalysisReport {
    rows: usize,
    cols: usize,
    determinant: Option<f64>,
    minkowski_bound: Option<f64>,
    column_norms: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    orthogonalized: Option<Vec<Vec<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample: Option<PopulationStatistics>,
}

fn run_analyze(
    args: &Args,
    sample: Option<usize>,
    seed: Option<u64>,
    detailed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let lattice = load_input_lattice(args)?;
    let (rows, cols) = lattice.dimension();

    let orthogonalized = if detailed {
        Some(lattice.orthogonalize()?)
    } else {
        None
    };

    let sample = match sample {
        Some(n) => {
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            let mut rng = StdRng::seed_from_u64(seed);
            let sampled = profiling::profile_function("random seeding", || {
                PopulationSampler::new(&lattice).random(
                    n,
                    CoefficientRange::default(),
                    SieveParams::default().max_attempts,
                    &mut rng,
                )
            })?;
            Some(statistics::population_statistics(&sampled.population))
        }
        None => None,
    };

    let report = AnalysisReport {
        rows,
        cols,
        determinant: lattice.determinant().ok(),
        minkowski_bound: lattice.minkowski_bound().ok(),
        column_norms: lattice.column_norms()?,
        orthogonalized,
        sample,
    };

    let content = match args.format {
        OutputFormat::Plain => format_analysis(&report),
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
    };
    save_output(args, &content)
}

fn format_analysis(report: &AnalysisReport) -> String {
    let mut output = String::new();
    output.push_str("Lattice Analysis:\n");
    output.push_str(&format!("Dimensions: {}x{}\n", report.rows, report.cols));
    match report.determinant {
        Some(det) => output.push_str(&format!("Determinant: {:.6e}\n", det)),
        None => output.push_str("Determinant: n/a (non-square basis)\n"),
    }
    if let Some(bound) = report.minkowski_bound {
        output.push_str(&format!("Minkowski bound: {:.4}\n", bound));
    }
    let norms = report
        .column_norms
        .iter()
        .map(|n| format!("{:.3}", n))
        .collect::<Vec<_>>()
        .join(", ");
    output.push_str(&format!("Column norms: [{}]\n", norms));

    if let Some(ortho) = &report.orthogonalized {
        output.push_str("Orthogonalized (columns):\n");
        for row in ortho {
            let line = row.iter().map(|v| format!("{:.3}", v)).collect::<Vec<_>>().join(", ");
            output.push_str(&format!("  [{}]\n", line));
        }
    }

    if let Some(stats) = &report.sample {
        output.push_str(&format!(
            "Sample of {}: min {:.3}, mean {:.3}, max {:.3}, std dev {:.3}\n",
            stats.count, stats.min_norm, stats.mean_norm, stats.max_norm, stats.std_dev
        ));
    }
    output
}

fn setup_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    use env_logger::Builder;
    use log::LevelFilter;

    let level_filter = if args.verbose {
        LevelFilter::Debug
    } else {
        match args.log_level.as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        }
    };

    let mut builder = Builder::from_default_env();
    builder.filter_level(level_filter);
    builder.try_init()?;

    Ok(())
}

fn load_params(path: &Path) -> Result<SieveParams, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
    let params: SieveParams = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
    log::debug!("Loaded sieve parameters from {}", path.display());
    Ok(params)
}

fn load_input_lattice(args: &Args) -> Result<Lattice, Box<dyn std::error::Error>> {
    match &args.input {
        Some(path) => {
            if path.exists() {
                io::load_basis(path).map_err(|e| {
                    format!("Failed to load lattice from {}: {}", path.display(), e).into()
                })
            } else {
                Err(format!("Input file {} does not exist", path.display()).into())
            }
        }
        None => {
            log::warn!("No input file specified, using a random 8x8 test lattice");
            matrix_utils::generate_random_lattice(8, 8, 1, 99, Some(42))
                .map_err(|e| format!("Failed to generate test lattice: {}", e).into())
        }
    }
}

fn report_format(format: OutputFormat) -> ReportFormat {
    match format {
        OutputFormat::Plain => ReportFormat::Plain,
        OutputFormat::Json => ReportFormat::Json,
    }
}

fn save_output(args: &Args, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match args.output {
        Some(ref path) => {
            io::write_output(path, content)
                .map_err(|e| format!("Failed to write output to {}: {}", path.display(), e).into())
        }
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
