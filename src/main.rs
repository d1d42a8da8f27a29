use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kscale::aggregate;
use kscale::cluster::{Init, Kmeans, KmeansParams, ParallelKmeans, ParallelKmeansParams};
use kscale::dataset::{self, BlobParams, DelimitedSource};
use kscale::label::DEFAULT_LABEL_ENV;
use kscale::report::Report;
use kscale::store::{self, HeaderPolicy, ResultStore};
use kscale::{Error, ExperimentLabel, RunSummary, TimingHarness};

#[derive(Parser, Debug)]
#[command(name = "kscale", about = "Thread-scaling benchmarks for k-means")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time k-means fits and append the trials to a result file.
    Bench(BenchArgs),
    /// Combine result files into speed-up and throughput tables.
    Gather(GatherArgs),
}

#[derive(Args, Debug)]
struct BenchArgs {
    /// Existing directory the result file is written to.
    #[arg(long)]
    output_dir: PathBuf,

    /// Result file name (defaults to `<variant>_timings.txt`).
    #[arg(long)]
    output_file: Option<String>,

    /// Implementation under test.
    #[arg(long, value_enum, default_value_t = Variant::Parallel)]
    variant: Variant,

    /// Number of measured trials.
    #[arg(long, default_value_t = 20)]
    trials: usize,

    /// Extra trials run first and discarded.
    #[arg(long, default_value_t = 0)]
    warmup: usize,

    #[arg(long, default_value_t = 10)]
    clusters: usize,

    #[arg(long, default_value_t = 500)]
    max_iter: usize,

    #[arg(long, default_value_t = 1e-9)]
    tol: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Initialization strategy (reference variant only).
    #[arg(long, value_enum, default_value_t = InitArg::Random)]
    init: InitArg,

    /// Number of restarts (reference variant only).
    #[arg(long, default_value_t = 1)]
    n_init: usize,

    /// Delimited numeric dataset; synthetic blobs are generated when omitted.
    #[arg(long)]
    data: Option<PathBuf>,

    #[arg(long, default_value_t = ',')]
    delimiter: char,

    #[arg(long)]
    has_headers: bool,

    /// Ignore the last column of the dataset (class labels).
    #[arg(long)]
    drop_last_column: bool,

    /// Blob points per cluster.
    #[arg(long, default_value_t = 2000)]
    samples: usize,

    /// Blob dimensionality.
    #[arg(long, default_value_t = 50)]
    dims: usize,

    /// Blob standard deviation.
    #[arg(long, default_value_t = 8.0)]
    std_dev: f64,

    /// Environment variable holding the parallelism label.
    #[arg(long, default_value = DEFAULT_LABEL_ENV)]
    label_env: String,

    /// Only write the header when the result file is new (the run's trials are dropped).
    #[arg(long)]
    legacy_header: bool,
}

#[derive(Args, Debug)]
struct GatherArgs {
    /// Directories containing `*_timings.txt` files.
    #[arg(long, required = true, num_args = 1..)]
    data_directory: Vec<PathBuf>,

    /// Where to write the tables; printed to stdout when omitted.
    #[arg(long)]
    output_directory: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Variant {
    Reference,
    Parallel,
}

impl Variant {
    fn name(self) -> &'static str {
        match self {
            Variant::Reference => "reference",
            Variant::Parallel => "parallel",
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum InitArg {
    Random,
    KmeansPlusPlus,
}

impl From<InitArg> for Init {
    fn from(value: InitArg) -> Self {
        match value {
            InitArg::Random => Init::Random,
            InitArg::KmeansPlusPlus => Init::KmeansPlusPlus,
        }
    }
}

fn main() -> Result<()> {
    setup_tracing();

    match Cli::parse().command {
        Command::Bench(args) => bench(args),
        Command::Gather(args) => gather(args),
    }
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn bench(args: BenchArgs) -> Result<()> {
    if !args.output_dir.is_dir() {
        return Err(Error::MissingPath(args.output_dir).into());
    }
    let file_name = args
        .output_file
        .clone()
        .unwrap_or_else(|| store::file_name_for(args.variant.name()));
    let output = args.output_dir.join(file_name);

    let label = ExperimentLabel::from_env(&args.label_env);
    info!(%label, env = %args.label_env, "parallelism label");
    if let Some(threads) = label.thread_count() {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configuring the rayon thread pool")?;
    } else {
        warn!("label is not a thread count, rayon picks its default pool size");
    }

    let data = match &args.data {
        Some(path) => {
            let delimiter = u8::try_from(args.delimiter).context("delimiter must be ASCII")?;
            let source = DelimitedSource::new(path)
                .with_delimiter(delimiter)
                .with_headers(args.has_headers)
                .with_drop_last_column(args.drop_last_column);
            dataset::load_delimited(&source)
                .with_context(|| format!("loading dataset {}", path.display()))?
        }
        None => dataset::blobs(&BlobParams {
            n_per_cluster: args.samples,
            dims: args.dims,
            n_clusters: args.clusters,
            std_dev: args.std_dev,
            seed: args.seed,
            ..Default::default()
        })?,
    };

    info!(
        variant = args.variant.name(),
        clusters = args.clusters,
        max_iter = args.max_iter,
        tol = args.tol,
        seed = args.seed,
        "k-means configuration"
    );

    let harness = TimingHarness::new(args.trials).with_warmup(args.warmup);
    let records = match args.variant {
        Variant::Reference => {
            let params = KmeansParams {
                n_clusters: args.clusters,
                init: args.init.into(),
                n_init: args.n_init,
                tol: args.tol,
                max_iter: args.max_iter,
                seed: Some(args.seed),
            };
            harness.run(|| Kmeans::from_params(params.clone()), &data)?
        }
        Variant::Parallel => {
            let params = ParallelKmeansParams {
                n_clusters: args.clusters,
                max_iter: args.max_iter,
                tol: args.tol,
                seed: Some(args.seed),
            };
            harness.run(|| ParallelKmeans::from_params(params.clone()), &data)?
        }
    };

    if let Some(s) = RunSummary::from_records(&records) {
        println!(
            "{} trials: mean {:.3} ms, min {:.3} ms, max {:.3} ms",
            records.len(),
            s.mean_ms,
            s.min_ms,
            s.max_ms
        );
    }

    let policy = if args.legacy_header {
        HeaderPolicy::HeaderOnlyOnEmpty
    } else {
        HeaderPolicy::HeaderThenData
    };
    let outcome = ResultStore::open(&output, label)
        .with_header_policy(policy)
        .ensure_and_append(&records)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        path = %output.display(),
        header_written = outcome.header_written,
        rows = outcome.rows_written,
        "finished writing to file"
    );
    Ok(())
}

fn gather(args: GatherArgs) -> Result<()> {
    let table = aggregate::combine(&args.data_directory)?;
    let report = Report::from_table(&table);

    match &args.output_directory {
        Some(dir) => {
            for path in report.write_to(dir)? {
                println!("wrote {}", path.display());
            }
        }
        None => print!("{report}"),
    }
    Ok(())
}
