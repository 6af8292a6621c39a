use clap::Parser;
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use multisite_sampler::fasta::{base_frequencies, read_fasta};
use multisite_sampler::pwm::{read_meme, PwmModel};
use multisite_sampler::state::SamplerState;
use multisite_sampler::store::MemorySiteStore;
use multisite_sampler::{
    MultiSampler, PriorFamily, SamplerConfig, SamplerError, SequenceModel, Site, SweepMode,
};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sampler error: {0}")]
    Sampler(#[from] SamplerError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("At least one chain is required")]
    NoChains,
}

#[derive(Parser)]
#[command(
    name = "multisite",
    about = "Samples multiple motif sites per sequence with a prior on the number of sites",
    long_about = "Runs a multi-site Gibbs sampler over DNA sequences. Each sweep resamples the \
                  sites of every sequence: a site count is drawn from a truncated Poisson or \
                  Gamma prior, then non-overlapping sites are placed from the PWM likelihood \
                  ratio profile. The best state seen is written as a table of sites.",
    version,
    after_help = "Example usage:\n    \
                  multisite seqs.fasta motifs.meme --prior poisson -M 2 --sweeps 50\n    \
                  multisite seqs.fasta motifs.meme --config sampler.json -O sites.tsv",
    color = clap::ColorChoice::Always
)]
#[derive(Debug)]
struct Args {
    /// Path to input sequences (FASTA format)
    #[arg(value_name = "FASTA_FILE")]
    fasta_file: String,

    /// Path to .meme format file containing the motif PWMs
    /// All motifs must share one width
    #[arg(value_name = "PWM_FILE")]
    pwm_file: String,

    /// Output path for the site table; stdout when omitted
    #[arg(short = 'O', long = "output")]
    output_file: Option<String>,

    /// JSON sampler configuration; flags below override its values
    #[arg(long)]
    config: Option<String>,

    /// Amount of overlap allowed between sites
    #[arg(short = 'o', long, value_parser = clap::value_parser!(u32).range(0..=30))]
    overlap: Option<u32>,

    /// Prior distribution for number of motif sites per sequence
    #[arg(long, value_parser = ["poisson", "gamma"])]
    prior: Option<String>,

    /// Expected mean number of motif sites per sequence
    #[arg(short = 'M', long = "prior-param", value_parser = clap::value_parser!(u32).range(0..=100))]
    prior_param: Option<u32>,

    /// Minimum number of sites per sequence
    #[arg(long)]
    min: Option<usize>,

    /// Maximum number of sites per sequence
    #[arg(long)]
    max: Option<usize>,

    /// Number of sweeps to run
    #[arg(long, default_value = "100")]
    sweeps: usize,

    /// Visit sequences at random instead of in order
    #[arg(long)]
    random: bool,

    /// Take the best motif and position instead of sampling
    #[arg(long = "no-sample")]
    no_sample: bool,

    /// Random seed of the first chain
    #[arg(long)]
    seed: Option<u64>,

    /// Number of independent chains, run in parallel
    #[arg(long, default_value = "1")]
    chains: usize,

    /// Number of threads for the chains
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Score the reverse complement strand as well
    #[arg(long = "both-strands")]
    both_strands: bool,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbosity: u8,
}

fn init_verbose(args: &Args) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn build_config(args: &Args) -> Result<SamplerConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => SamplerConfig::from_json_str(&fs::read_to_string(path)?)?,
        None => SamplerConfig::default(),
    };
    if let Some(overlap) = args.overlap {
        config.overlap = overlap as usize;
    }
    if let Some(prior) = &args.prior {
        config.prior = prior.parse::<PriorFamily>()?;
    }
    if let Some(param) = args.prior_param {
        config.prior_param = param;
    }
    if let Some(min) = args.min {
        config.min_per_seq = min;
    }
    if let Some(max) = args.max {
        config.max_per_seq = max;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.random {
        config.sweep_mode = SweepMode::Random;
    }
    if args.no_sample {
        config.deterministic = true;
    }
    config.validate()?;
    Ok(config)
}

type ChainState = SamplerState<Vec<Vec<Site>>>;

/// Runs one chain and returns the state holding the most sites.
fn run_chain(
    config: SamplerConfig,
    model: PwmModel,
    sweeps: usize,
) -> Result<ChainState, SamplerError> {
    let store = MemorySiteStore::new(
        model.sequence_lengths(),
        model.motif_width(),
        config.overlap,
    );
    let seed = config.seed;
    let mode = config.sweep_mode;
    let mut sampler = MultiSampler::new(config, model, store)?;
    let mut best = sampler.snapshot();

    for sweep in 0..sweeps {
        let report = sampler.run_sweep(mode);
        let total = sampler.counts().total_sites();
        log::debug!(
            "chain {:#x} sweep {}: {} sites accepted, {} attempts",
            seed,
            sweep + 1,
            report.sites_accepted,
            report.attempts
        );
        if total > best.total_sites() {
            best = sampler.snapshot();
        }
    }

    log::info!(
        "chain {:#x}: best state holds {} sites",
        seed,
        best.total_sites()
    );
    Ok(best)
}

fn write_sites<W: Write>(
    out: W,
    state: &ChainState,
    labels: &[String],
    motifs: &[String],
) -> io::Result<()> {
    let mut out = BufWriter::new(out);
    writeln!(out, "sequence\tposition\tmotif")?;
    for site in state.sites.iter().flatten() {
        writeln!(
            out,
            "{}\t{}\t{}",
            labels[site.seq], site.position, motifs[site.motif]
        )?;
    }
    out.flush()
}

fn main() -> Result<(), CliError> {
    let start_time = std::time::Instant::now();

    let args = Args::parse();
    init_verbose(&args);
    log::info!("{} {} start", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if args.chains == 0 {
        return Err(CliError::NoChains);
    }
    let config = build_config(&args)?;

    let records = read_fasta(&args.fasta_file)?;
    let motifs = read_meme(&args.pwm_file)?;
    log::info!("{} sequences, {} motifs", records.len(), motifs.len());
    let background = base_frequencies(&records);
    let model = PwmModel::new(&records, motifs, background, args.both_strands)?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()?;

    let best = (0..args.chains)
        .into_par_iter()
        .map(|chain| {
            let mut chain_config = config.clone();
            chain_config.seed = config.seed.wrapping_add(chain as u64);
            run_chain(chain_config, model.clone(), args.sweeps)
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .max_by_key(|state| state.total_sites())
        .ok_or(CliError::NoChains)?;

    let labels: Vec<String> = records.into_iter().map(|r| r.label).collect();
    match &args.output_file {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent() {
                fs::create_dir_all(parent)?;
            }
            write_sites(File::create(path)?, &best, &labels, model.motif_names())?;
        }
        None => write_sites(io::stdout().lock(), &best, &labels, model.motif_names())?,
    }

    log::info!("Total execution time: {:.2?}", start_time.elapsed());
    Ok(())
}
