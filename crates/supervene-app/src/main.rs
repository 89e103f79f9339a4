//! Supervene Application
//!
//! Builds any dataset adapter from flags or an experiment file and reports
//! its size, sample shape and summary statistics.
//!
//! # Usage
//!
//! ```bash
//! # Synthetic bit-string chain
//! supervene build bit-string --gamma-parity 0.99 --gamma-extra 0.99 --length 10000
//!
//! # ECoG recording from a custom data directory
//! supervene --data-dir /srv/data build ecog
//!
//! # fMRI, region selection
//! supervene build fmri --variant region
//!
//! # Everything from a TOML file
//! supervene run-config experiment.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use supervene_core::math::TensorSummary;
use supervene_native::processing::ecog::EcogPreprocessing;
use supervene_native::{DataDir, Dataset, DatasetConfig, ExperimentConfig, GameOfLifeOptions};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Supervene dataset tool
#[derive(Parser, Debug)]
#[command(name = "supervene")]
#[command(
    author,
    version,
    about = "Build and inspect emergence-experiment datasets",
    long_about = None
)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Raw data directory (defaults to $SUPERVENE_DATA_DIR, then ./data)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build one dataset from flags
    Build {
        #[command(subcommand)]
        dataset: DatasetCommand,
    },

    /// Build the dataset described by a TOML experiment file
    RunConfig {
        /// Path to the experiment file
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum DatasetCommand {
    /// Correlated six-bit chain
    BitString {
        /// Probability that the group parity changes between steps
        #[arg(long, default_value = "0.99")]
        gamma_parity: f64,

        /// Probability that the extra bit repeats
        #[arg(long, default_value = "0.99")]
        gamma_extra: f64,

        /// Chain length
        #[arg(long, default_value = "10000")]
        length: usize,

        /// RNG seed (OS entropy if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Keep single observations instead of (t, t+1) pairs
        #[arg(long)]
        unpaired: bool,
    },

    /// 64-channel ECoG recording
    Ecog {
        /// Keep single observations instead of (t, t+1) pairs
        #[arg(long)]
        unpaired: bool,
    },

    /// HCP fMRI BOLD timeseries
    Fmri {
        /// Apply the default-mode-network indices to subjects or regions
        #[arg(long, value_enum, default_value = "concat")]
        variant: FmriVariant,

        /// Keep single observations (region variant is always unpaired)
        #[arg(long)]
        unpaired: bool,
    },

    /// MEG recording
    Meg,

    /// Game-of-Life simulations
    GameOfLife {
        /// Number of runs, seeded 0..n
        #[arg(long, default_value = "5000")]
        num_simulations: usize,

        /// Snapshots per run
        #[arg(long, default_value = "100")]
        time_steps: usize,

        /// Grid side length
        #[arg(long, default_value = "15")]
        grid_size: usize,

        /// Skip per-grid z-scoring
        #[arg(long)]
        no_normalize: bool,

        /// Keep single snapshots instead of (t, t+1) pairs
        #[arg(long)]
        unpaired: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FmriVariant {
    /// Default-mode-network subjects, all regions
    Concat,
    /// All subjects, default-mode-network regions
    Region,
}

impl DatasetCommand {
    fn into_config(self) -> DatasetConfig {
        match self {
            Self::BitString { gamma_parity, gamma_extra, length, seed, unpaired } => {
                DatasetConfig::BitString {
                    gamma_parity,
                    gamma_extra,
                    length,
                    prepare: !unpaired,
                    seed,
                }
            }
            Self::Ecog { unpaired } => DatasetConfig::Ecog {
                prepare: !unpaired,
                preprocessing: EcogPreprocessing::default(),
            },
            Self::Fmri { variant: FmriVariant::Concat, unpaired } => {
                DatasetConfig::FmriConcat { prepare: !unpaired, subjects: None }
            }
            Self::Fmri { variant: FmriVariant::Region, .. } => {
                DatasetConfig::FmriRegion { regions: None }
            }
            Self::Meg => DatasetConfig::Meg,
            Self::GameOfLife { num_simulations, time_steps, grid_size, no_normalize, unpaired } => {
                DatasetConfig::GameOfLife(GameOfLifeOptions {
                    prepare: !unpaired,
                    normalize: !no_normalize,
                    num_simulations,
                    time_steps,
                    grid_size,
                })
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Supervene v{}", env!("CARGO_PKG_VERSION"));

    let dataset = match cli.command {
        Commands::Build { dataset } => {
            let data = cli.data_dir.map_or_else(DataDir::from_env, DataDir::new);
            info!(root = %data.root().display(), "Data directory");
            dataset.into_config().build(&data)?
        }
        Commands::RunConfig { file } => {
            let mut experiment = ExperimentConfig::load(&file)?;
            if cli.data_dir.is_some() {
                experiment.data_dir = cli.data_dir;
            }
            info!(file = %file.display(), "Running experiment file");
            experiment.build()?
        }
    };

    report(dataset.as_ref());
    Ok(())
}

/// Log size, shape and statistics of a built dataset
fn report(dataset: &dyn Dataset) {
    let TensorSummary { count, mean, std } = dataset.summary();
    info!(
        dataset = dataset.name(),
        len = dataset.len(),
        sample_shape = ?dataset.sample_shape(),
        "Dataset built"
    );
    info!(elements = count, mean, std, "Tensor statistics");
}
