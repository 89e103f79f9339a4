//! Data directory and dataset configuration
//!
//! Raw files live under one data directory with the layout the download
//! script produces:
//!
//! ```text
//! data/
//! ├── ecog/ECoG_ch1.mat .. ECoG_ch64.mat
//! ├── fmri/Schaefer100_BOLD_HCP.mat
//! └── meg/MEGdataset
//! ```
//!
//! An experiment file names the dataset and its parameters:
//!
//! ```toml
//! data_dir = "/srv/supervene"
//!
//! [dataset]
//! kind = "game_of_life"
//! num_simulations = 200
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datasets::{
    BitStringDataset, Dataset, EcogDataset, FmriConcatDataset, FmriRegionDataset,
    GameOfLifeDataset, GameOfLifeOptions, MegDataset,
};
use crate::error::{DatasetError, DatasetResult};
use crate::processing::ecog::EcogPreprocessing;
use crate::processing::fmri::{self, FmriSelection, FMRI_FILE};
use crate::processing::meg::MEG_FILE;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "SUPERVENE_DATA_DIR";

/// Data directory used when nothing else is configured
pub const DEFAULT_DATA_DIR: &str = "data";

/// Root of the raw data files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Use `root` as the data directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$SUPERVENE_DATA_DIR`, falling back to `./data`.
    #[must_use]
    pub fn from_env() -> Self {
        let root = std::env::var_os(DATA_DIR_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        debug!(root = %root.display(), "Resolved data directory");
        Self { root }
    }

    /// The directory itself
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the ECoG channel files
    pub fn ecog_dir(&self) -> PathBuf {
        self.root.join("ecog")
    }

    /// The fMRI BOLD file
    pub fn fmri_file(&self) -> PathBuf {
        self.root.join("fmri").join(FMRI_FILE)
    }

    /// The MEG file
    pub fn meg_file(&self) -> PathBuf {
        self.root.join("meg").join(MEG_FILE)
    }
}

impl Default for DataDir {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

fn yes() -> bool {
    true
}

/// Which dataset to build and how.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetConfig {
    /// Correlated bit-string chain
    BitString {
        /// Probability that the group parity changes between steps
        gamma_parity: f64,
        /// Probability that the extra bit repeats
        gamma_extra: f64,
        /// Chain length
        length: usize,
        /// Pair consecutive observations
        #[serde(default = "yes")]
        prepare: bool,
        /// RNG seed; OS entropy when absent
        #[serde(default)]
        seed: Option<u64>,
    },
    /// 64-channel ECoG recording
    Ecog {
        /// Pair consecutive observations
        #[serde(default = "yes")]
        prepare: bool,
        /// Cleanup parameters
        #[serde(default)]
        preprocessing: EcogPreprocessing,
    },
    /// fMRI subjects concatenated along time
    FmriConcat {
        /// Pair consecutive observations
        #[serde(default = "yes")]
        prepare: bool,
        /// Subject indices; the default-mode-network list when absent
        #[serde(default)]
        subjects: Option<Vec<usize>>,
    },
    /// fMRI regions over all subjects, unpaired
    FmriRegion {
        /// Region indices; the default-mode-network list when absent
        #[serde(default)]
        regions: Option<Vec<usize>>,
    },
    /// MEG recording, paired
    Meg,
    /// Game-of-Life simulations
    GameOfLife(GameOfLifeOptions),
}

impl DatasetConfig {
    /// Build the configured dataset, reading raw files from `data`.
    ///
    /// # Errors
    ///
    /// Propagates any construction error of the adapter.
    pub fn build(&self, data: &DataDir) -> DatasetResult<Box<dyn Dataset>> {
        debug!(config = ?self, "Building dataset");
        Ok(match self {
            Self::BitString { gamma_parity, gamma_extra, length, prepare, seed } => {
                if *prepare {
                    Box::new(BitStringDataset::new(*gamma_parity, *gamma_extra, *length, *seed)?)
                } else {
                    Box::new(BitStringDataset::unpaired(
                        *gamma_parity,
                        *gamma_extra,
                        *length,
                        *seed,
                    )?)
                }
            }
            Self::Ecog { prepare, preprocessing } => {
                Box::new(EcogDataset::with_preprocessing(
                    &data.ecog_dir(),
                    preprocessing,
                    *prepare,
                )?)
            }
            Self::FmriConcat { prepare, subjects } => {
                let selection = FmriSelection::Subjects(
                    subjects.clone().unwrap_or_else(fmri::default_mode_indices),
                );
                Box::new(FmriConcatDataset::with_selection(
                    &data.fmri_file(),
                    &selection,
                    *prepare,
                )?)
            }
            Self::FmriRegion { regions } => Box::new(FmriRegionDataset::with_regions(
                &data.fmri_file(),
                regions.clone().unwrap_or_else(fmri::default_mode_indices),
            )?),
            Self::Meg => Box::new(MegDataset::new(&data.meg_file())?),
            Self::GameOfLife(options) => Box::new(GameOfLifeDataset::new(options.clone())?),
        })
    }
}

/// Contents of an experiment TOML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Data directory; [`DataDir::from_env`] when absent
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Dataset to build
    pub dataset: DatasetConfig,
}

impl ExperimentConfig {
    /// Parse TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Config`] with the parser message.
    pub fn from_toml_str(text: &str) -> DatasetResult<Self> {
        toml::from_str(text).map_err(|e| DatasetError::Config { reason: e.to_string() })
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> DatasetResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DatasetError::Config {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&text)
    }

    /// The configured data directory or the environment default
    #[must_use]
    pub fn data_dir(&self) -> DataDir {
        self.data_dir.clone().map_or_else(DataDir::from_env, DataDir::new)
    }

    /// Build the configured dataset.
    ///
    /// # Errors
    ///
    /// Same as [`DatasetConfig::build`].
    pub fn build(&self) -> DatasetResult<Box<dyn Dataset>> {
        self.dataset.build(&self.data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_data_dir_layout() {
        let data = DataDir::new("/tmp/d");
        assert_eq!(data.ecog_dir(), PathBuf::from("/tmp/d/ecog"));
        assert_eq!(data.fmri_file(), PathBuf::from("/tmp/d/fmri/Schaefer100_BOLD_HCP.mat"));
        assert_eq!(data.meg_file(), PathBuf::from("/tmp/d/meg/MEGdataset"));
        assert_eq!(DataDir::default().root(), Path::new("data"));
    }

    #[test]
    fn test_parse_bit_string_defaults() {
        let config = ExperimentConfig::from_toml_str(
            "[dataset]\nkind = \"bit_string\"\n\
             gamma_parity = 0.99\ngamma_extra = 0.9\nlength = 50\n",
        )
        .unwrap();
        assert_eq!(config.data_dir, None);
        assert_eq!(
            config.dataset,
            DatasetConfig::BitString {
                gamma_parity: 0.99,
                gamma_extra: 0.9,
                length: 50,
                prepare: true,
                seed: None
            }
        );
    }

    #[test]
    fn test_parse_game_of_life_partial_options() {
        let config = ExperimentConfig::from_toml_str(
            "[dataset]\nkind = \"game_of_life\"\nnum_simulations = 2\nnormalize = false\n",
        )
        .unwrap();
        let DatasetConfig::GameOfLife(options) = config.dataset else {
            panic!("wrong variant");
        };
        assert_eq!(options.num_simulations, 2);
        assert!(!options.normalize);
        assert_eq!(options.grid_size, 15);
    }

    #[test]
    fn test_parse_meg_and_ecog() {
        let meg = ExperimentConfig::from_toml_str("[dataset]\nkind = \"meg\"\n").unwrap();
        assert_eq!(meg.dataset, DatasetConfig::Meg);

        let ecog = ExperimentConfig::from_toml_str(
            "[dataset]\nkind = \"ecog\"\nprepare = false\n[dataset.preprocessing]\nchannels = 8\n",
        )
        .unwrap();
        let DatasetConfig::Ecog { prepare, preprocessing } = ecog.dataset else {
            panic!("wrong variant");
        };
        assert!(!prepare);
        assert_eq!(preprocessing.channels, 8);
        assert_eq!(preprocessing.decimation, 3);
    }

    #[test]
    fn test_unknown_kind_is_config_error() {
        let err = ExperimentConfig::from_toml_str("[dataset]\nkind = \"eeg\"\n").unwrap_err();
        assert!(matches!(err, DatasetError::Config { .. }));
    }

    #[test]
    fn test_build_from_file() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_fmri(&dir.path().join("fmri").join(FMRI_FILE), 5, 4, 3);

        let path = dir.path().join("experiment.toml");
        std::fs::write(
            &path,
            format!(
                "data_dir = {:?}\n[dataset]\nkind = \"fmri_concat\"\nsubjects = [0, 4]\n",
                dir.path().display().to_string()
            ),
        )
        .unwrap();

        let dataset = ExperimentConfig::load(&path).unwrap().build().unwrap();
        assert_eq!(dataset.name(), "fmri_concat");
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.sample_shape(), &[2, 4]);
    }

    #[test]
    fn test_build_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        assert!(matches!(
            DatasetConfig::Meg.build(&data),
            Err(DatasetError::MissingSource { dataset: "MEG", .. })
        ));
    }

    #[test]
    fn test_build_generated() {
        let config = DatasetConfig::BitString {
            gamma_parity: 0.5,
            gamma_extra: 0.5,
            length: 10,
            prepare: false,
            seed: Some(1),
        };
        let dataset = config.build(&DataDir::default()).unwrap();
        assert_eq!(dataset.len(), 10);
    }
}
