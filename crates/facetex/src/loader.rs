//! Training-data loader for a directory of labelled face crops.
//!
//! Layout:
//!
//! ```text
//! root/
//!   bg/            background images, stored directly
//!   alice/pos/     one directory per identity, images under `pos/`
//!   bob/pos/
//! ```
//!
//! Entries of `root` are visited in name order; entry `i` of `n` gets label
//! `i - n/2`. Each entry's images (also in name order) are split: the first
//! `floor(count * train_fraction)` go to training, the next
//! `floor(count * (1 - train_fraction))` to testing.

use crate::image::{brief, extract_image, resize_face};
use facetex_core::FeatureParams;
use facetex_train::{Dataset, TrainError};
use image::ImageReader;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_BACKGROUND_DIR: &str = "bg";
pub const DEFAULT_POSITIVE_DIR: &str = "pos";
pub const DEFAULT_IMAGE_SIZE: u32 = 64;
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.9;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} contains no identity directories")]
    NoIdentities(PathBuf),

    #[error("train fraction must be within [0, 1], got {0}")]
    InvalidFraction(f64),

    #[error("image size must be at least 1x1, got {0}x{1}")]
    InvalidSize(u32, u32),

    #[error(transparent)]
    Dataset(#[from] TrainError),
}

/// Loader settings.
#[derive(Clone, Debug)]
pub struct LoaderConfig {
    pub root: PathBuf,
    pub train_fraction: f64,
    pub width: u32,
    pub height: u32,
    pub features: FeatureParams,
    pub background_dir: String,
    pub positive_dir: String,
}

impl LoaderConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            train_fraction: DEFAULT_TRAIN_FRACTION,
            width: DEFAULT_IMAGE_SIZE,
            height: DEFAULT_IMAGE_SIZE,
            features: FeatureParams::default(),
            background_dir: DEFAULT_BACKGROUND_DIR.to_string(),
            positive_dir: DEFAULT_POSITIVE_DIR.to_string(),
        }
    }
}

/// Encoded samples plus the label → directory name map.
#[derive(Clone, Debug)]
pub struct LoadedData {
    pub train: Dataset,
    pub test: Dataset,
    pub names: BTreeMap<i32, String>,
}

/// One image scheduled for decoding.
struct Job {
    path: PathBuf,
    label: i32,
    train: bool,
}

pub struct TrainingDataLoader {
    config: LoaderConfig,
}

impl TrainingDataLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Scan, decode, resize and encode every image under the root.
    ///
    /// Images that fail to decode or encode are skipped with a warning.
    #[instrument(level = "info", skip(self), fields(root = %self.config.root.display()))]
    pub fn load(&self) -> Result<LoadedData, LoadError> {
        let cfg = &self.config;
        if !(0.0..=1.0).contains(&cfg.train_fraction) {
            return Err(LoadError::InvalidFraction(cfg.train_fraction));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(LoadError::InvalidSize(cfg.width, cfg.height));
        }

        let identities: Vec<String> = sorted_entries(&cfg.root)?
            .into_iter()
            .filter(|p| p.is_dir())
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        if identities.is_empty() {
            return Err(LoadError::NoIdentities(cfg.root.clone()));
        }

        let half = (identities.len() / 2) as i32;
        let mut names = BTreeMap::new();
        let mut jobs = Vec::new();
        for (i, name) in identities.iter().enumerate() {
            let label = i as i32 - half;
            names.insert(label, name.clone());

            let dir = if *name == cfg.background_dir {
                cfg.root.join(name)
            } else {
                cfg.root.join(name).join(&cfg.positive_dir)
            };
            if !dir.is_dir() {
                warn!(dir = %dir.display(), "identity has no image directory");
                continue;
            }
            let files: Vec<PathBuf> = sorted_entries(&dir)?
                .into_iter()
                .filter(|p| p.is_file())
                .collect();
            let n_train = split_count(files.len(), cfg.train_fraction);
            let n_test = split_count(files.len(), 1.0 - cfg.train_fraction);
            debug!(%name, label, n_train, n_test, "identity scanned");

            for (j, path) in files.into_iter().take(n_train + n_test).enumerate() {
                jobs.push(Job {
                    path,
                    label,
                    train: j < n_train,
                });
            }
        }
        info!(
            identities = identities.len(),
            images = jobs.len(),
            feature = %cfg.features.kind,
            "loading training data"
        );

        let encoded: Vec<Option<Vec<f32>>> =
            jobs.par_iter().map(|job| self.encode(job)).collect();

        let mut train = (Vec::new(), Vec::new());
        let mut test = (Vec::new(), Vec::new());
        let mut cols: Option<usize> = None;
        for (job, values) in jobs.iter().zip(encoded) {
            let Some(values) = values else { continue };
            let expected = *cols.get_or_insert(values.len());
            if values.len() != expected {
                warn!(
                    path = %job.path.display(),
                    expected,
                    actual = values.len(),
                    "skipping sample with inconsistent length"
                );
                continue;
            }
            let (rows, labels) = if job.train { &mut train } else { &mut test };
            rows.push(values);
            labels.push(job.label);
        }

        let train = Dataset::from_rows(&train.0, train.1)?;
        let test = Dataset::from_rows(&test.0, test.1)?;
        info!(
            train = train.len(),
            test = test.len(),
            features = train.n_features().max(test.n_features()),
            "training data loaded"
        );
        Ok(LoadedData { train, test, names })
    }

    fn encode(&self, job: &Job) -> Option<Vec<f32>> {
        let cfg = &self.config;
        let decoded = ImageReader::open(&job.path)
            .map_err(image::ImageError::from)
            .and_then(|r| r.decode());
        let img = match decoded {
            Ok(img) => img,
            Err(e) => {
                warn!(path = %job.path.display(), error = %e, "skipping undecodable image");
                return None;
            }
        };
        let resized = resize_face(&img, cfg.width, cfg.height);
        let features = match extract_image(&resized, &cfg.features) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %job.path.display(), error = %e, "skipping image");
                return None;
            }
        };
        if !features.is_valid() {
            warn!(
                path = %job.path.display(),
                expected = features.expected_len,
                actual = features.len(),
                "skipping image that could not be encoded"
            );
            return None;
        }
        debug!(
            path = %job.path.display(),
            label = job.label,
            train = job.train,
            sample = %brief(&features.values),
            "sample encoded"
        );
        Some(features.values)
    }
}

/// `floor(count * fraction)`, tolerant of the rounding error in
/// `1.0 - fraction` (so 10 images at 0.9 split 9 + 1, not 9 + 0).
fn split_count(count: usize, fraction: f64) -> usize {
    (count as f64 * fraction + 1e-9).floor() as usize
}

/// Directory entries sorted by file name.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io_err)?
        .map(|e| e.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()
        .map_err(io_err)?;
    entries.sort();
    Ok(entries)
}
