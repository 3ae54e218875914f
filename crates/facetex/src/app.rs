//! Shared application-level helpers for examples and tools.
//!
//! These functions wire up I/O (config file, data directory, JSON summary)
//! around the loader and the gamma search so every entry point trains the
//! same way.

use crate::loader::{
    LoaderConfig, TrainingDataLoader, DEFAULT_IMAGE_SIZE, DEFAULT_TRAIN_FRACTION,
};
use crate::recognizer::Recognizer;
use anyhow::{Context, Result};
use facetex_core::{FeatureKind, FeatureParams, DEFAULT_THRESHOLD};
use facetex_train::params::DEFAULT_TEST_FRACTION;
use facetex_train::{
    Classifier, GammaSearch, Hyperparams, KernelType, LinfaSvm, Phase, Progress, SearchParams,
    SvmType,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::mpsc;
use std::thread;
use std::{fs::File, io::Write, path::Path, path::PathBuf};
use tracing::{info, Level};

/// Training session configuration. Only `data_dir` is required.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrainConfig {
    pub data_dir: PathBuf,
    pub feature: Option<FeatureKind>,
    pub threshold: Option<i32>,
    pub image_size: Option<u32>,
    pub train_fraction: Option<f64>,
    pub svm_type: Option<SvmType>,
    pub kernel: Option<KernelType>,
    pub gamma: Option<f64>,
    pub c: Option<f64>,
    pub nu: Option<f64>,
    pub degree: Option<f64>,
    pub coef0: Option<f64>,
    pub step: Option<f64>,
    pub target_accuracy: Option<f64>,
    pub max_iterations: Option<usize>,
    pub output_json: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl TrainConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn feature_params(&self) -> FeatureParams {
        FeatureParams {
            kind: self.feature.unwrap_or(FeatureKind::Lbp),
            threshold: self.threshold.unwrap_or(DEFAULT_THRESHOLD),
        }
    }

    pub fn image_size(&self) -> u32 {
        self.image_size.unwrap_or(DEFAULT_IMAGE_SIZE)
    }

    pub fn hyperparams(&self) -> Hyperparams {
        let mut hp = Hyperparams::default();
        if let Some(v) = self.svm_type {
            hp.svm_type = v;
        }
        if let Some(v) = self.kernel {
            hp.kernel = v;
        }
        if let Some(v) = self.gamma {
            hp.gamma = v;
        }
        if let Some(v) = self.c {
            hp.c = v;
        }
        if let Some(v) = self.nu {
            hp.nu = v;
        }
        if let Some(v) = self.degree {
            hp.degree = v;
        }
        if let Some(v) = self.coef0 {
            hp.coef0 = v;
        }
        hp
    }

    pub fn search_params(&self) -> SearchParams {
        let mut sp = SearchParams::default();
        if let Some(v) = self.step {
            sp.step = v;
        }
        if let Some(v) = self.target_accuracy {
            sp.target_accuracy = v;
        }
        if let Some(v) = self.max_iterations {
            sp.max_iterations = v;
        }
        sp
    }

    pub fn loader_config(&self) -> LoaderConfig {
        let size = self.image_size();
        LoaderConfig {
            train_fraction: self.train_fraction.unwrap_or(DEFAULT_TRAIN_FRACTION),
            width: size,
            height: size,
            features: self.feature_params(),
            ..LoaderConfig::new(&self.data_dir)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.image_size == Some(0) {
            anyhow::bail!("image size must be >= 1");
        }
        if let Some(step) = self.step {
            if !(step > 0.0 && step.is_finite()) {
                anyhow::bail!("step must be > 0");
            }
        }
        if let Some(g) = self.gamma {
            if !(g > 0.0 && g.is_finite()) {
                anyhow::bail!("gamma must be > 0");
            }
        }
        Ok(())
    }
}

/// Everything needed to reuse a trained model, as written to JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub data_dir: String,
    pub feature: FeatureKind,
    pub threshold: i32,
    pub width: u32,
    pub height: u32,
    pub var_count: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub hyperparams: Hyperparams,
    pub accuracy: f64,
    pub reached_target: bool,
    pub rounds: usize,
    pub phase: Phase,
    pub names: BTreeMap<i32, String>,
}

/// Install the global fmt subscriber. `level` is one of
/// `trace|debug|info|warn|error` (default `info`).
pub fn init_tracing(level: Option<&str>) -> Result<()> {
    let level: Level = match level {
        Some(s) => s
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid log level '{s}'"))?,
        None => Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))
}

/// Load the data directory, run the gamma search on a background thread and
/// return the session summary plus a ready-to-use recognizer.
///
/// Progress is logged on the calling thread as rounds complete. When the
/// data directory yields no test samples, the tail of the training set is
/// held out instead.
pub fn run_training(cfg: TrainConfig) -> Result<(SessionSummary, Recognizer<LinfaSvm>)> {
    cfg.validate()?;
    let loader = TrainingDataLoader::new(cfg.loader_config());
    let data = loader
        .load()
        .with_context(|| format!("loading training data from {}", cfg.data_dir.display()))?;
    if data.train.is_empty() {
        anyhow::bail!("no usable training images under {}", cfg.data_dir.display());
    }

    let hp = cfg.hyperparams();
    let search = GammaSearch::new(cfg.search_params());
    let (tx, rx) = mpsc::channel::<Progress>();
    let search = search.with_progress(tx);

    let (train, test) = if data.test.is_empty() {
        data.train.split_holdout(DEFAULT_TEST_FRACTION)
    } else {
        (data.train.clone(), data.test.clone())
    };
    let (train_samples, test_samples) = (train.len(), test.len());

    let worker = thread::spawn(move || {
        let mut svm = LinfaSvm::default();
        let outcome = search.run(&mut svm, &hp, &train, &test);
        outcome.map(|o| (o, svm))
    });

    // the sender lives in the worker, so this ends when training does
    for p in rx {
        info!(
            phase = %p.phase,
            round = p.round,
            gamma = p.gamma,
            accuracy = p.accuracy,
            "training round"
        );
    }
    let (outcome, svm) = worker
        .join()
        .map_err(|_| anyhow::anyhow!("training thread panicked"))?
        .context("training classifier")?;

    let features = cfg.feature_params();
    let size = cfg.image_size();
    let summary = SessionSummary {
        data_dir: cfg.data_dir.to_string_lossy().into_owned(),
        feature: features.kind,
        threshold: features.threshold,
        width: size,
        height: size,
        var_count: svm.var_count().unwrap_or(0),
        train_samples,
        test_samples,
        hyperparams: outcome.hyperparams,
        accuracy: outcome.accuracy,
        reached_target: outcome.reached_target,
        rounds: outcome.rounds,
        phase: outcome.phase,
        names: data.names.clone(),
    };

    if let Some(path) = &cfg.output_json {
        write_json(path, &summary)
            .with_context(|| format!("writing summary {}", path.display()))?;
        info!(path = %path.display(), "summary saved");
    }

    let recognizer = Recognizer::new(svm, features, size, size)?.with_names(data.names);
    Ok((summary, recognizer))
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let mut json_file = File::create(path)?;
    serde_json::to_writer_pretty(&mut json_file, value)?;
    json_file.write_all(b"\n")?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<TrainConfig> {
    let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    let cfg: TrainConfig = serde_json::from_reader(file)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
