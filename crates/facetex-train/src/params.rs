//! Classifier hyperparameters and search-loop settings.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accuracy at which the gamma search stops early.
pub const DEFAULT_TARGET_ACCURACY: f64 = 0.966;
/// log10 step applied to gamma between rounds.
pub const DEFAULT_TRAINING_STEP: f64 = 0.05;
/// Round cap per search phase.
pub const MAX_ITERATION: usize = 1000;
/// Gamma floor that ends the decreasing phase.
pub const MIN_GAMMA: f64 = 1e-16;
/// Share of a single sample matrix held out for measuring accuracy.
pub const DEFAULT_TEST_FRACTION: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SvmType {
    CSvc,
    NuSvc,
    OneClass,
    EpsSvr,
    NuSvr,
}

impl SvmType {
    pub const fn name(self) -> &'static str {
        match self {
            SvmType::CSvc => "c_svc",
            SvmType::NuSvc => "nu_svc",
            SvmType::OneClass => "one_class",
            SvmType::EpsSvr => "eps_svr",
            SvmType::NuSvr => "nu_svr",
        }
    }
}

impl fmt::Display for SvmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SvmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "c_svc" | "csvc" => Ok(SvmType::CSvc),
            "nu_svc" | "nusvc" => Ok(SvmType::NuSvc),
            "one_class" | "oneclass" => Ok(SvmType::OneClass),
            "eps_svr" | "epssvr" => Ok(SvmType::EpsSvr),
            "nu_svr" | "nusvr" => Ok(SvmType::NuSvr),
            other => Err(format!(
                "invalid svm type '{other}', expected c_svc|nu_svc|one_class|eps_svr|nu_svr"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelType {
    Linear,
    Poly,
    Rbf,
    Sigmoid,
}

impl KernelType {
    pub const fn name(self) -> &'static str {
        match self {
            KernelType::Linear => "linear",
            KernelType::Poly => "poly",
            KernelType::Rbf => "rbf",
            KernelType::Sigmoid => "sigmoid",
        }
    }

    /// Whether the kernel has a gamma term the search loop can tune.
    #[inline]
    pub const fn uses_gamma(self) -> bool {
        !matches!(self, KernelType::Linear)
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(KernelType::Linear),
            "poly" | "polynomial" => Ok(KernelType::Poly),
            "rbf" | "gaussian" => Ok(KernelType::Rbf),
            "sigmoid" => Ok(KernelType::Sigmoid),
            other => Err(format!(
                "invalid kernel '{other}', expected linear|poly|rbf|sigmoid"
            )),
        }
    }
}

/// SVM configuration, rebuilt for every search round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hyperparams {
    pub svm_type: SvmType,
    pub kernel: KernelType,
    pub gamma: f64,
    pub c: f64,
    pub nu: f64,
    pub degree: f64,
    pub coef0: f64,
    pub p: f64,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Self {
            svm_type: SvmType::CSvc,
            kernel: KernelType::Rbf,
            gamma: 0.1,
            c: 1.0,
            nu: 0.1,
            degree: 2.0,
            coef0: 0.1,
            p: 0.0,
        }
    }
}

impl Hyperparams {
    /// Same configuration with a different gamma.
    #[inline]
    pub fn with_gamma(self, gamma: f64) -> Self {
        Self { gamma, ..self }
    }
}

/// Gamma search settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Held-out accuracy that ends the search successfully.
    pub target_accuracy: f64,
    /// Step in log10(gamma) between rounds.
    pub step: f64,
    /// Maximum rounds per phase.
    pub max_iterations: usize,
    /// The decreasing phase ends once gamma falls below this value.
    pub min_gamma: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            target_accuracy: DEFAULT_TARGET_ACCURACY,
            step: DEFAULT_TRAINING_STEP,
            max_iterations: MAX_ITERATION,
            min_gamma: MIN_GAMMA,
        }
    }
}
