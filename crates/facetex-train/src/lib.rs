//! Training side of facetex: datasets, the classifier contract, an SVM
//! backend and the adaptive gamma search.
//!
//! # Overview
//!
//! - [`dataset`] – feature matrix plus labels, with the tail hold-out split.
//! - [`classifier`] – the [`Classifier`] trait the search loop drives.
//! - [`svm`] – [`LinfaSvm`], a one-vs-one C-SVC / nu-SVC built on
//!   `linfa-svm`.
//! - [`search`] – [`GammaSearch`], which retrains the classifier while moving
//!   gamma in log10 space until a target held-out accuracy is reached.
//!
//! Feature vectors come from `facetex-core`; the trained classifier records
//! its input length so a vector from a different descriptor is rejected at
//! predict time instead of being silently misclassified.

pub mod classifier;
pub mod dataset;
pub mod error;
pub mod params;
pub mod search;
pub mod svm;

pub use crate::classifier::{check_sample_len, Classifier};
pub use crate::dataset::Dataset;
pub use crate::error::{Result, TrainError};
pub use crate::params::{Hyperparams, KernelType, SearchParams, SvmType};
pub use crate::search::{
    held_out_accuracy, CancelToken, GammaSearch, Phase, Progress, TrainingOutcome,
};
pub use crate::svm::LinfaSvm;

use facetex_core::FeatureKind;

/// Descriptor a trained classifier most likely expects, from its input
/// length. See [`FeatureKind::from_var_count`] for the caveats.
pub fn infer_feature_kind<C: Classifier + ?Sized>(clf: &C) -> Option<FeatureKind> {
    clf.var_count().map(FeatureKind::from_var_count)
}
