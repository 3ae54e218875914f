//! Face-crop texture descriptors and SVM training on top of the `image`
//! crate.
//!
//! Re-exports `facetex-core` (encoders) and `facetex-train` (classifier and
//! gamma search), and adds what an application needs around them:
//!
//! - [`image`] – `ImageBuffer` / `DynamicImage` wrappers for the encoders.
//! - [`augment`] – brightness and rotation for growing a training set.
//! - [`loader`] – reads a directory of labelled crops into datasets.
//! - [`recognizer`] – predicts the identity of a new crop.
//! - [`app`] – config file, logging setup and the end-to-end training run.

pub mod app;
pub mod augment;
pub mod image;
pub mod loader;
pub mod recognizer;

pub use facetex_core::*;
pub use facetex_train::{
    Classifier, Dataset, GammaSearch, Hyperparams, KernelType, LinfaSvm, Phase, Progress,
    SearchParams, SvmType, TrainError, TrainingOutcome,
};

pub use crate::image::{brief, extract_image, resize_face};
pub use crate::loader::{LoadError, LoadedData, LoaderConfig, TrainingDataLoader};
pub use crate::recognizer::Recognizer;
