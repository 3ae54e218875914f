use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrainError>;

/// Failures of dataset construction, training and prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    #[error("dataset has no samples")]
    EmptyDataset,

    #[error("{samples} samples but {labels} labels")]
    RowMismatch { samples: usize, labels: usize },

    #[error("sample {row} has {actual} values, expected {expected}")]
    ColumnMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("feature vector has {actual} values, classifier was trained on {expected}")]
    FeatureLengthMismatch { expected: usize, actual: usize },

    #[error("classifier is not trained")]
    NotTrained,

    #[error("training needs at least two classes, got {0}")]
    TooFewClasses(usize),

    #[error("invalid hyperparameters: {0}")]
    InvalidHyperparams(String),

    #[error("{0} is not supported by this classifier")]
    Unsupported(String),

    #[error("svm backend: {0}")]
    Backend(String),

    #[error("training cancelled")]
    Cancelled,
}
