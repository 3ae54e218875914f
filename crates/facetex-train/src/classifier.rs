//! Contract between the search loop and a trainable classifier.
use crate::dataset::Dataset;
use crate::error::{Result, TrainError};
use crate::params::Hyperparams;
use ndarray::{ArrayView1, ArrayView2};

/// A classifier the gamma search can reconfigure and retrain.
///
/// `configure` only records hyperparameters; the next `train` call uses them
/// and replaces any previous model. Prediction on an untrained classifier is
/// [`TrainError::NotTrained`], and a sample whose length differs from
/// [`Classifier::var_count`] is [`TrainError::FeatureLengthMismatch`].
pub trait Classifier {
    fn configure(&mut self, params: &Hyperparams) -> Result<()>;

    fn train(&mut self, data: &Dataset) -> Result<()>;

    fn predict(&self, sample: ArrayView1<'_, f32>) -> Result<i32>;

    /// Predict every row of `samples`.
    fn predict_batch(&self, samples: ArrayView2<'_, f32>) -> Result<Vec<i32>> {
        samples.rows().into_iter().map(|row| self.predict(row)).collect()
    }

    fn is_trained(&self) -> bool;

    /// Feature length of the training data; `None` before training.
    fn var_count(&self) -> Option<usize>;
}

/// Validate a sample length against a trained classifier.
pub fn check_sample_len(var_count: Option<usize>, actual: usize) -> Result<()> {
    let expected = var_count.ok_or(TrainError::NotTrained)?;
    if expected != actual {
        return Err(TrainError::FeatureLengthMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_len_check() {
        assert_eq!(check_sample_len(None, 3), Err(TrainError::NotTrained));
        assert_eq!(check_sample_len(Some(256), 256), Ok(()));
        assert_eq!(
            check_sample_len(Some(256), 121),
            Err(TrainError::FeatureLengthMismatch {
                expected: 256,
                actual: 121
            })
        );
    }
}
