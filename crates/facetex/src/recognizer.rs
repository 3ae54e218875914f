//! Face-crop recognition with a trained classifier.
use crate::image::{extract_image, resize_face};
use facetex_core::{FeatureKind, FeatureParams};
use facetex_train::{check_sample_len, Classifier, TrainError};
use image::DynamicImage;
use ndarray::ArrayView1;
use std::collections::BTreeMap;
use tracing::debug;

/// A trained classifier bundled with what is needed to encode new crops the
/// same way its training data was encoded.
pub struct Recognizer<C> {
    classifier: C,
    features: FeatureParams,
    width: u32,
    height: u32,
    names: BTreeMap<i32, String>,
}

impl<C: Classifier> Recognizer<C> {
    /// Wrap a trained classifier. Fails with [`TrainError::NotTrained`]
    /// otherwise.
    pub fn new(
        classifier: C,
        features: FeatureParams,
        width: u32,
        height: u32,
    ) -> Result<Self, TrainError> {
        if !classifier.is_trained() {
            return Err(TrainError::NotTrained);
        }
        Ok(Self {
            classifier,
            features,
            width,
            height,
            names: BTreeMap::new(),
        })
    }

    /// Wrap a classifier whose descriptor is not known, inferring it from
    /// the classifier's input length with the default threshold.
    ///
    /// The inference is a best guess: a Haar image size whose box count
    /// equals a histogram length is mistaken for that histogram.
    pub fn from_trained(classifier: C, width: u32, height: u32) -> Result<Self, TrainError> {
        let var_count = classifier.var_count().ok_or(TrainError::NotTrained)?;
        let kind = FeatureKind::from_var_count(var_count);
        debug!(var_count, %kind, "descriptor inferred from classifier");
        Self::new(classifier, FeatureParams::new(kind), width, height)
    }

    pub fn with_names(mut self, names: BTreeMap<i32, String>) -> Self {
        self.names = names;
        self
    }

    pub fn features(&self) -> &FeatureParams {
        &self.features
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn names(&self) -> &BTreeMap<i32, String> {
        &self.names
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn into_classifier(self) -> C {
        self.classifier
    }

    /// Predict the label of a face crop of any size.
    pub fn predict_image(&self, img: &DynamicImage) -> Result<i32, TrainError> {
        let resized = resize_face(img, self.width, self.height);
        let features = extract_image(&resized, &self.features)
            .map_err(|e| TrainError::Backend(e.to_string()))?;
        check_sample_len(self.classifier.var_count(), features.len())?;
        self.classifier
            .predict(ArrayView1::from(features.values.as_slice()))
    }

    /// Predict and map the label to its identity name, if one is known.
    pub fn predict_name(&self, img: &DynamicImage) -> Result<Option<&str>, TrainError> {
        let label = self.predict_image(img)?;
        Ok(self.names.get(&label).map(String::as_str))
    }
}
