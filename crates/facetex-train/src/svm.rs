//! Multi-class SVM on top of `linfa-svm`.
//!
//! `linfa-svm` trains binary machines, so [`LinfaSvm`] builds one machine per
//! pair of classes (one-vs-one) and predicts by majority vote. Votes that tie
//! go to the smallest label.
//!
//! Hyperparameter mapping:
//!
//! | setting          | linfa                                                  |
//! |------------------|--------------------------------------------------------|
//! | `CSvc`, `c`      | `pos_neg_weights(c, c)`                                |
//! | `NuSvc`, `nu`    | `nu_weight(nu)`                                        |
//! | `Linear`         | `linear_kernel()`                                      |
//! | `Rbf`, `gamma`   | `gaussian_kernel(1 / gamma)`                           |
//! | `Poly`           | `polynomial_kernel(coef0, degree)` on `sqrt(gamma)·x`  |
//!
//! `Sigmoid` kernels and the one-class / regression machine types have no
//! counterpart and are rejected by [`Classifier::configure`].
use crate::classifier::{check_sample_len, Classifier};
use crate::dataset::Dataset;
use crate::error::{Result, TrainError};
use crate::params::{Hyperparams, KernelType, SvmType};
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_svm::Svm;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::{debug, instrument};

/// Binary machine separating `positive` (true) from `negative` (false).
struct PairMachine {
    positive: i32,
    negative: i32,
    svm: Svm<f64, bool>,
}

/// One-vs-one SVM classifier.
pub struct LinfaSvm {
    params: Hyperparams,
    classes: Vec<i32>,
    machines: Vec<PairMachine>,
    var_count: Option<usize>,
}

impl Default for LinfaSvm {
    fn default() -> Self {
        Self {
            params: Hyperparams::default(),
            classes: Vec::new(),
            machines: Vec::new(),
            var_count: None,
        }
    }
}

impl LinfaSvm {
    pub fn new(params: Hyperparams) -> Result<Self> {
        let mut svm = Self::default();
        svm.configure(&params)?;
        Ok(svm)
    }

    /// Hyperparameters the next `train` call will use.
    pub fn hyperparams(&self) -> &Hyperparams {
        &self.params
    }

    /// Labels seen during the last training, ascending.
    pub fn classes(&self) -> &[i32] {
        &self.classes
    }

    /// Feature scale folded into the records for the polynomial kernel,
    /// which linfa evaluates without a gamma factor.
    fn input_scale(&self) -> f64 {
        match self.params.kernel {
            KernelType::Poly => self.params.gamma.sqrt(),
            _ => 1.0,
        }
    }

    fn to_records(&self, samples: ArrayView2<'_, f32>) -> Array2<f64> {
        let scale = self.input_scale();
        samples.mapv(|v| v as f64 * scale)
    }

    fn fit_pair(&self, records: Array2<f64>, targets: Array1<bool>) -> Result<Svm<f64, bool>> {
        let hp = &self.params;
        let mut params = Svm::<f64, bool>::params();
        params = match hp.svm_type {
            SvmType::CSvc => params.pos_neg_weights(hp.c, hp.c),
            SvmType::NuSvc => params.nu_weight(hp.nu),
            other => return Err(TrainError::Unsupported(format!("svm type {other}"))),
        };
        params = match hp.kernel {
            KernelType::Linear => params.linear_kernel(),
            KernelType::Rbf => params.gaussian_kernel(1.0 / hp.gamma),
            KernelType::Poly => params.polynomial_kernel(hp.coef0, hp.degree),
            KernelType::Sigmoid => {
                return Err(TrainError::Unsupported("sigmoid kernel".to_string()))
            }
        };
        let dataset = DatasetBase::new(records, targets);
        params
            .fit(&dataset)
            .map_err(|e| TrainError::Backend(e.to_string()))
    }

    /// Majority vote over all pair machines for every row of `records`.
    fn vote(&self, records: &Array2<f64>) -> Vec<i32> {
        let n = records.nrows();
        let mut votes = vec![vec![0u32; self.classes.len()]; n];
        for m in &self.machines {
            let out: Array1<bool> = m.svm.predict(records);
            let pos = self.class_index(m.positive);
            let neg = self.class_index(m.negative);
            for (row, &is_pos) in out.iter().enumerate() {
                votes[row][if is_pos { pos } else { neg }] += 1;
            }
        }
        votes
            .iter()
            .map(|counts| {
                let mut best = 0;
                for (i, &c) in counts.iter().enumerate() {
                    if c > counts[best] {
                        best = i;
                    }
                }
                self.classes[best]
            })
            .collect()
    }

    fn class_index(&self, label: i32) -> usize {
        self.classes.binary_search(&label).unwrap_or_default()
    }
}

impl Classifier for LinfaSvm {
    fn configure(&mut self, params: &Hyperparams) -> Result<()> {
        match params.svm_type {
            SvmType::CSvc | SvmType::NuSvc => {}
            other => return Err(TrainError::Unsupported(format!("svm type {other}"))),
        }
        if params.kernel == KernelType::Sigmoid {
            return Err(TrainError::Unsupported("sigmoid kernel".to_string()));
        }
        if params.kernel.uses_gamma() && !(params.gamma.is_finite() && params.gamma > 0.0) {
            return Err(TrainError::InvalidHyperparams(format!(
                "gamma must be positive and finite, got {}",
                params.gamma
            )));
        }
        if params.svm_type == SvmType::CSvc && params.c <= 0.0 {
            return Err(TrainError::InvalidHyperparams(format!(
                "c must be positive, got {}",
                params.c
            )));
        }
        if params.svm_type == SvmType::NuSvc && !(params.nu > 0.0 && params.nu <= 1.0) {
            return Err(TrainError::InvalidHyperparams(format!(
                "nu must be in (0, 1], got {}",
                params.nu
            )));
        }
        self.params = *params;
        Ok(())
    }

    #[instrument(
        level = "debug",
        skip(self, data),
        fields(rows = data.len(), cols = data.n_features())
    )]
    fn train(&mut self, data: &Dataset) -> Result<()> {
        if data.is_empty() {
            return Err(TrainError::EmptyDataset);
        }
        let classes = data.classes();
        if classes.len() < 2 {
            return Err(TrainError::TooFewClasses(classes.len()));
        }

        let records = self.to_records(data.records());
        let labels = data.labels();
        let mut machines = Vec::with_capacity(classes.len() * (classes.len() - 1) / 2);
        for (i, &positive) in classes.iter().enumerate() {
            for &negative in &classes[i + 1..] {
                let rows: Vec<usize> = labels
                    .iter()
                    .enumerate()
                    .filter(|(_, &l)| l == positive || l == negative)
                    .map(|(r, _)| r)
                    .collect();
                let pair_records = records.select(Axis(0), &rows);
                let targets: Array1<bool> = rows.iter().map(|&r| labels[r] == positive).collect();
                let svm = self.fit_pair(pair_records, targets)?;
                debug!(positive, negative, samples = rows.len(), "pair machine trained");
                machines.push(PairMachine {
                    positive,
                    negative,
                    svm,
                });
            }
        }

        self.classes = classes;
        self.machines = machines;
        self.var_count = Some(data.n_features());
        Ok(())
    }

    fn predict(&self, sample: ArrayView1<'_, f32>) -> Result<i32> {
        check_sample_len(self.var_count, sample.len())?;
        let row = sample.insert_axis(Axis(0));
        let records = self.to_records(row);
        self.vote(&records)
            .first()
            .copied()
            .ok_or(TrainError::NotTrained)
    }

    fn predict_batch(&self, samples: ArrayView2<'_, f32>) -> Result<Vec<i32>> {
        check_sample_len(self.var_count, samples.ncols())?;
        if samples.nrows() == 0 {
            return Ok(Vec::new());
        }
        Ok(self.vote(&self.to_records(samples)))
    }

    fn is_trained(&self) -> bool {
        self.var_count.is_some()
    }

    fn var_count(&self) -> Option<usize> {
        self.var_count
    }
}
