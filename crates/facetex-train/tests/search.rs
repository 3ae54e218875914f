use facetex_core::FeatureKind;
use facetex_train::{
    infer_feature_kind, CancelToken, Classifier, Dataset, GammaSearch, Hyperparams, KernelType,
    LinfaSvm, Phase, Result, SearchParams, TrainError,
};
use ndarray::{ArrayView1, ArrayView2};
use std::sync::mpsc;

/// Test double whose held-out accuracy is a function of gamma.
///
/// The test set is expected to be labelled all `1`; `predict_batch` answers
/// `1` for the first `round(score(gamma) * rows)` rows and `0` after that.
struct Scripted<F: Fn(f64) -> f64> {
    score: F,
    gamma: f64,
    gammas: Vec<f64>,
    trained: bool,
    cancel_after: Option<(usize, CancelToken)>,
}

impl<F: Fn(f64) -> f64> Scripted<F> {
    fn new(score: F) -> Self {
        Self {
            score,
            gamma: f64::NAN,
            gammas: Vec::new(),
            trained: false,
            cancel_after: None,
        }
    }
}

impl<F: Fn(f64) -> f64> Classifier for Scripted<F> {
    fn configure(&mut self, params: &Hyperparams) -> Result<()> {
        self.gamma = params.gamma;
        Ok(())
    }

    fn train(&mut self, _: &Dataset) -> Result<()> {
        self.gammas.push(self.gamma);
        self.trained = true;
        if let Some((n, token)) = &self.cancel_after {
            if self.gammas.len() >= *n {
                token.cancel();
            }
        }
        Ok(())
    }

    fn predict(&self, _: ArrayView1<'_, f32>) -> Result<i32> {
        Ok(1)
    }

    fn predict_batch(&self, samples: ArrayView2<'_, f32>) -> Result<Vec<i32>> {
        let n = samples.nrows();
        let hits = ((self.score)(self.gamma) * n as f64).round() as usize;
        Ok((0..n).map(|i| if i < hits { 1 } else { 0 }).collect())
    }

    fn is_trained(&self) -> bool {
        self.trained
    }

    fn var_count(&self) -> Option<usize> {
        self.trained.then_some(1)
    }
}

fn ones(n: usize) -> Dataset {
    Dataset::from_rows(&vec![vec![0.5f32]; n], vec![1; n]).unwrap()
}

fn search(max_iterations: usize) -> GammaSearch {
    GammaSearch::new(SearchParams {
        max_iterations,
        ..SearchParams::default()
    })
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() <= 1e-9 * b.abs().max(1.0), "{a} vs {b}");
}

#[test]
fn linear_kernel_trains_exactly_once() {
    let mut clf = Scripted::new(|_| 0.0);
    let base = Hyperparams {
        kernel: KernelType::Linear,
        ..Hyperparams::default()
    };
    let data = ones(10);
    let out = search(1000).run(&mut clf, &base, &data, &data).unwrap();
    assert_eq!(out.rounds, 1);
    assert_eq!(out.phase, Phase::Fixed);
    assert!(!out.reached_target);
    assert_eq!(clf.gammas.len(), 1);
}

#[test]
fn zero_target_stops_after_first_round() {
    let mut clf = Scripted::new(|_| 0.0);
    let data = ones(10);
    let out = GammaSearch::new(SearchParams {
        target_accuracy: 0.0,
        ..SearchParams::default()
    })
    .run(&mut clf, &Hyperparams::default(), &data, &data)
    .unwrap();
    assert_eq!(out.rounds, 1);
    assert_eq!(out.phase, Phase::Decrease);
    assert!(out.reached_target);
    assert_eq!(out.hyperparams.gamma, 0.1);
}

#[test]
fn decrease_walks_gamma_down_in_log_space() {
    let mut clf = Scripted::new(|g| if g < 0.05 { 1.0 } else { 0.0 });
    let data = ones(10);
    let out = search(1000)
        .run(&mut clf, &Hyperparams::default(), &data, &data)
        .unwrap();

    // log10 gamma: -1.00, -1.05, ..., -1.35 (first value below 0.05)
    assert_eq!(out.rounds, 8);
    assert_eq!(out.phase, Phase::Decrease);
    assert!(out.reached_target);
    assert_eq!(out.accuracy, 1.0);
    assert_close(out.hyperparams.gamma, 10f64.powf(-1.35));
    for pair in clf.gammas.windows(2) {
        assert_close(pair[1].log10() - pair[0].log10(), -0.05);
    }
}

#[test]
fn increase_restarts_from_starting_gamma() {
    let mut clf = Scripted::new(|g| if g > 0.3 { 1.0 } else { 0.0 });
    let data = ones(10);
    let out = search(12)
        .run(&mut clf, &Hyperparams::default(), &data, &data)
        .unwrap();

    assert_eq!(clf.gammas[12], 0.1);
    assert!(clf.gammas[11] < clf.gammas[0]);
    assert!(clf.gammas[13] > 0.1);
    // increase phase reaches log10 gamma = -0.5 on its 11th round
    assert_eq!(out.rounds, 12 + 11);
    assert_eq!(out.phase, Phase::Increase);
    assert!(out.reached_target);
    assert_close(out.hyperparams.gamma, 10f64.powf(-0.5));
}

#[test]
fn floor_ends_decrease_phase() {
    let mut clf = Scripted::new(|_| 0.0);
    let data = ones(10);
    let out = GammaSearch::new(SearchParams {
        max_iterations: 20,
        min_gamma: 0.05,
        ..SearchParams::default()
    })
    .run(&mut clf, &Hyperparams::default(), &data, &data)
    .unwrap();

    // 7 decreasing rounds (down to 10^-1.30), 20 increasing, 1 final
    assert_eq!(out.rounds, 7 + 20 + 1);
    assert!(clf.gammas[..7].iter().all(|&g| g >= 0.05));
    assert_eq!(clf.gammas[7], 0.1);
    assert_eq!(out.phase, Phase::Finalize);
    assert!(!out.reached_target);
    // nothing beat the first round, so the final model uses the starting gamma
    assert_eq!(out.hyperparams.gamma, 0.1);
}

#[test]
fn finalize_uses_best_gamma() {
    let peak = 10f64.powf(-1.1);
    let mut clf = Scripted::new(move |g: f64| {
        if (g.log10() - peak.log10()).abs() < 0.01 {
            0.9
        } else {
            0.5
        }
    });
    let data = ones(10);
    let out = search(5)
        .run(&mut clf, &Hyperparams::default(), &data, &data)
        .unwrap();

    assert_eq!(out.rounds, 5 + 5 + 1);
    assert_eq!(out.phase, Phase::Finalize);
    assert!(!out.reached_target);
    assert_eq!(out.accuracy, 0.9);
    assert_close(out.hyperparams.gamma, peak);
    assert_close(*clf.gammas.last().unwrap(), peak);
}

#[test]
fn progress_reports_every_round() {
    let (tx, rx) = mpsc::channel();
    let mut clf = Scripted::new(|g| if g < 0.05 { 1.0 } else { 0.0 });
    let data = ones(10);
    let out = search(1000)
        .with_progress(tx)
        .run(&mut clf, &Hyperparams::default(), &data, &data)
        .unwrap();

    let reports: Vec<_> = rx.try_iter().collect();
    assert_eq!(reports.len(), out.rounds);
    for (i, p) in reports.iter().enumerate() {
        assert_eq!(p.round, i + 1);
        assert_eq!(p.phase, Phase::Decrease);
        assert_eq!(p.gamma, clf.gammas[i]);
    }
    assert_eq!(reports.last().unwrap().accuracy, 1.0);
}

#[test]
fn dropped_receiver_is_ignored() {
    let (tx, rx) = mpsc::channel();
    drop(rx);
    let mut clf = Scripted::new(|_| 1.0);
    let data = ones(4);
    let out = search(10)
        .with_progress(tx)
        .run(&mut clf, &Hyperparams::default(), &data, &data)
        .unwrap();
    assert!(out.reached_target);
}

#[test]
fn cancellation_between_rounds() {
    let token = CancelToken::new();
    let mut clf = Scripted::new(|_| 0.0);
    clf.cancel_after = Some((3, token.clone()));
    let data = ones(10);
    let err = search(1000)
        .with_cancel(token)
        .run(&mut clf, &Hyperparams::default(), &data, &data)
        .unwrap_err();
    assert_eq!(err, TrainError::Cancelled);
    assert_eq!(clf.gammas.len(), 3);
}

#[test]
fn invalid_step_is_rejected_before_training() {
    let data = ones(10);
    for step in [0.0, -0.05, f64::NAN, f64::INFINITY] {
        let mut clf = Scripted::new(|_| 0.0);
        let err = GammaSearch::new(SearchParams {
            step,
            ..SearchParams::default()
        })
        .run(&mut clf, &Hyperparams::default(), &data, &data)
        .unwrap_err();
        assert!(matches!(err, TrainError::InvalidHyperparams(_)), "step {step}");
        assert!(clf.gammas.is_empty());
    }
}

/// Two clusters interleaved so the tail hold-out sees both classes.
fn two_clusters() -> Dataset {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for i in 0..40 {
        let label = if i % 2 == 0 { -1 } else { 1 };
        let center = if label < 0 { 0.0f32 } else { 5.0 };
        let jitter = (i % 5) as f32 * 0.1;
        rows.push(vec![center + jitter, center - jitter, center]);
        labels.push(label);
    }
    Dataset::from_rows(&rows, labels).unwrap()
}

#[test]
fn linfa_backend_reaches_target_on_separable_data() {
    let data = two_clusters();
    let mut svm = LinfaSvm::default();
    let out = GammaSearch::new(SearchParams::default())
        .run_with_holdout(&mut svm, &Hyperparams::default(), &data, 0.25)
        .unwrap();
    assert!(out.reached_target, "{out:?}");
    assert!(out.accuracy >= 0.966);
    assert_eq!(svm.var_count(), Some(3));
    assert_eq!(infer_feature_kind(&svm), Some(FeatureKind::Haar));

    let short = ndarray::arr1(&[1.0f32, 2.0]);
    assert_eq!(
        svm.predict(short.view()),
        Err(TrainError::FeatureLengthMismatch {
            expected: 3,
            actual: 2
        })
    );
}
