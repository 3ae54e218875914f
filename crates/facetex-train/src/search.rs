//! Adaptive gamma search.
//!
//! Starting from the configured gamma, the loop first walks gamma down in
//! log10 space, then restarts from the starting value and walks it up, until
//! a round reaches the target held-out accuracy. When neither direction
//! succeeds the classifier is retrained once with the best gamma seen.
//!
//! Kernels without a gamma term are trained exactly once.
use crate::classifier::Classifier;
use crate::dataset::Dataset;
use crate::error::{Result, TrainError};
use crate::params::{Hyperparams, SearchParams};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Stage of the search a round belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Single round for kernels without gamma.
    Fixed,
    Decrease,
    Increase,
    Finalize,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Fixed => "fixed",
            Phase::Decrease => "decrease",
            Phase::Increase => "increase",
            Phase::Finalize => "finalize",
        };
        f.write_str(s)
    }
}

/// Report sent after every training round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Progress {
    pub phase: Phase,
    /// 1-based count of rounds trained so far, across phases.
    pub round: usize,
    pub gamma: f64,
    pub accuracy: f64,
}

/// Cooperative cancellation flag, checked before every round.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of a completed search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrainingOutcome {
    /// Hyperparameters of the model the classifier now holds.
    pub hyperparams: Hyperparams,
    pub accuracy: f64,
    pub reached_target: bool,
    pub rounds: usize,
    /// Phase of the round that produced the final model.
    pub phase: Phase,
}

/// Fraction of `test` rows the classifier labels correctly.
///
/// 0 when the classifier is untrained, the test set is empty, or prediction
/// fails.
pub fn held_out_accuracy<C: Classifier + ?Sized>(clf: &C, test: &Dataset) -> f64 {
    if !clf.is_trained() || test.is_empty() {
        return 0.0;
    }
    match clf.predict_batch(test.records()) {
        Ok(preds) => {
            let hits = preds
                .iter()
                .zip(test.labels())
                .filter(|(p, l)| p == l)
                .count();
            hits as f64 / test.len() as f64
        }
        Err(e) => {
            warn!(error = %e, "prediction on held-out set failed");
            0.0
        }
    }
}

/// Gamma search driver.
///
/// ```ignore
/// let outcome = GammaSearch::new(SearchParams::default())
///     .with_progress(tx)
///     .run(&mut svm, &Hyperparams::default(), &train, &test)?;
/// ```
#[derive(Debug, Default)]
pub struct GammaSearch {
    params: SearchParams,
    progress: Option<Sender<Progress>>,
    cancel: Option<CancelToken>,
}

/// Per-run bookkeeping.
struct RoundState {
    rounds: usize,
    best: Option<(f64, f64)>,
}

impl GammaSearch {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            progress: None,
            cancel: None,
        }
    }

    /// Send a [`Progress`] after every round. A disconnected receiver is
    /// ignored.
    pub fn with_progress(mut self, tx: Sender<Progress>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Train `clf` on `train`, tuning gamma against accuracy on `test`.
    ///
    /// Configuration and training errors abort the search. On return the
    /// classifier holds the model described by the outcome.
    #[instrument(
        level = "info",
        skip(self, clf, base, train, test),
        fields(kernel = %base.kernel, gamma = base.gamma, train = train.len(), test = test.len())
    )]
    pub fn run<C: Classifier + ?Sized>(
        &self,
        clf: &mut C,
        base: &Hyperparams,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<TrainingOutcome> {
        let step = self.params.step;
        if !(step > 0.0 && step.is_finite()) {
            return Err(TrainError::InvalidHyperparams(format!(
                "search step must be positive and finite, got {step}"
            )));
        }
        let mut state = RoundState {
            rounds: 0,
            best: None,
        };

        if !base.kernel.uses_gamma() {
            let accuracy = self.round(clf, base, Phase::Fixed, train, test, &mut state)?;
            return Ok(self.finish(*base, accuracy, state.rounds, Phase::Fixed));
        }

        let gamma_cache = base.gamma;
        for (phase, direction) in [(Phase::Decrease, -1.0), (Phase::Increase, 1.0)] {
            info!(%phase, gamma = gamma_cache, "search phase started");
            let mut gamma = gamma_cache;
            for _ in 0..self.params.max_iterations {
                let hp = base.with_gamma(gamma);
                let accuracy = self.round(clf, &hp, phase, train, test, &mut state)?;
                if accuracy >= self.params.target_accuracy {
                    return Ok(self.finish(hp, accuracy, state.rounds, phase));
                }
                gamma = 10f64.powf(gamma.log10() + direction * self.params.step);
                if phase == Phase::Decrease && gamma < self.params.min_gamma {
                    debug!(gamma, "gamma below floor");
                    break;
                }
                if !gamma.is_finite() {
                    debug!("gamma overflowed");
                    break;
                }
            }
        }

        let gamma = match state.best {
            Some((gamma, accuracy)) => {
                info!(gamma, accuracy, "target not reached, retraining with best gamma");
                gamma
            }
            None => gamma_cache,
        };
        let hp = base.with_gamma(gamma);
        let accuracy = self.round(clf, &hp, Phase::Finalize, train, test, &mut state)?;
        Ok(self.finish(hp, accuracy, state.rounds, Phase::Finalize))
    }

    /// Split `data` with [`Dataset::split_holdout`] and run the search.
    pub fn run_with_holdout<C: Classifier + ?Sized>(
        &self,
        clf: &mut C,
        base: &Hyperparams,
        data: &Dataset,
        test_fraction: f64,
    ) -> Result<TrainingOutcome> {
        let (train, test) = data.split_holdout(test_fraction);
        self.run(clf, base, &train, &test)
    }

    fn round<C: Classifier + ?Sized>(
        &self,
        clf: &mut C,
        hp: &Hyperparams,
        phase: Phase,
        train: &Dataset,
        test: &Dataset,
        state: &mut RoundState,
    ) -> Result<f64> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            info!(rounds = state.rounds, "search cancelled");
            return Err(TrainError::Cancelled);
        }

        clf.configure(hp)?;
        clf.train(train)?;
        let accuracy = held_out_accuracy(clf, test);
        state.rounds += 1;
        if state.best.map_or(true, |(_, best)| accuracy > best) {
            state.best = Some((hp.gamma, accuracy));
        }
        debug!(%phase, round = state.rounds, gamma = hp.gamma, accuracy, "round trained");

        if let Some(tx) = &self.progress {
            let _ = tx.send(Progress {
                phase,
                round: state.rounds,
                gamma: hp.gamma,
                accuracy,
            });
        }
        Ok(accuracy)
    }

    fn finish(
        &self,
        hyperparams: Hyperparams,
        accuracy: f64,
        rounds: usize,
        phase: Phase,
    ) -> TrainingOutcome {
        let reached_target = accuracy >= self.params.target_accuracy;
        info!(
            %phase,
            rounds,
            gamma = hyperparams.gamma,
            accuracy,
            reached_target,
            "training finished"
        );
        TrainingOutcome {
            hyperparams,
            accuracy,
            reached_target,
            rounds,
            phase,
        }
    }
}
