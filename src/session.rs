//! Interactive dashboard session.
//!
//! One session owns every piece of mutable state: the live feed, the sampler
//! and the statistics. Commands and live ticks are applied one at a time by a
//! single task, so nothing here is shared or locked.

use crate::batch::{BatchOutcome, BatchSampler};
use crate::command::{Command, HELP};
use crate::feature_encoder::FeatureEncoder;
use crate::holdout::{HoldoutSet, RowSampler};
use crate::live_feed::{LiveFeed, Transition};
use crate::metrics::SessionStats;
use crate::models::classifier::Classifier;
use crate::notifier::AlertNotifier;
use crate::predictor::Predictor;
use crate::render;
use crate::types::transaction::{FeatureVector, TransactionInput};
use tracing::{error, info, warn};

const BATCH_UNAVAILABLE: &str = "Random transaction simulation unavailable (missing held-out dataset).";
const LIVE_UNAVAILABLE: &str = "Live transaction feed unavailable (missing held-out dataset).";

/// Something for the presentation layer to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Rendered result
    Render(String),
    /// Informational notice
    Info(String),
    /// The requested action failed
    Error(String),
    /// End of session requested
    Quit,
}

/// Dashboard state for one user.
pub struct Dashboard<C, N> {
    encoder: FeatureEncoder,
    predictor: Predictor<C, N>,
    batch: BatchSampler,
    holdout: Option<HoldoutSet>,
    sampler: RowSampler,
    feed: LiveFeed,
    stats: SessionStats,
}

impl<C: Classifier, N: AlertNotifier> Dashboard<C, N> {
    pub fn new(
        predictor: Predictor<C, N>,
        batch: BatchSampler,
        holdout: Option<HoldoutSet>,
        sampler: RowSampler,
        feed: LiveFeed,
    ) -> Self {
        Self {
            encoder: FeatureEncoder::new(),
            predictor,
            batch,
            holdout: holdout.filter(|set| !set.is_empty()),
            sampler,
            feed,
            stats: SessionStats::new(),
        }
    }

    pub fn feed(&self) -> &LiveFeed {
        &self.feed
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Whether batch and live features have rows to sample.
    pub fn has_holdout(&self) -> bool {
        self.holdout.is_some()
    }

    /// Whether the driver should keep ticking.
    pub fn is_live(&self) -> bool {
        self.feed.is_running()
    }

    /// Notices shown once when the session opens.
    pub fn startup_notices(&self) -> Vec<Output> {
        let mut notices = Vec::new();
        if !self.has_holdout() {
            notices.push(Output::Info(BATCH_UNAVAILABLE.to_string()));
        }
        notices.push(Output::Info(render::feed_status(&self.feed)));
        notices
    }

    /// Apply one user command.
    pub async fn handle(&mut self, command: Command) -> Output {
        match command {
            Command::Predict(input) => self.predict(&input).await,
            Command::Example => self.predict(&TransactionInput::example()).await,
            Command::Batch => self.run_batch(),
            Command::Start => self.start_feed(),
            Command::Stop => self.stop_feed(),
            Command::Status => Output::Info(render::feed_status(&self.feed)),
            Command::Help => Output::Info(HELP.to_string()),
            Command::Quit => Output::Quit,
        }
    }

    async fn predict(&mut self, input: &TransactionInput) -> Output {
        let features = match self.encoder.encode(input) {
            Ok(features) => features,
            Err(e) => {
                warn!(error = %e, "Rejected transaction input");
                return Output::Error(format!("Invalid transaction: {}", e));
            }
        };

        match self.predictor.evaluate(&features).await {
            Ok(evaluation) => {
                self.stats.record_evaluation(&evaluation);
                Output::Render(render::prediction(&evaluation))
            }
            Err(e) => {
                self.stats.record_classifier_error();
                error!(error = %e, "Prediction failed");
                Output::Error(format!("Prediction failed: {}", e))
            }
        }
    }

    fn run_batch(&mut self) -> Output {
        let outcome = self.batch.run(
            self.predictor.classifier(),
            self.holdout.as_ref(),
            &mut self.sampler,
        );

        match outcome {
            Ok(BatchOutcome::Unavailable) => Output::Info(BATCH_UNAVAILABLE.to_string()),
            Ok(BatchOutcome::Scored(report)) => {
                self.stats.record_batch(&report);
                info!(
                    rows = report.rows.len(),
                    fraud_count = report.fraud_count,
                    "Random batch scored"
                );
                Output::Render(render::batch_report(&report))
            }
            Err(e) => {
                self.stats.record_classifier_error();
                error!(error = %e, "Batch scoring failed");
                Output::Error(format!("Batch scoring failed: {}", e))
            }
        }
    }

    fn start_feed(&mut self) -> Output {
        if !self.has_holdout() {
            return Output::Info(LIVE_UNAVAILABLE.to_string());
        }

        match self.feed.start() {
            Transition::Started => {
                info!(max_iterations = self.feed.max_iterations(), "Live feed started");
                Output::Info("▶️ Live simulation started.".to_string())
            }
            _ => Output::Info("Live simulation already running.".to_string()),
        }
    }

    fn stop_feed(&mut self) -> Output {
        match self.feed.stop() {
            Transition::Stopped => {
                info!(
                    iterations = self.feed.completed_iterations(),
                    "Live feed stopped manually"
                );
                Output::Info("✅ Simulation stopped manually.".to_string())
            }
            _ => Output::Info("Simulation is not running.".to_string()),
        }
    }

    /// Run one live feed iteration if the feed is running.
    ///
    /// Returns `None` when there is nothing to do. The caller waits the
    /// configured interval before ticking again.
    pub async fn tick(&mut self) -> Option<Output> {
        let iteration = self.feed.next_iteration()?;

        let Some(row) = self.sample_live_row() else {
            self.feed.stop();
            return Some(Output::Info(LIVE_UNAVAILABLE.to_string()));
        };
        self.stats.record_live_iteration();

        let output = match self.predictor.evaluate(&row).await {
            Ok(evaluation) => {
                self.stats.record_evaluation(&evaluation);
                let mut frame = render::live_frame(iteration, self.feed.max_iterations(), &row, &evaluation);
                if !self.feed.is_running() {
                    info!(iterations = iteration, "Live feed finished");
                    frame.push_str(&render::feed_status(&self.feed));
                    frame.push('\n');
                }
                Output::Render(frame)
            }
            // Only this iteration is lost; the feed keeps running
            Err(e) => {
                self.stats.record_classifier_error();
                error!(iteration = iteration, error = %e, "Live prediction failed");
                Output::Error(format!("Transaction {} could not be scored: {}", iteration, e))
            }
        };

        Some(output)
    }

    fn sample_live_row(&mut self) -> Option<FeatureVector> {
        let holdout = self.holdout.as_ref()?;
        self.sampler.pick_one(holdout.rows())
    }
}
