//! Central eval engine orchestrator.
//!
//! Runs the model × question × attempt grid sequentially against an
//! inference client, extracts a grade from each response, and scores
//! per-question consistency once a question's attempt set has terminated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consistency::{analyze, AttemptSample, ConsistencyMetrics};
use crate::error::ErrorInfo;
use crate::extract::{accuracy, extract_grade};
use crate::model::{AttemptRecord, Confidence, EvaluationTask, GradingContext};
use crate::report::{summarize_model, EvaluationReport, ModelRun};
use crate::traits::InferenceClient;

/// Throwaway prompt sent once per model to surface cold-start latency.
const WARM_UP_PROMPT: &str = "Hello, are you ready?";

/// Lifecycle of an evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Cooperative cancellation handle.
///
/// Checked before each new model, question, and attempt; an in-flight
/// request is never aborted, so at most one outstanding attempt completes
/// after cancellation is requested.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    /// Called after every attempt with the completed fraction of the planned
    /// grid, a human-readable status line, and a linear time-remaining
    /// estimate (`None` until at least one attempt has completed).
    fn on_progress(&self, fraction: f64, status: &str, eta: Option<Duration>);

    /// Warm-up outcome for a model. Informational only.
    fn on_warm_up(&self, _model: &str, _ok: bool) {}

    /// A question's attempt set terminated and its metrics were computed.
    fn on_question_complete(
        &self,
        _model: &str,
        _question_id: u32,
        _metrics: Option<&ConsistencyMetrics>,
    ) {
    }

    /// The run reached a terminal state.
    fn on_run_complete(&self, _total_planned: u32, _completed: u32, _failed: u32, _elapsed: Duration) {
    }
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_progress(&self, _: f64, _: &str, _: Option<Duration>) {}
}

/// Raw outcome of one attempt, before metrics are known.
struct AttemptOutcome {
    task: EvaluationTask,
    response: Option<String>,
    grade: Option<f64>,
    confidence: Option<Confidence>,
    response_time_secs: f64,
    accuracy: Option<f64>,
    error: Option<ErrorInfo>,
}

impl AttemptOutcome {
    fn into_record(
        self,
        prompt: String,
        consistency: Option<ConsistencyMetrics>,
    ) -> AttemptRecord {
        AttemptRecord {
            task: self.task,
            prompt,
            response: self.response,
            grade: self.grade,
            confidence: self.confidence,
            response_time_secs: self.response_time_secs,
            accuracy: self.accuracy,
            error: self.error,
            consistency,
        }
    }
}

/// The central eval engine.
///
/// Holds no per-run state beyond the lifecycle flag; each `run` call owns its
/// accumulating records and hands them back as an [`EvaluationReport`].
pub struct EvalEngine {
    client: Arc<dyn InferenceClient>,
    state: Mutex<RunState>,
}

impl EvalEngine {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            client,
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap()
    }

    /// Run the evaluation grid.
    ///
    /// The loop is strictly sequential; callers typically `tokio::spawn` this
    /// future and watch it through the reporter. Once started, the run never
    /// fails: every attempted task produces exactly one record, and the
    /// future resolves with the report when the grid is exhausted or the
    /// token fires.
    pub async fn run(
        &self,
        models: &[String],
        questions: &[GradingContext],
        attempts_per_question: u32,
        cancel: &CancelToken,
        progress: &dyn ProgressReporter,
    ) -> Result<EvaluationReport> {
        anyhow::ensure!(!models.is_empty(), "at least one model is required");
        anyhow::ensure!(!questions.is_empty(), "at least one question is required");
        anyhow::ensure!(
            attempts_per_question >= 1,
            "attempts_per_question must be at least 1"
        );
        {
            let mut state = self.state.lock().unwrap();
            anyhow::ensure!(
                *state != RunState::Running,
                "an evaluation run is already active"
            );
            *state = RunState::Running;
        }

        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let total_planned = models.len() as u32 * questions.len() as u32 * attempts_per_question;
        let mut completed = 0u32;
        let mut failed = 0u32;
        let mut model_runs: Vec<ModelRun> = Vec::with_capacity(models.len());

        tracing::info!(
            %run_id,
            total_planned,
            models = models.len(),
            questions = questions.len(),
            attempts_per_question,
            "starting evaluation run"
        );

        for model in models {
            if cancel.is_cancelled() {
                break;
            }

            tracing::info!(%model, "warming up");
            let warm = self.client.generate(model, WARM_UP_PROMPT).await.is_ok();
            if warm {
                tracing::info!(%model, "model ready");
            } else {
                tracing::warn!(%model, "warm-up failed, evaluating anyway");
            }
            progress.on_warm_up(model, warm);

            let mut records = Vec::new();

            for (index, question) in questions.iter().enumerate() {
                if cancel.is_cancelled() {
                    break;
                }
                let question_id = index as u32 + 1;
                let prompt = question.grading_prompt();
                tracing::debug!(%model, question_id, "starting question");

                let mut outcomes: Vec<AttemptOutcome> = Vec::new();

                for attempt in 1..=attempts_per_question {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let task = EvaluationTask {
                        model_id: model.clone(),
                        question_id,
                        attempt,
                    };
                    let status =
                        format!("Q{question_id}, attempt {attempt}/{attempts_per_question} with {model}");

                    let outcome = match self.client.generate(model, &prompt).await {
                        Ok(generation) => {
                            let (grade, confidence) = extract_grade(&generation.text);
                            let acc = question.reference_grade.map(|r| accuracy(grade, r));
                            AttemptOutcome {
                                task,
                                response: Some(generation.text),
                                grade: Some(grade),
                                confidence: Some(confidence),
                                response_time_secs: generation.response_time_secs,
                                accuracy: acc,
                                error: None,
                            }
                        }
                        Err(e) => {
                            tracing::warn!(%model, question_id, attempt, error = %e, "attempt failed");
                            failed += 1;
                            AttemptOutcome {
                                task,
                                response: None,
                                grade: None,
                                confidence: None,
                                response_time_secs: 0.0,
                                accuracy: None,
                                error: Some(ErrorInfo::from(&e)),
                            }
                        }
                    };
                    outcomes.push(outcome);

                    completed += 1;
                    let fraction = f64::from(completed) / f64::from(total_planned);
                    progress.on_progress(
                        fraction,
                        &status,
                        estimate_remaining(start.elapsed(), completed, total_planned),
                    );
                }

                // Metrics cover the successful attempts only; error records
                // still carry a copy for traceability.
                let metrics = {
                    let samples: Vec<AttemptSample<'_>> = outcomes
                        .iter()
                        .filter_map(|o| match (o.grade, o.response.as_deref()) {
                            (Some(grade), Some(response)) => {
                                Some(AttemptSample { grade, response })
                            }
                            _ => None,
                        })
                        .collect();
                    if samples.is_empty() {
                        None
                    } else {
                        Some(analyze(&samples))
                    }
                };

                if let Some(m) = &metrics {
                    tracing::info!(
                        %model,
                        question_id,
                        grade_stability = m.grade_stability,
                        response_similarity = m.response_similarity,
                        consistency_score = m.consistency_score,
                        "question complete"
                    );
                }
                progress.on_question_complete(model, question_id, metrics.as_ref());

                for outcome in outcomes {
                    records.push(outcome.into_record(prompt.clone(), metrics.clone()));
                }
            }

            model_runs.push(ModelRun {
                model: model.clone(),
                records,
            });
        }

        let final_state = if cancel.is_cancelled() {
            RunState::Cancelled
        } else {
            RunState::Completed
        };
        *self.state.lock().unwrap() = final_state;

        let elapsed = start.elapsed();
        progress.on_run_complete(total_planned, completed, failed, elapsed);
        tracing::info!(
            %run_id,
            completed,
            failed,
            total_planned,
            state = ?final_state,
            elapsed_ms = elapsed.as_millis() as u64,
            "evaluation run finished"
        );

        let summaries = model_runs.iter().map(summarize_model).collect();

        Ok(EvaluationReport {
            run_id,
            created_at: chrono::Utc::now(),
            state: final_state,
            total_planned,
            completed,
            duration_ms: elapsed.as_millis() as u64,
            summaries,
            model_runs,
        })
    }
}

/// Linear extrapolation of the remaining wall-clock time.
fn estimate_remaining(elapsed: Duration, completed: u32, total: u32) -> Option<Duration> {
    if completed == 0 {
        return None;
    }
    let elapsed_secs = elapsed.as_secs_f64();
    if elapsed_secs <= 0.0 {
        return None;
    }
    let estimated_total = elapsed_secs * f64::from(total) / f64::from(completed);
    Some(Duration::from_secs_f64((estimated_total - elapsed_secs).max(0.0)))
}
