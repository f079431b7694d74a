//! Shared fixtures for export tests.

use chrono::Utc;
use uuid::Uuid;

use graderbench_core::consistency::ConsistencyMetrics;
use graderbench_core::engine::RunState;
use graderbench_core::error::{ErrorInfo, ErrorKind};
use graderbench_core::model::{AttemptRecord, Confidence, EvaluationTask};
use graderbench_core::report::{summarize_model, EvaluationReport, ModelRun};

/// One model, one question, one success and one transport failure.
pub fn sample_report() -> EvaluationReport {
    let metrics = ConsistencyMetrics {
        grade_stability: 1.0,
        response_similarity: 0.0,
        consistency_score: 0.7,
        grade_values: vec![0.8],
        grade_std_dev: 0.0,
    };

    let prompt = "Question: What causes rain?\n\nCorrect Answer: Condensation.\n\n\
                  Student's Answer: Clouds.\n\n\
                  Grade the student's answer based on the correct answer from (0.0 - 1.0)";

    let success = AttemptRecord {
        task: EvaluationTask {
            model_id: "llama3.1:8b".into(),
            question_id: 1,
            attempt: 1,
        },
        prompt: prompt.into(),
        response: Some("Reasonable coverage. Grade: 0.8".into()),
        grade: Some(0.8),
        confidence: Some(Confidence::High),
        response_time_secs: 1.5,
        accuracy: Some(0.9),
        error: None,
        consistency: Some(metrics.clone()),
    };

    let failure = AttemptRecord {
        task: EvaluationTask {
            model_id: "llama3.1:8b".into(),
            question_id: 1,
            attempt: 2,
        },
        prompt: prompt.into(),
        response: None,
        grade: None,
        confidence: None,
        response_time_secs: 0.0,
        accuracy: None,
        error: Some(ErrorInfo {
            kind: ErrorKind::Transport,
            message: "transport error: connection refused".into(),
        }),
        consistency: Some(metrics),
    };

    let run = ModelRun {
        model: "llama3.1:8b".into(),
        records: vec![success, failure],
    };

    EvaluationReport {
        run_id: Uuid::nil(),
        created_at: Utc::now(),
        state: RunState::Completed,
        total_planned: 6,
        completed: 2,
        duration_ms: 3200,
        summaries: vec![summarize_model(&run)],
        model_runs: vec![run],
    }
}
