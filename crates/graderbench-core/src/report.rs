//! Evaluation run reports with JSON persistence.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::RunState;
use crate::model::AttemptRecord;

/// All attempt records for one model, in completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRun {
    pub model: String,
    pub records: Vec<AttemptRecord>,
}

/// Per-model aggregate statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    /// Distinct questions with at least one record.
    pub questions_evaluated: usize,
    /// Total attempt records, errors included.
    pub total_attempts: usize,
    /// Attempts that failed at the request level.
    pub error_count: usize,
    /// Mean accuracy over attempts that have one.
    pub avg_accuracy: Option<f64>,
    /// Mean consistency score over attempts that carry metrics.
    pub avg_consistency: Option<f64>,
    /// Mean response time across all attempts (failed attempts count as 0).
    pub avg_response_time_secs: f64,
}

/// Summarize one model's records.
pub fn summarize_model(run: &ModelRun) -> ModelSummary {
    let records = &run.records;
    let questions: BTreeSet<u32> = records.iter().map(|r| r.task.question_id).collect();
    let error_count = records.iter().filter(|r| r.is_error()).count();

    let accuracies: Vec<f64> = records.iter().filter_map(|r| r.accuracy).collect();
    let consistencies: Vec<f64> = records
        .iter()
        .filter_map(|r| r.consistency.as_ref().map(|c| c.consistency_score))
        .collect();

    let avg = |values: &[f64]| -> Option<f64> {
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    };

    let avg_response_time_secs = records
        .iter()
        .map(|r| r.response_time_secs)
        .sum::<f64>()
        / records.len().max(1) as f64;

    ModelSummary {
        model: run.model.clone(),
        questions_evaluated: questions.len(),
        total_attempts: records.len(),
        error_count,
        avg_accuracy: avg(&accuracies),
        avg_consistency: avg(&consistencies),
        avg_response_time_secs,
    }
}

/// A complete evaluation run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// When the run finished.
    pub created_at: DateTime<Utc>,
    /// Terminal state: `Completed` or `Cancelled`.
    pub state: RunState,
    /// `models × questions × attempts`, fixed at run start.
    pub total_planned: u32,
    /// Attempts actually performed (equals `total_planned` unless cancelled).
    pub completed: u32,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Per-model aggregate statistics, in model order.
    pub summaries: Vec<ModelSummary>,
    /// Per-model records, in the order the models were evaluated.
    pub model_runs: Vec<ModelRun>,
}

impl EvaluationReport {
    /// Save the report as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: EvaluationReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
