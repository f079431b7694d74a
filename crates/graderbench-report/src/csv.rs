//! CSV export of evaluation runs.
//!
//! Three shapes: a per-model summary, a detailed per-attempt file without the
//! long text fields, and a full-responses file carrying prompt and response
//! verbatim.

use std::path::Path;

use anyhow::{Context, Result};

use graderbench_core::report::EvaluationReport;

/// Write the per-model summary table.
pub fn write_summary_csv(report: &EvaluationReport, path: &Path) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer.write_record([
        "model",
        "questions_evaluated",
        "total_attempts",
        "error_count",
        "avg_accuracy",
        "avg_consistency",
        "avg_response_time_secs",
    ])?;

    for summary in &report.summaries {
        writer.write_record([
            summary.model.clone(),
            summary.questions_evaluated.to_string(),
            summary.total_attempts.to_string(),
            summary.error_count.to_string(),
            format_opt(summary.avg_accuracy),
            format_opt(summary.avg_consistency),
            format!("{:.3}", summary.avg_response_time_secs),
        ])?;
    }

    writer.flush().context("failed to flush summary CSV")?;
    Ok(())
}

/// Write one row per attempt, long text fields excluded.
pub fn write_detailed_csv(report: &EvaluationReport, path: &Path) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer.write_record([
        "model",
        "question_id",
        "attempt",
        "grade",
        "accuracy",
        "confidence",
        "consistency_score",
        "grade_stability",
        "response_similarity",
        "grade_std_dev",
        "response_time_secs",
        "error_kind",
        "error",
    ])?;

    for run in &report.model_runs {
        for record in &run.records {
            let metrics = record.consistency.as_ref();
            writer.write_record([
                run.model.clone(),
                record.task.question_id.to_string(),
                record.task.attempt.to_string(),
                format_opt(record.grade),
                format_opt(record.accuracy),
                record
                    .confidence
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
                format_opt(metrics.map(|m| m.consistency_score)),
                format_opt(metrics.map(|m| m.grade_stability)),
                format_opt(metrics.map(|m| m.response_similarity)),
                format_opt(metrics.map(|m| m.grade_std_dev)),
                format!("{:.3}", record.response_time_secs),
                record
                    .error
                    .as_ref()
                    .map(|e| format!("{:?}", e.kind).to_lowercase())
                    .unwrap_or_default(),
                record
                    .error
                    .as_ref()
                    .map(|e| e.message.clone())
                    .unwrap_or_default(),
            ])?;
        }
    }

    writer.flush().context("failed to flush detailed CSV")?;
    Ok(())
}

/// Write prompts and full responses, one row per attempt.
pub fn write_responses_csv(report: &EvaluationReport, path: &Path) -> Result<()> {
    let mut writer = open_writer(path)?;
    writer.write_record(["model", "question_id", "attempt", "prompt", "response"])?;

    for run in &report.model_runs {
        for record in &run.records {
            writer.write_record([
                run.model.clone(),
                record.task.question_id.to_string(),
                record.task.attempt.to_string(),
                record.prompt.clone(),
                record.response.clone().unwrap_or_default(),
            ])?;
        }
    }

    writer.flush().context("failed to flush responses CSV")?;
    Ok(())
}

fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    csv::Writer::from_path(path)
        .with_context(|| format!("failed to create CSV file: {}", path.display()))
}

fn format_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_report;

    #[test]
    fn summary_csv_has_one_row_per_model() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        write_summary_csv(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("model,questions_evaluated"));
        assert!(lines[1].starts_with("llama3.1:8b,1,2,1,"));
    }

    #[test]
    fn detailed_csv_includes_error_rows() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detailed.csv");

        write_detailed_csv(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("0.800"));
        assert!(lines[2].contains("transport"));
        assert!(lines[2].contains("connection refused"));
    }

    #[test]
    fn responses_csv_quotes_multiline_prompts() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.csv");

        write_responses_csv(&report, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].get(3).unwrap().contains("Question:"));
        assert!(rows[0].get(4).unwrap().contains("Grade: 0.8"));
        assert_eq!(rows[1].get(4).unwrap(), "");
    }
}
