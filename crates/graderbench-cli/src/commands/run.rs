//! The `graderbench run` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Deserialize;

use graderbench_core::consistency::ConsistencyMetrics;
use graderbench_core::engine::{CancelToken, EvalEngine, ProgressReporter, RunState};
use graderbench_core::model::GradingContext;
use graderbench_core::report::EvaluationReport;
use graderbench_core::traits::InferenceClient;
use graderbench_report::{
    summary_markdown, write_detailed_csv, write_responses_csv, write_summary_csv,
};

use super::build_client;

/// Thin wrapper for the question TOML file; the question source proper is a
/// collaborator boundary, so no validation layer lives here.
#[derive(Debug, Deserialize)]
struct QuestionFile {
    #[serde(default)]
    questions: Vec<GradingContext>,
}

fn load_questions(path: &Path) -> Result<Vec<GradingContext>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file: {}", path.display()))?;
    let parsed: QuestionFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse question file: {}", path.display()))?;
    anyhow::ensure!(
        !parsed.questions.is_empty(),
        "question file has no [[questions]] entries: {}",
        path.display()
    );
    Ok(parsed.questions)
}

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_progress(&self, fraction: f64, status: &str, eta: Option<Duration>) {
        match eta {
            Some(eta) => eprintln!(
                "  [{:5.1}%] {status} (about {} left)",
                fraction * 100.0,
                format_duration(eta)
            ),
            None => eprintln!("  [{:5.1}%] {status}", fraction * 100.0),
        }
    }

    fn on_warm_up(&self, model: &str, ok: bool) {
        if ok {
            eprintln!("  Warmed up {model}");
        } else {
            eprintln!("  Warm-up failed for {model}, evaluating anyway");
        }
    }

    fn on_question_complete(
        &self,
        model: &str,
        question_id: u32,
        metrics: Option<&ConsistencyMetrics>,
    ) {
        if let Some(m) = metrics {
            eprintln!(
                "  Q{question_id} done with {model}: stability {:.3}, similarity {:.3}, consistency {:.3}",
                m.grade_stability, m.response_similarity, m.consistency_score
            );
        } else {
            eprintln!("  Q{question_id} done with {model}: no successful attempts");
        }
    }

    fn on_run_complete(&self, total_planned: u32, completed: u32, failed: u32, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total_planned} attempts, {failed} failed ({})",
            format_duration(elapsed)
        );
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

fn print_summary_table(report: &EvaluationReport) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header([
        "Model",
        "Questions",
        "Attempts",
        "Errors",
        "Avg accuracy",
        "Avg consistency",
        "Avg time",
    ]);

    for summary in &report.summaries {
        let pct = |v: Option<f64>| {
            v.map(|v| format!("{:.1}%", v * 100.0))
                .unwrap_or_else(|| "-".into())
        };
        table.add_row([
            summary.model.clone(),
            summary.questions_evaluated.to_string(),
            summary.total_attempts.to_string(),
            summary.error_count.to_string(),
            pct(summary.avg_accuracy),
            pct(summary.avg_consistency),
            format!("{:.2}s", summary.avg_response_time_secs),
        ]);
    }

    println!("{table}");
}

pub async fn execute(
    questions_path: PathBuf,
    models_str: String,
    attempts: u32,
    endpoint: Option<String>,
    output: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(attempts >= 1, "attempts must be at least 1");
    anyhow::ensure!(
        matches!(format.as_str(), "json" | "csv" | "markdown" | "all"),
        "format must be one of: json, csv, markdown, all"
    );

    let models: Vec<String> = models_str
        .split(',')
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
    anyhow::ensure!(!models.is_empty(), "no models given");

    let questions = load_questions(&questions_path)?;
    let client = build_client(endpoint, config_path.as_deref())?;

    for model in &models {
        if !client.model_exists(model).await {
            eprintln!("Warning: model '{model}' not reported by the server; pull it with: graderbench pull {model}");
        }
    }

    eprintln!(
        "Evaluating {} model(s) × {} question(s) × {attempts} attempt(s)",
        models.len(),
        questions.len()
    );

    let engine = EvalEngine::new(Arc::new(client));
    let cancel = CancelToken::new();

    // Ctrl-C requests cooperative cancellation; the attempt in flight is
    // allowed to finish.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nCancellation requested, finishing the attempt in flight...");
                cancel.cancel();
            }
        });
    }

    let report = engine
        .run(&models, &questions, attempts, &cancel, &ConsoleReporter)
        .await?;

    if report.state == RunState::Cancelled {
        eprintln!("Run cancelled; partial results follow.");
    }

    print_summary_table(&report);

    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create output directory: {}", output.display()))?;
    let stamp = report.created_at.format("%Y%m%d_%H%M%S");

    if format == "json" || format == "all" {
        let path = output.join(format!("evaluation_{stamp}.json"));
        report.save_json(&path)?;
        eprintln!("Wrote {}", path.display());
    }
    if format == "csv" || format == "all" {
        let summary = output.join(format!("evaluation_summary_{stamp}.csv"));
        let detailed = output.join(format!("evaluation_detailed_{stamp}.csv"));
        let responses = output.join(format!("evaluation_full_responses_{stamp}.csv"));
        write_summary_csv(&report, &summary)?;
        write_detailed_csv(&report, &detailed)?;
        write_responses_csv(&report, &responses)?;
        eprintln!("Wrote {}", summary.display());
        eprintln!("Wrote {}", detailed.display());
        eprintln!("Wrote {}", responses.display());
    }
    if format == "markdown" || format == "all" {
        let path = output.join(format!("evaluation_summary_{stamp}.md"));
        std::fs::write(&path, summary_markdown(&report))
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}
