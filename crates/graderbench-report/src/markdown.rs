//! Markdown summary rendering.

use graderbench_core::engine::RunState;
use graderbench_core::report::EvaluationReport;

/// Render the per-model summary as a markdown table.
pub fn summary_markdown(report: &EvaluationReport) -> String {
    let mut md = String::new();

    let state = match report.state {
        RunState::Cancelled => " (cancelled)",
        _ => "",
    };
    md.push_str(&format!(
        "**Run {}**: {}/{} attempts in {:.1}s{}\n\n",
        report.run_id,
        report.completed,
        report.total_planned,
        report.duration_ms as f64 / 1000.0,
        state
    ));

    md.push_str("| Model | Questions | Attempts | Errors | Avg accuracy | Avg consistency | Avg time |\n");
    md.push_str("|-------|-----------|----------|--------|--------------|-----------------|----------|\n");
    for summary in &report.summaries {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {:.2}s |\n",
            summary.model,
            summary.questions_evaluated,
            summary.total_attempts,
            summary.error_count,
            format_pct(summary.avg_accuracy),
            format_pct(summary.avg_consistency),
            summary.avg_response_time_secs,
        ));
    }

    md
}

fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => "—".to_string(),
    }
}
