//! Caller-facing response document and report files.
//!
//! One JSON document plus a Markdown rendering per run, written into a
//! dated report directory. The JSON document is also what `run --json`
//! prints for machine consumers.

use crate::error::OutputError;
use crate::pipeline::budget::TruncationNotice;
use crate::pipeline::{RoundReport, RunReport, SentenceOutcome};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct ResponseDocument {
    pub request_id: String,
    pub timestamp: String,
    pub original_paragraph: String,
    pub final_paragraph: String,
    pub total_sentences: usize,
    pub successful_analyses: usize,
    pub failed_analyses: usize,
    /// Outcomes of the final round, ascending by sentence index.
    pub sentence_results: Vec<SentenceOutcome>,
    /// Every round with its paragraph snapshot, for audit.
    pub rounds: Vec<RoundReport>,
    pub session_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<TruncationNotice>,
    pub summary: Summary,
    pub elapsed_sec: f64,
    pub progress_log: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    /// Percentage of sentences with a successful analysis in the final round.
    pub processing_success_rate: f64,
    pub sentences_processed: usize,
    pub sentences_failed: usize,
    pub paragraph_updated: bool,
}

pub fn build_response(report: &RunReport, progress_log: Vec<String>) -> ResponseDocument {
    let final_outcomes = report.final_outcomes();
    let successful = final_outcomes.iter().filter(|o| o.success).count();
    let failed = final_outcomes.len() - successful;
    let rate = if final_outcomes.is_empty() {
        0.0
    } else {
        successful as f64 / final_outcomes.len() as f64 * 100.0
    };

    ResponseDocument {
        request_id: report.request_id.clone(),
        timestamp: Utc::now().to_rfc3339(),
        original_paragraph: report.original_paragraph.clone(),
        final_paragraph: report.final_paragraph.clone(),
        total_sentences: final_outcomes.len(),
        successful_analyses: successful,
        failed_analyses: failed,
        sentence_results: final_outcomes.to_vec(),
        rounds: report.rounds.clone(),
        session_urls: report.session_urls(),
        truncation: report.truncation,
        summary: Summary {
            processing_success_rate: rate,
            sentences_processed: successful,
            sentences_failed: failed,
            paragraph_updated: report.paragraph_updated(),
        },
        elapsed_sec: report.duration_sec,
        progress_log,
    }
}

/// Write `<request_id>.json` and `<request_id>.md` into the report dir.
pub fn write_reports(report_dir: &Path, response: &ResponseDocument) -> Result<(), OutputError> {
    fs::create_dir_all(report_dir).map_err(OutputError::CreateDir)?;

    let json_path = report_dir.join(format!("{}.json", response.request_id));
    let json = serde_json::to_string_pretty(response)?;
    fs::write(&json_path, json).map_err(OutputError::WriteReport)?;

    let md_path = report_dir.join(format!("{}.md", response.request_id));
    fs::write(&md_path, build_markdown(response)).map_err(OutputError::WriteReport)?;

    Ok(())
}

pub fn build_markdown(response: &ResponseDocument) -> String {
    let mut md = String::new();

    md.push_str("# writeaid Revision Report\n\n");
    md.push_str(&format!("**Request:** {}\n", response.request_id));
    md.push_str(&format!("**Generated:** {}\n", response.timestamp));
    md.push_str(&format!("**Duration:** {:.1}s\n\n", response.elapsed_sec));

    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Sentences | {} |\n", response.total_sentences));
    md.push_str(&format!("| Revised | {} |\n", response.successful_analyses));
    md.push_str(&format!("| Failed | {} |\n", response.failed_analyses));
    md.push_str(&format!(
        "| Success rate | {:.1}% |\n",
        response.summary.processing_success_rate
    ));
    md.push_str(&format!(
        "| Paragraph updated | {} |\n",
        response.summary.paragraph_updated
    ));
    if let Some(t) = &response.truncation {
        md.push_str(&format!(
            "| Truncated | kept {}, dropped {} |\n",
            t.kept, t.dropped
        ));
    }
    md.push_str("\n---\n\n");

    md.push_str("## Original\n\n");
    md.push_str(&format!("{}\n\n", response.original_paragraph));
    md.push_str("## Final\n\n");
    md.push_str(&format!("{}\n\n", response.final_paragraph));

    md.push_str("## Sentences\n\n");
    md.push_str("| # | Status | Original | Revised |\n");
    md.push_str("|---|--------|----------|----------|\n");
    for outcome in &response.sentence_results {
        let status = if !outcome.success {
            "❌ failed"
        } else if outcome.improved_sentence.is_some() {
            "✅ revised"
        } else {
            "⏭️ unchanged"
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            outcome.index + 1,
            status,
            outcome.sentence,
            outcome.improved_sentence.as_deref().unwrap_or("—"),
        ));
    }

    if !response.session_urls.is_empty() {
        md.push_str("\n## Sessions\n\n");
        for url in &response.session_urls {
            md.push_str(&format!("- {}\n", url));
        }
    }

    if !response.progress_log.is_empty() {
        md.push_str("\n## Progress\n\n");
        for line in &response.progress_log {
            md.push_str(&format!("- {}\n", line));
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_report() -> RunReport {
        let outcomes = vec![
            SentenceOutcome {
                index: 0,
                sentence: "This is bad.".to_string(),
                improved_sentence: Some("This is better.".to_string()),
                session_id: Some("s1".to_string()),
                session_url: Some("https://example.test/?session_id=s1".to_string()),
                round: 0,
                success: true,
                error: None,
                duration_sec: 10.0,
            },
            SentenceOutcome::failed(
                1,
                0,
                "This is also bad.",
                "POST /api/v1/sessions/ returned status 500".to_string(),
                Duration::from_secs(1),
            ),
        ];
        RunReport {
            request_id: "req-1".to_string(),
            original_paragraph: "This is bad. This is also bad.".to_string(),
            final_paragraph: "This is better. This is also bad.".to_string(),
            rounds: vec![RoundReport {
                round: 0,
                outcomes,
                paragraph: "This is better. This is also bad.".to_string(),
            }],
            truncation: None,
            duration_sec: 11.0,
        }
    }

    #[test]
    fn response_counts_and_rate_reflect_final_round() {
        let response = build_response(&sample_report(), vec![]);
        assert_eq!(response.total_sentences, 2);
        assert_eq!(response.successful_analyses, 1);
        assert_eq!(response.failed_analyses, 1);
        assert!((response.summary.processing_success_rate - 50.0).abs() < f64::EPSILON);
        assert!(response.summary.paragraph_updated);
        assert_eq!(response.session_urls, vec!["https://example.test/?session_id=s1"]);
    }

    #[test]
    fn empty_run_has_zero_rate() {
        let report = RunReport {
            request_id: "req-2".to_string(),
            original_paragraph: String::new(),
            final_paragraph: String::new(),
            rounds: vec![],
            truncation: None,
            duration_sec: 0.0,
        };
        let response = build_response(&report, vec![]);
        assert_eq!(response.summary.processing_success_rate, 0.0);
        assert!(!response.summary.paragraph_updated);
    }

    #[test]
    fn markdown_lists_every_sentence() {
        let response = build_response(&sample_report(), vec!["line one".to_string()]);
        let md = build_markdown(&response);
        assert!(md.contains("This is bad."));
        assert!(md.contains("✅ revised"));
        assert!(md.contains("❌ failed"));
        assert!(md.contains("## Progress"));
    }
}
