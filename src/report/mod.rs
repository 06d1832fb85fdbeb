//! Report rendering for a finished run.

use crate::error::Result;
use crate::orchestrator::PipelineOutput;
use crate::quiz::QuizOutcome;
use serde::Serialize;
use std::fmt::Write;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!(
                "Unknown format: {}. Use text, markdown, or json.",
                s
            )),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    run_id: String,
    source: &'a str,
    style: String,
    processed_at: String,
    transcript: String,
    transcript_ok: bool,
    summary: String,
    summary_ok: bool,
    quiz: &'a QuizOutcome,
}

/// Render `output` as a document containing the transcript, summary and quiz.
pub fn render_report(output: &PipelineOutput, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(output)),
        ReportFormat::Markdown => Ok(render_markdown(output)),
        ReportFormat::Json => {
            let report = JsonReport {
                run_id: output.run_id.to_string(),
                source: &output.source,
                style: output.style.to_string(),
                processed_at: output.processed_at.to_rfc3339(),
                transcript: output.transcript.to_string(),
                transcript_ok: output.transcript.is_recognized(),
                summary: output.summary.to_string(),
                summary_ok: output.summary.is_generated(),
                quiz: &output.quiz,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

fn heading(title: &str, ok: bool, failure: &str) -> String {
    if ok {
        title.to_string()
    } else {
        format!("{} ({})", title, failure)
    }
}

fn render_text(output: &PipelineOutput) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}\n{}\n",
        heading("Video Transcript", output.transcript.is_recognized(), "recognition failed"),
        output.transcript
    );
    let _ = writeln!(
        out,
        "{}\n{}\n",
        heading("Summary", output.summary.is_generated(), "summarization failed"),
        output.summary
    );
    let _ = writeln!(out, "Quiz\n{}", output.quiz.question());
    for option in output.quiz.options() {
        let _ = writeln!(out, "{}", option);
    }
    out
}

fn render_markdown(output: &PipelineOutput) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# Video Transcript\n\n*Source: {} | Style: {} | {}*\n",
        output.source,
        output.style,
        output.processed_at.format("%Y-%m-%d %H:%M UTC")
    );
    if !output.transcript.is_recognized() {
        let _ = writeln!(out, "> Recognition failed\n");
    }
    let _ = writeln!(out, "{}\n", output.transcript);

    let _ = writeln!(out, "## Summary\n");
    if !output.summary.is_generated() {
        let _ = writeln!(out, "> Summarization failed\n");
    }
    let _ = writeln!(out, "{}\n", output.summary);

    let _ = writeln!(out, "## Quiz\n\n**{}**\n", output.quiz.question());
    for option in output.quiz.options() {
        let _ = writeln!(out, "- {}", option);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecognitionError;
    use crate::quiz::compose_quiz;
    use crate::summarization::{Summary, SummaryStyle};
    use crate::transcription::Transcript;
    use chrono::Utc;
    use uuid::Uuid;

    fn output(transcript: Transcript, summary: &str) -> PipelineOutput {
        PipelineOutput {
            run_id: Uuid::new_v4(),
            source: "lecture.mp4".to_string(),
            style: SummaryStyle::Concise,
            processed_at: Utc::now(),
            transcript,
            summary: Summary::Generated(summary.to_string()),
            quiz: compose_quiz(summary),
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("pdf".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_text_layout() {
        let out = output(
            Transcript::Recognized("hello world".into()),
            "First idea. Second idea.",
        );
        let text = render_report(&out, ReportFormat::Text).unwrap();
        let transcript_at = text.find("Video Transcript\nhello world").unwrap();
        let summary_at = text.find("Summary\nFirst idea. Second idea.").unwrap();
        let quiz_at = text
            .find("Quiz\nWhat is the main idea of: 'First idea'?\nA) First idea\nB) Something unrelated.")
            .unwrap();
        assert!(transcript_at < summary_at && summary_at < quiz_at);
        assert!(text.ends_with("D) None of the above.\n"));
    }

    #[test]
    fn test_failed_stage_is_labeled() {
        let out = output(
            Transcript::Failed(RecognitionError::Unintelligible),
            "Only one",
        );
        let text = render_report(&out, ReportFormat::Text).unwrap();
        assert!(text.contains("Video Transcript (recognition failed)\nCould not understand audio."));
        assert!(text.contains("Quiz\nSummary too short for quiz.\n"));

        let md = render_report(&out, ReportFormat::Markdown).unwrap();
        assert!(md.contains("> Recognition failed"));
        assert!(!md.contains("> Summarization failed"));
    }

    #[test]
    fn test_json_uses_legacy_quiz_record() {
        let out = output(Transcript::Recognized("t".into()), "A. B.");
        let json: serde_json::Value =
            serde_json::from_str(&render_report(&out, ReportFormat::Json).unwrap()).unwrap();
        assert_eq!(json["quiz"]["answer"], "A");
        assert_eq!(json["quiz"]["question"], "What is the main idea of: 'A'?");
        assert_eq!(json["transcript_ok"], true);
        assert_eq!(json["style"], "concise");
        assert_eq!(json["source"], "lecture.mp4");
    }

    #[test]
    fn test_json_run_metadata_as_strings() {
        let out = output(Transcript::Recognized("t".into()), "A. B.");
        let json: serde_json::Value =
            serde_json::from_str(&render_report(&out, ReportFormat::Json).unwrap()).unwrap();
        assert_eq!(json["run_id"], out.run_id.to_string());
        let stamp = json["processed_at"].as_str().unwrap();
        let parsed = chrono::DateTime::parse_from_rfc3339(stamp).unwrap();
        assert_eq!(parsed.timestamp(), out.processed_at.timestamp());
    }
}
