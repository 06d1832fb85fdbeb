//! Process command implementation.

use crate::audio_source::VideoReference;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::quiz::{AnswerCheck, QuizOutcome};
use crate::report::{render_report, ReportFormat};
use crate::summarization::SummaryStyle;
use anyhow::Result;
use std::io::{self, BufRead, Write};

/// Run the process command.
pub async fn run_process(
    input: &str,
    style: &str,
    output: Option<String>,
    format: &str,
    interactive: bool,
    settings: Settings,
) -> Result<()> {
    let style: SummaryStyle = style.parse()?;
    let report_format: ReportFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let reference = VideoReference::parse(input);

    let operation = if reference.is_remote() {
        Operation::ProcessRemote
    } else {
        Operation::ProcessLocal
    };
    preflight::check(operation, &settings)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Processing {}...", reference));
    let result = orchestrator.process(&reference, style).await;
    spinner.finish_and_clear();
    let result = result?;

    if !result.transcript.is_recognized() {
        Output::warning(&format!("Transcription failed: {}", result.transcript));
    }
    if !result.summary.is_generated() {
        Output::warning(&format!("Summarization failed: {}", result.summary));
    }

    let report = render_report(&result, report_format)?;

    match output {
        Some(path) if path != "-" => {
            std::fs::write(&path, &report)?;
            Output::success(&format!("Saved {} report to {}", format, path));
        }
        _ => {
            println!("{}", report);
        }
    }

    if interactive {
        let stdin = io::stdin();
        ask_quiz(&result.quiz, &mut stdin.lock())?;
    }

    Ok(())
}

/// Present the quiz and check one answer read from `input`.
fn ask_quiz(quiz: &QuizOutcome, input: &mut impl BufRead) -> Result<AnswerCheck> {
    Output::header("Quiz");
    println!("{}", quiz.question());

    if quiz.item().is_none() {
        return Ok(AnswerCheck::NotApplicable);
    }

    for option in quiz.options() {
        Output::option(option);
    }

    print!("\nYour answer [A-D]: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    let check = quiz.check_answer(&answer);
    match check {
        AnswerCheck::Correct => Output::success(&check.to_string()),
        _ => Output::error(&check.to_string()),
    }
    Ok(check)
}
