//! Init command: first-run setup for the extraction tools, the summarizer backend,
//! the scratch root and the config file.

use crate::cli::preflight::check_tool;
use crate::cli::Output;
use crate::config::{Settings, SummarizerProvider};
use anyhow::Result;
use console::style;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// An external tool the pipeline shells out to.
struct Tool {
    name: &'static str,
    /// What stops working without it.
    needed_for: &'static str,
    required: bool,
}

const TOOLS: [Tool; 2] = [
    Tool {
        name: "ffmpeg",
        needed_for: "audio extraction from every input",
        required: true,
    },
    Tool {
        name: "yt-dlp",
        needed_for: "http(s) video URLs",
        required: false,
    },
];

/// Run the init command, writing to `config_path` or the default location.
pub fn run_init(settings: &Settings, config_path: Option<&str>) -> Result<()> {
    let config_path = config_path
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);

    Output::header("Vidquiz Setup");
    println!();

    println!("{}", style("Extraction tools").bold().cyan());
    let missing_required = report_tools();
    println!();
    if missing_required && !prompt_yes_no("ffmpeg is missing. Continue anyway?", false)? {
        Output::info("Setup cancelled. Install ffmpeg and run 'vidquiz init' again.");
        return Ok(());
    }

    println!("{}", style("Summarizer").bold().cyan());
    let provider = choose_provider(settings.summarization.provider)?;
    report_api_key(provider);
    println!();

    println!("{}", style("Scratch directory").bold().cyan());
    prepare_scratch_root(&settings.temp_dir())?;
    println!();

    println!("{}", style("Configuration file").bold().cyan());
    let updated = apply_provider(settings, provider)?;
    let changed = updated.summarization.provider != settings.summarization.provider;
    let write = !config_path.exists()
        || (changed
            && prompt_yes_no(
                &format!("Update summarization.provider in {}?", config_path.display()),
                true,
            )?);
    if write {
        updated.save_to(&config_path)?;
        Output::success(&format!("Wrote {}", config_path.display()));
    } else {
        Output::info(&format!("Keeping {}", config_path.display()));
    }
    println!();

    println!("{}", style("Ready").bold().green());
    println!("  {} Quiz yourself on a video", style("vidquiz process <file-or-url> -i").cyan());
    println!("  {} Serve the pipeline over HTTP", style("vidquiz serve").cyan());
    println!("  {} Re-check the setup later", style("vidquiz doctor").cyan());

    Ok(())
}

/// Print tool status. Returns true when a required tool is missing.
fn report_tools() -> bool {
    let mut missing_required = false;
    for tool in &TOOLS {
        if check_tool(tool.name).is_ok() {
            Output::success(tool.name);
            continue;
        }
        missing_required |= tool.required;
        let line = format!("{} not found, needed for {}", tool.name, tool.needed_for);
        if tool.required {
            Output::error(&line);
        } else {
            Output::warning(&line);
        }
        println!("    {} {}", style("→").dim(), style(install_hint(tool.name)).dim());
    }
    missing_required
}

/// Ask for the summarizer backend. Only builds with the local model get a choice.
fn choose_provider(current: SummarizerProvider) -> Result<SummarizerProvider> {
    if !cfg!(feature = "local-summarizer") {
        Output::kv("Backend", "openai (rebuild with --features local-summarizer for t5)");
        return Ok(SummarizerProvider::OpenAI);
    }

    let answer = prompt_line(&format!("Summarizer backend [openai/t5] ({})", current))?;
    let provider = parse_provider(&answer, current);
    Output::kv("Backend", &provider.to_string());
    Ok(provider)
}

fn report_api_key(provider: SummarizerProvider) {
    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        Output::success("OPENAI_API_KEY is set");
        return;
    }
    let needed_for = match provider {
        SummarizerProvider::OpenAI => "transcription and summaries",
        SummarizerProvider::T5 => "transcription",
    };
    Output::warning(&format!("OPENAI_API_KEY is not set; it is needed for {}", needed_for));
    println!("    {} {}", style("→").dim(), style("export OPENAI_API_KEY='sk-...'").green());
}

/// Create the scratch root and offer to clear runs left behind by killed processes.
fn prepare_scratch_root(root: &Path) -> Result<()> {
    if !root.exists() {
        std::fs::create_dir_all(root)?;
        Output::success(&format!("Created {}", root.display()));
        return Ok(());
    }

    let leftovers = leftover_runs(root)?;
    if leftovers.is_empty() {
        Output::success(&format!("{} is clean", root.display()));
        return Ok(());
    }

    let question = format!(
        "{} holds {} run(s) from interrupted processes. Remove them?",
        root.display(),
        leftovers.len()
    );
    if prompt_yes_no(&question, true)? {
        let removed = remove_runs(&leftovers)?;
        Output::success(&format!("Removed {} leftover run(s)", removed));
    }
    Ok(())
}

/// Per-run scratch directories under `root`. Other entries are not ours.
fn leftover_runs(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut runs = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let is_run = entry.file_name().to_string_lossy().starts_with("run-");
        if is_run && entry.file_type()?.is_dir() {
            runs.push(entry.path());
        }
    }
    runs.sort();
    Ok(runs)
}

fn remove_runs(runs: &[PathBuf]) -> io::Result<usize> {
    for run in runs {
        std::fs::remove_dir_all(run)?;
    }
    Ok(runs.len())
}

fn apply_provider(settings: &Settings, provider: SummarizerProvider) -> Result<Settings> {
    Ok(settings.with_value("summarization.provider", &provider.to_string())?)
}

/// Blank input keeps `current`; unknown input does too.
fn parse_provider(answer: &str, current: SummarizerProvider) -> SummarizerProvider {
    let answer = answer.trim();
    if answer.is_empty() {
        return current;
    }
    answer.parse().unwrap_or_else(|e: String| {
        Output::warning(&format!("{}; keeping {}", e, current));
        current
    })
}

fn parse_yes_no(answer: &str, default: bool) -> bool {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}

fn install_hint(tool: &str) -> &'static str {
    match (tool, cfg!(target_os = "macos")) {
        ("ffmpeg", true) => "brew install ffmpeg",
        ("ffmpeg", false) => "sudo apt install ffmpeg (or https://ffmpeg.org/download.html)",
        ("yt-dlp", true) => "brew install yt-dlp",
        ("yt-dlp", false) => "pip install yt-dlp",
        _ => "see the tool's documentation",
    }
}

fn prompt_yes_no(message: &str, default: bool) -> io::Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let answer = prompt_line(&format!("{} {}", message, style(hint).dim()))?;
    Ok(parse_yes_no(&answer, default))
}

fn prompt_line(message: &str) -> io::Result<String> {
    print!("{} {} ", style("?").cyan(), message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_no_defaults() {
        assert!(parse_yes_no("Y\n", false));
        assert!(!parse_yes_no("no", true));
        assert!(parse_yes_no("\n", true));
        assert!(!parse_yes_no("maybe", false));
    }

    #[test]
    fn test_provider_answer() {
        let current = SummarizerProvider::OpenAI;
        assert_eq!(parse_provider("  \n", current), current);
        assert_eq!(parse_provider("t5\n", current), SummarizerProvider::T5);
        assert_eq!(parse_provider("local", current), SummarizerProvider::T5);
        assert_eq!(parse_provider("bart", current), current);
    }

    #[test]
    fn test_apply_provider_keeps_other_settings() {
        let mut settings = Settings::default();
        settings.server.port = 8080;
        let updated = apply_provider(&settings, SummarizerProvider::T5).unwrap();
        assert_eq!(updated.summarization.provider, SummarizerProvider::T5);
        assert_eq!(updated.server.port, 8080);
    }

    #[test]
    fn test_only_run_dirs_are_leftovers() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("run-b/nested")).unwrap();
        std::fs::create_dir(root.path().join("run-a")).unwrap();
        std::fs::create_dir(root.path().join("models")).unwrap();
        std::fs::write(root.path().join("run-note.txt"), b"keep").unwrap();

        let runs = leftover_runs(root.path()).unwrap();
        assert_eq!(runs, vec![root.path().join("run-a"), root.path().join("run-b")]);

        assert_eq!(remove_runs(&runs).unwrap(), 2);
        assert!(leftover_runs(root.path()).unwrap().is_empty());
        assert!(root.path().join("models").exists());
        assert!(root.path().join("run-note.txt").exists());
    }

    #[test]
    fn test_install_hints_name_the_tool() {
        for tool in &TOOLS {
            assert!(install_hint(tool.name).contains(tool.name));
        }
        assert!(install_hint("sox").contains("documentation"));
    }
}
