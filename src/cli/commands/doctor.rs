//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{Prompts, Settings};
use console::style;
use std::process::Command;

/// Outcome of a single diagnostic.
#[derive(Debug, PartialEq)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[derive(Debug)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    message: String,
    hint: Option<String>,
}

impl CheckResult {
    fn ok(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.into(),
            hint: None,
        }
    }

    fn warning(name: &str, message: impl Into<String>, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.into(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: impl Into<String>, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.into(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Tubechat Doctor");
    println!();

    let sections = [
        ("External Tools", vec![check_ytdlp(&settings.source.ytdlp_path)]),
        ("API Configuration", vec![check_openai_api_key()]),
        ("Configuration", vec![check_config_file(), check_settings(settings), check_prompts(settings)]),
    ];

    let mut errors = 0;
    let mut warnings = 0;
    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        println!();
    }

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Tubechat.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Tubechat is ready to use.");
    }

    Ok(())
}

fn check_ytdlp(path: &str) -> CheckResult {
    match Command::new(path).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            CheckResult::ok("yt-dlp", if version.is_empty() { "installed".to_string() } else { version })
        }
        Ok(_) => CheckResult::error("yt-dlp", "installed but not working", install_hint_ytdlp()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::warning(
            "yt-dlp",
            format!("{} not found (only local transcript files will work)", path),
            install_hint_ytdlp(),
        ),
        Err(e) => CheckResult::error("yt-dlp", format!("error: {}", e), install_hint_ytdlp()),
    }
}

fn check_openai_api_key() -> CheckResult {
    check_api_key_value(std::env::var("OPENAI_API_KEY").ok().as_deref())
}

fn check_api_key_value(key: Option<&str>) -> CheckResult {
    const HINT: &str = "Set with: export OPENAI_API_KEY='sk-...'";
    match key.map(str::trim) {
        Some(key) if key.starts_with("sk-") && key.chars().count() > 20 => {
            let chars: Vec<char> = key.chars().collect();
            let prefix: String = chars[..7].iter().collect();
            let suffix: String = chars[chars.len() - 4..].iter().collect();
            let masked = format!("{}...{}", prefix, suffix);
            CheckResult::ok("OPENAI_API_KEY", format!("configured ({})", masked))
        }
        Some("") => CheckResult::error("OPENAI_API_KEY", "empty", HINT),
        Some(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error("OPENAI_API_KEY", "not set", HINT),
    }
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", config_path.display().to_string())
    } else {
        CheckResult::warning("Config file", "using defaults", "Create with: tubechat config init")
    }
}

fn check_settings(settings: &Settings) -> CheckResult {
    match settings.validate() {
        Ok(()) => CheckResult::ok(
            "Settings",
            format!(
                "{} chars per chunk, {} overlap, top {} chunks, {} turns of history",
                settings.chunking.max_chunk_chars,
                settings.chunking.overlap_chars,
                settings.retrieval.top_k,
                settings.retrieval.history_window
            ),
        ),
        Err(e) => CheckResult::error("Settings", e.to_string(), "Fix the value in your config file"),
    }
}

fn check_prompts(settings: &Settings) -> CheckResult {
    let Some(dir) = settings.prompts.custom_dir.as_deref() else {
        return CheckResult::ok("Prompts", "built-in");
    };

    match Prompts::load(Some(dir), Some(&settings.prompts.variables)) {
        Ok(prompts) if prompts.rag.user.contains("{{question}}") => {
            CheckResult::ok("Prompts", format!("custom ({})", dir))
        }
        Ok(_) => CheckResult::warning(
            "Prompts",
            "custom user prompt has no {{question}} placeholder",
            "Add {{question}} and {{context}} to rag.toml",
        ),
        Err(e) => CheckResult::error("Prompts", e.to_string(), "Check rag.toml in the custom prompts directory"),
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}
