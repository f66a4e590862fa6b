//! Content validation CLI - prints translation reports for the content tree
//!
//! Usage:
//!   content-cli validate-all            # Validate every content type
//!   content-cli validate-type <type>    # Validate one of blog, legal, pages, services, solutions
//!   content-cli missing-translations    # List items missing at least one translation
//!   content-cli stats                   # Item counts and translation coverage
//!   content-cli help
//!
//! Optional environment variables:
//! - CONTENT_ROOT (defaults to src/content)
//! - STALENESS_THRESHOLD_DAYS (defaults to 90)
//! - SECTION_COUNT_TOLERANCE (defaults to 1)

use anyhow::{Context, Result};
use statex_content::config::Config;
use statex_content::content::{collect_stats, ContentPaths, ContentStats, ContentType, FsContentAccessor};
use statex_content::i18n::Language;
use statex_content::validation::{ContentValidator, MissingTranslationReport, ValidationReport};
use std::fmt::Write;
use std::process::ExitCode;
use std::sync::Arc;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    // Warnings only, so partial scan failures show above the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("statex_content=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}Error:{} {:#}", RED, RESET, e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<()> {
    let command = args.first().map(String::as_str).unwrap_or("help");
    if matches!(command, "help" | "--help" | "-h") {
        print!("{}", help_text());
        return Ok(());
    }

    let config = Config::from_env()?;
    let paths = ContentPaths::new(&config.content_root).context("Invalid content path table")?;
    let accessor = Arc::new(FsContentAccessor::new(paths));
    let validator = ContentValidator::new(accessor.clone(), config.consistency_options());

    match command {
        "validate-all" => {
            let report = validator.validate_all_translations().await;
            print!("{}", render_validation_report(&report));
        }
        "validate-type" => {
            let name = args
                .get(1)
                .context("validate-type requires a content type (blog, legal, pages, services, solutions)")?;
            let content_type: ContentType = name.parse()?;
            let report = validator.validate_content_type(content_type).await;
            print!("{}", render_validation_report(&report));
        }
        "missing-translations" => {
            let reports = validator.generate_missing_translation_report().await;
            print!("{}", render_missing_translations(&reports));
        }
        "stats" => {
            let stats = collect_stats(accessor.as_ref()).await;
            print!("{}", render_stats(&stats));
        }
        other => {
            print!("{}", help_text());
            anyhow::bail!("Unknown command: {}", other);
        }
    }

    Ok(())
}

fn help_text() -> String {
    format!(
        "{BOLD}content-cli{RESET} - Statex content validation\n\n\
         {CYAN}Commands:{RESET}\n  \
         validate-all            Validate translations for every content type\n  \
         validate-type <type>    Validate one content type\n  \
         missing-translations    List items missing translations\n  \
         stats                   Show item counts and translation coverage\n  \
         help                    Show this message\n"
    )
}

fn render_validation_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}Translation validation{}", BOLD, RESET);
    let _ = writeln!(
        out,
        "  Total: {}  {}Valid: {}{}  {}Invalid: {}{}",
        report.total_content,
        GREEN,
        report.valid_content,
        RESET,
        RED,
        report.invalid_content,
        RESET
    );

    for warning in &report.warnings {
        let _ = writeln!(out, "  {}⚠ {}{}", YELLOW, warning, RESET);
    }

    for result in report.results.iter().filter(|r| !r.is_valid) {
        let _ = writeln!(
            out,
            "\n  {}✗ {}/{}{}",
            RED, result.content_type, result.english_slug, RESET
        );
        if !result.missing_languages.is_empty() {
            let _ = writeln!(out, "    Missing: {}", join_languages(&result.missing_languages));
        }
        for issue in &result.structural_inconsistencies {
            let _ = writeln!(out, "    {}", issue);
        }
    }

    let outdated: Vec<_> = report
        .results
        .iter()
        .filter(|r| !r.outdated_translations.is_empty())
        .collect();
    if !outdated.is_empty() {
        let _ = writeln!(out, "\n  {}Outdated translations:{}", YELLOW, RESET);
        for result in outdated {
            let _ = writeln!(
                out,
                "    {}/{}: {}",
                result.content_type,
                result.english_slug,
                join_languages(&result.outdated_translations)
            );
        }
    }

    if report.invalid_content == 0 {
        let _ = writeln!(out, "\n  {}✓ All translations complete{}", GREEN, RESET);
    }
    out
}

fn render_missing_translations(reports: &[MissingTranslationReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}Missing translations{}", BOLD, RESET);

    for report in reports {
        let color = if report.total_missing == 0 { GREEN } else { YELLOW };
        let _ = writeln!(
            out,
            "\n  {}{}{} ({} missing)",
            color, report.content_type, RESET, report.total_missing
        );
        for entry in &report.missing_translations {
            let _ = writeln!(
                out,
                "    {}: {}",
                entry.english_slug,
                join_languages(&entry.missing_languages)
            );
        }
    }
    out
}

fn render_stats(stats: &ContentStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}Content statistics{}", BOLD, RESET);
    let _ = writeln!(out, "  Total items: {}", stats.total_items);

    let _ = write!(out, "\n  {:<12}", "");
    for language in Language::ALL {
        let _ = write!(out, "{:>6}", language.code());
    }
    let _ = writeln!(out);
    for (content_type, counts) in &stats.by_content_type {
        let _ = write!(out, "  {:<12}", content_type.as_str());
        for language in Language::ALL {
            let _ = write!(out, "{:>6}", counts.get(&language).copied().unwrap_or(0));
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "\n  {}Coverage:{}", CYAN, RESET);
    for (language, pct) in &stats.coverage {
        let _ = writeln!(
            out,
            "    {} / {} ({}): {:.1}%",
            language.name(),
            language.native_name(),
            language,
            pct
        );
    }

    for error in &stats.errors {
        let _ = writeln!(out, "  {}⚠ {}{}", YELLOW, error, RESET);
    }
    out
}

fn join_languages(languages: &[Language]) -> String {
    languages
        .iter()
        .map(|l| l.code())
        .collect::<Vec<_>>()
        .join(", ")
}
