use crate::compare::ReportComparison;
use crate::config::{ScoreWeights, load_config};
use crate::history::QualityHistory;
use crate::ir::{DiagramSnapshot, ViewportSize};
use crate::quality::{QualityEvaluator, QualityReport};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sruja-quality",
    version,
    about = "Score the layout quality of a positioned diagram snapshot"
)]
pub struct Args {
    /// Snapshot JSON file ({nodes, edges, viewport}) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Weight preset (balanced, structural, aesthetic); overrides the config file
    #[arg(short = 'w', long = "weights")]
    pub weights: Option<String>,

    /// Viewport as WIDTHxHEIGHT; overrides the snapshot's viewport
    #[arg(long = "viewport", value_parser = parse_viewport)]
    pub viewport: Option<ViewportSize>,

    /// Append the report to this history file and print the trend
    #[arg(long = "history")]
    pub history: Option<PathBuf>,

    /// Label for the history entry (default "run")
    #[arg(long = "label", requires = "history")]
    pub label: Option<String>,

    /// Exit with an error when the weighted score is below this value
    #[arg(long = "min-score")]
    pub min_score: Option<f64>,

    /// Verbose logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(name) = &args.weights {
        config.quality.weights = ScoreWeights::from_preset(name)
            .with_context(|| format!("unknown weight preset '{name}'"))?;
    }
    let evaluator = QualityEvaluator::try_new(config.quality)?;

    let input = read_input(args.input.as_deref())?;
    let mut snapshot = DiagramSnapshot::from_json(&input).context("Failed to parse snapshot")?;
    if let Some(viewport) = args.viewport {
        snapshot.viewport = viewport;
    }

    let report = evaluator.evaluate_snapshot(&snapshot);
    info!(score = report.weighted_score, grade = %report.grade, "evaluated snapshot");

    let trend = match &args.history {
        Some(path) => record_history(path, args.label.as_deref().unwrap_or("run"), &report)?,
        None => None,
    };

    let rendered = match args.format {
        OutputFormat::Json => report.to_json()?,
        OutputFormat::Text => render_text(&report, trend.as_ref()),
    };
    write_output(&rendered, args.output.as_deref())?;

    if let Some(min) = args.min_score
        && report.weighted_score < min
    {
        anyhow::bail!(
            "weighted score {:.2} is below the minimum {:.2}",
            report.weighted_score,
            min
        );
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn record_history(
    path: &Path,
    label: &str,
    report: &QualityReport,
) -> Result<Option<ReportComparison>> {
    let mut history = QualityHistory::load(path)?;
    history.record(label, report.clone());
    history.save(path)?;
    let trend = history.trend();
    if let Some(trend) = &trend {
        info!(delta = trend.delta, "score trend against previous run");
    }
    Ok(trend)
}

fn render_text(report: &QualityReport, trend: Option<&ReportComparison>) -> String {
    let mut lines = report.summary_lines();
    if let Some(trend) = trend {
        lines.push(format!(
            "trend: {:+.2} ({} -> {})",
            trend.delta, trend.previous_grade, trend.current_grade
        ));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

fn parse_viewport(value: &str) -> std::result::Result<ViewportSize, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("invalid viewport dimension '{part}'"))
    };
    Ok(ViewportSize::new(parse(w)?, parse(h)?))
}
