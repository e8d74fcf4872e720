//! `fleetdeck` - CLI for fleet fault analytics
//!
//! This binary summarizes fleet fault events and packages selected events
//! into compliance evidence bundles.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;

use fleetdeck::cli::{
    Cli, Command, CompareCommand, ConfigCommand, DailyCommand, InspectCommand, PackageCommand,
    SummaryCommand,
};
use fleetdeck::{init_logging, ChartImage, ChartOutcome, Config, EvidenceArchive, Session};

/// Creator recorded when neither the command line nor the config names one.
const FALLBACK_USER: &str = "analyst";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config =
        Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    if let Some(dataset) = cli.dataset {
        config.dataset.path = Some(dataset);
    }

    // Execute the command
    match cli.command {
        Command::Summary(cmd) => handle_summary(config, &cmd),
        Command::Daily(cmd) => handle_daily(&config, &cmd),
        Command::Compare(cmd) => handle_compare(config, &cmd),
        Command::Package(cmd) => handle_package(&config, &cmd),
        Command::Inspect(cmd) => handle_inspect(&cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_session(config: &Config) -> Result<Session> {
    config.validate().context("invalid analysis parameters")?;
    Session::from_config(config).context("failed to load dataset")
}

fn handle_summary(mut config: Config, cmd: &SummaryCommand) -> Result<()> {
    let analysis = &mut config.analysis;
    if let Some(window) = cmd.window {
        analysis.cutoff_days = window;
    }
    if let Some(threshold) = cmd.threshold {
        analysis.priority_threshold_pct = threshold;
    }
    if let Some(target) = &cmd.target {
        analysis.target_version.clone_from(target);
    }
    if let Some(attribute) = cmd.attribute {
        analysis.attribute = attribute.into();
    }

    let session = open_session(&config)?;
    let summary = session.summary();
    let insight = session.insight();

    if cmd.json {
        let out = serde_json::json!({
            "source": session.store().source(),
            "rows": session.store().len(),
            "summary": summary,
            "insight": insight,
            "narrative": insight.narrative(),
            "priority_banner": insight.priority_banner(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let store = session.store();
    println!("Fleet Summary");
    println!("=============");
    println!();
    println!("  Source:             {}", store.source());
    println!("  Rows:               {}", store.len());
    if let (Some(first), Some(last)) = (store.earliest_date(), store.latest_date()) {
        println!("  Date range:         {first} to {last}");
    }
    println!("  Total AIDs:         {}", summary.total_aids);
    println!("  {} AIDs:         {}", insight.target, summary.target_aids);
    println!(
        "  {} recent share: {:.1}% ({} of {})",
        insight.target,
        summary.recent.percentage,
        summary.recent.target_total,
        summary.recent.window_total
    );
    println!();
    println!("{}", insight.narrative());
    if let Some(banner) = insight.priority_banner() {
        println!();
        println!("{banner}");
    }
    Ok(())
}

fn handle_daily(config: &Config, cmd: &DailyCommand) -> Result<()> {
    let session = open_session(config)?;
    let series = session.daily(cmd.sw_version.as_deref());

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    match &cmd.sw_version {
        Some(v) => println!("Daily AIDs for {v}"),
        None => println!("Daily AIDs"),
    }
    println!();
    println!("  {:<12} {:>6}", "Date", "AIDs");
    for day in &series {
        println!("  {:<12} {:>6}", day.date, day.aid_count);
    }
    Ok(())
}

fn handle_compare(mut config: Config, cmd: &CompareCommand) -> Result<()> {
    if let Some(window) = cmd.window {
        config.analysis.cutoff_days = window;
    }
    let session = open_session(&config)?;
    let split = session.before_after();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&split)?);
        return Ok(());
    }

    match split.cutoff {
        Some(cutoff) => println!("Before/after cutoff {cutoff}"),
        None => println!("No events loaded."),
    }
    println!();
    println!("  {:<10} {:>8} {:>8} {:>8}", "Version", "Before", "After", "Delta");
    for row in &split.rows {
        println!(
            "  {:<10} {:>8} {:>8} {:>+8}",
            row.version, row.before, row.after, row.delta
        );
    }
    Ok(())
}

fn handle_package(config: &Config, cmd: &PackageCommand) -> Result<()> {
    let mut session = open_session(config)?;
    let rows = session.select(&cmd.filter());

    let mut charts = Vec::with_capacity(cmd.charts.len());
    for spec in &cmd.charts {
        let bytes = fs::read(&spec.path)
            .with_context(|| format!("failed to read chart {}", spec.path.display()))?;
        charts.push(ChartImage::new(spec.label.clone(), bytes));
    }

    let user = cmd
        .user
        .clone()
        .or_else(|| config.evidence.default_user.clone())
        .unwrap_or_else(|| FALLBACK_USER.to_string());

    let bundle = session
        .package(&rows, &cmd.title, &user, &cmd.priority.to_string(), &charts)
        .context("failed to package evidence")?;

    let dir = cmd.output.clone().unwrap_or_else(|| config.output_dir());
    let path = bundle.write_to(&dir)?;

    println!("Evidence packaged: {}", bundle.id);
    println!("  File:    {}", path.display());
    println!("  Rows:    {}", bundle.metadata.rows);
    println!("  Digest:  {}", bundle.digest);
    for outcome in &bundle.charts {
        match outcome {
            ChartOutcome::Embedded { label } => println!("  Chart:   {label} (embedded)"),
            ChartOutcome::Skipped { label, reason } => {
                println!("  Chart:   {label} (skipped: {reason})");
            }
        }
    }
    println!();
    println!("Audit log");
    for entry in session.audit() {
        println!(
            "  {}  {}  {}  {} rows  {}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.evidence_id,
            entry.user,
            entry.rows,
            entry.priority,
            entry.title
        );
    }
    Ok(())
}

fn handle_inspect(cmd: &InspectCommand) -> Result<()> {
    let bytes =
        fs::read(&cmd.file).with_context(|| format!("failed to read {}", cmd.file.display()))?;
    let archive = EvidenceArchive::read(&bytes)
        .with_context(|| format!("{} is not an evidence bundle", cmd.file.display()))?;
    let digest = blake3::hash(&bytes).to_hex().to_string();

    if cmd.json {
        let out = serde_json::json!({
            "entries": archive.entries,
            "metadata": archive.metadata,
            "digest": digest,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let meta = &archive.metadata;
    println!("Evidence {}", archive.id);
    println!();
    println!("  Title:       {}", meta.title);
    println!("  Created by:  {}", meta.created_by);
    println!("  Priority:    {}", meta.priority);
    println!("  Created on:  {}", meta.created_on);
    println!("  Rows:        {}", meta.rows);
    println!("  Digest:      {digest}");
    println!();
    println!("Entries");
    for name in &archive.entries {
        println!("  {name}");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Dataset]");
                match config.dataset_path() {
                    Some(path) => println!("  Path:               {}", path.display()),
                    None => println!("  Path:               (embedded sample)"),
                }
                println!();
                println!("[Analysis]");
                println!("  Cutoff days:        {}", config.analysis.cutoff_days);
                println!(
                    "  Priority threshold: {}%",
                    config.analysis.priority_threshold_pct
                );
                println!("  Minimum rows:       {}", config.analysis.min_rows);
                println!("  Target version:     {}", config.analysis.target_version);
                println!("  Attribute:          {}", config.analysis.attribute);
                println!();
                println!("[Evidence]");
                println!("  Organization:       {}", config.evidence.organization);
                println!(
                    "  Default user:       {}",
                    config.evidence.default_user.as_deref().unwrap_or(FALLBACK_USER)
                );
                println!("  Output dir:         {}", config.output_dir().display());
                println!("  Excerpt rows:       {}", config.evidence.excerpt_rows);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
