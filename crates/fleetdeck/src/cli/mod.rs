//! Command-line interface for fleetdeck.
//!
//! This module provides the CLI structure for the `fleetdeck` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AttributeArg, ChartSpec, CompareCommand, ConfigCommand, DailyCommand, InspectCommand,
    PackageCommand, PriorityArg, SummaryCommand,
};

/// fleetdeck - Fleet fault analytics and compliance evidence bundling
///
/// Summarizes aircraft fault events by software version, raises a priority
/// signal on correlated spikes, and packages selected events into sealed
/// evidence bundles.
#[derive(Debug, Parser)]
#[command(name = "fleetdeck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fleet events CSV (overrides config; embedded sample when unset)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub dataset: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show fleet KPIs, the insight narrative and the priority signal
    Summary(SummaryCommand),

    /// Show daily AID totals
    Daily(DailyCommand),

    /// Compare per-version totals before and after the cutoff
    Compare(CompareCommand),

    /// Package selected events into an evidence bundle
    Package(PackageCommand),

    /// Open an evidence bundle and show its contents
    Inspect(InspectCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
