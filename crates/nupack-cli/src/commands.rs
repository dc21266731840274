//! Command-line definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// nupack - resolve and install packages from NuGet-style feeds.
#[derive(Debug, Parser)]
#[command(name = "nupack", version, about)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands. This enum is the operation tag: each variant
/// carries exactly the options that operation understands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a package and its dependencies.
    Install(InstallArgs),
    /// Search the enabled sources.
    Search(SearchArgs),
    /// List installed packages.
    List(ListArgs),
    /// Manage package sources.
    #[command(subcommand)]
    Source(SourceCommands),
}

/// Dependency version selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DependencyBehavior {
    /// Prefer the smallest satisfying versions.
    #[default]
    Lowest,
    /// Prefer the newest satisfying versions.
    Highest,
}

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Package name.
    pub package: String,

    /// Version or range, e.g. `1.2.3`, `[1.2.3]`, `[1.0,2.0)`.
    #[arg(long)]
    pub version: Option<String>,

    /// Allow pre-release versions.
    #[arg(long)]
    pub prerelease: bool,

    /// Only use these sources (repeatable).
    #[arg(long = "source")]
    pub sources: Vec<String>,

    /// Install into a directory instead of the global store.
    #[arg(long)]
    pub destination: Option<PathBuf>,

    /// Which satisfying version dependencies get.
    #[arg(long, value_enum, default_value_t = DependencyBehavior::Lowest)]
    pub dependency_behavior: DependencyBehavior,

    /// Target framework moniker.
    #[arg(long, default_value = "any")]
    pub framework: String,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search terms.
    pub query: String,

    /// Include pre-release versions.
    #[arg(long)]
    pub prerelease: bool,

    /// Only search these sources (repeatable).
    #[arg(long = "source")]
    pub sources: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// List a directory destination instead of the global store.
    #[arg(long)]
    pub destination: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum SourceCommands {
    /// Register a package source.
    Add {
        /// Source name.
        name: String,
        /// Endpoint URL.
        location: String,
        /// Wire protocol version (2 or 3).
        #[arg(long)]
        protocol_version: Option<u32>,
        /// Trust artifacts from this source.
        #[arg(long)]
        trusted: bool,
    },
    /// Remove a package source.
    Remove {
        /// Source name.
        name: String,
    },
    /// Update a source's location or protocol version.
    Set {
        /// Source name.
        name: String,
        /// New endpoint URL.
        #[arg(long)]
        location: Option<String>,
        /// New wire protocol version (2 or 3).
        #[arg(long)]
        protocol_version: Option<u32>,
    },
    /// Enable a source.
    Enable {
        /// Source name.
        name: String,
    },
    /// Disable a source.
    Disable {
        /// Source name.
        name: String,
    },
    /// List registered sources.
    List,
}
