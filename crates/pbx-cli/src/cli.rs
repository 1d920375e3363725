use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pbx",
    about = "Format and inspect Xcode project.pbxproj files",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log parse and serialize progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with codec options
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rewrite a project file in canonical form
    Fmt(FmtArgs),
    /// Parse a project file and report dangling references
    Check(CheckArgs),
    /// List the objects of a project file
    List(ListArgs),
    /// Show the project's targets
    Targets(TargetsArgs),
}

#[derive(Args)]
pub struct FmtArgs {
    /// A project.pbxproj file or the .xcodeproj directory holding it
    pub path: PathBuf,
    /// Exit with an error and print a diff if the file is not canonical
    #[arg(long, conflicts_with = "in_place")]
    pub check: bool,
    /// Overwrite the file instead of printing to stdout
    #[arg(short, long)]
    pub in_place: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct ListArgs {
    pub path: PathBuf,
    /// Only objects with this isa, e.g. PBXFileReference
    #[arg(long)]
    pub isa: Option<String>,
}

#[derive(Args)]
pub struct TargetsArgs {
    pub path: PathBuf,
}
