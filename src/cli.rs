use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mvnscm",
    about = "Maven SCM checkout - materialize module sources from version control by artifact coordinates",
    version,
    author
)]
pub struct Cli {
    /// Path to the invoking project directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check out (or export) a source tree from its SCM
    Checkout(CheckoutArgs),

    /// Resolve artifact coordinates and print the SCM connection info without checking out
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// SCM connection URL (scm:<provider>:<url>); bypasses coordinate resolution
    #[arg(long, value_name = "URL", conflicts_with = "artifact_coords")]
    pub connection_url: Option<String>,

    /// Artifact to check out: groupId:artifactId[:version[:type[:classifier]]]
    #[arg(long, value_name = "COORDS")]
    pub artifact_coords: Option<String>,

    /// Export instead of checkout (no SCM metadata retained)
    #[arg(long)]
    pub use_export: bool,

    /// Destination directory for the checked-out sources
    #[arg(long, value_name = "DIR")]
    pub checkout_directory: Option<PathBuf>,

    /// Skip the checkout entirely if the destination directory already exists
    #[arg(long)]
    pub skip_checkout_if_exists: bool,

    /// The kind of SCM version to check out: branch, tag or revision
    #[arg(long, value_name = "TYPE", requires = "scm_version")]
    pub scm_version_type: Option<String>,

    /// The SCM version value (branch name, tag name or revision number)
    #[arg(long, value_name = "VERSION", requires = "scm_version_type")]
    pub scm_version: Option<String>,

    /// Downgrade the dependency to a development snapshot and rewrite both POMs
    #[arg(long, requires = "artifact_coords")]
    pub as_snapshot: bool,

    /// Aggregator POM to register the checked-out module in (snapshot workflow only)
    #[arg(long, value_name = "POM", requires = "as_snapshot")]
    pub register_module: Option<PathBuf>,

    /// Comma-separated glob patterns of files to keep after checkout
    #[arg(long, value_name = "PATTERNS")]
    pub includes: Option<String>,

    /// Comma-separated glob patterns of files to remove after checkout
    #[arg(long, value_name = "PATTERNS")]
    pub excludes: Option<String>,

    /// Remote repository URL to resolve artifacts from (repeatable)
    #[arg(long, value_name = "URL")]
    pub repository: Vec<String>,

    /// Local directory to cache downloaded descriptors in
    #[arg(long, value_name = "DIR")]
    pub local_repository: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Artifact to resolve: groupId:artifactId[:version[:type[:classifier]]]
    #[arg(value_name = "COORDS")]
    pub artifact_coords: String,

    /// Remote repository URL to resolve artifacts from (repeatable)
    #[arg(long, value_name = "URL")]
    pub repository: Vec<String>,

    /// Local directory to cache downloaded descriptors in
    #[arg(long, value_name = "DIR")]
    pub local_repository: Option<PathBuf>,
}
