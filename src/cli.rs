use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about = "Camunda 8 Run release bundler")]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Working tree holding the launcher files (default: current directory)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Camunda version to bundle
    #[arg(long, global = true)]
    pub camunda_version: Option<String>,

    /// Elasticsearch version to bundle
    #[arg(long, global = true)]
    pub elasticsearch_version: Option<String>,

    /// Sub‑commands (package, clean)
    #[command(subcommand)]
    pub sub: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Fetch all artifacts and build the release package (default)
    Package {
        /// Connector runtime version to bundle
        #[arg(long)]
        connectors_version: Option<String>,

        /// Release tag to download Camunda from (default: the Camunda version)
        #[arg(long)]
        release_tag: Option<String>,

        /// Package flavour to build
        #[arg(long, value_enum, default_value_t = Target::Auto)]
        target: Target,
    },
    /// Remove extracted distributions and log files from the working tree
    Clean,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Match the running platform
    Auto,
    Windows,
    Unix,
}
