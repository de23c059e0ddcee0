use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "file_analyzer")]
#[command(about = "Analyze .txt files in parallel and archive them into a zip")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze every .txt file in a directory and archive them
    Analyze {
        /// Input directory (overrides the config file)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory for the archive (overrides the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Keep the source files after archiving
        #[arg(long)]
        keep_sources: bool,
    },

    /// Analyze an explicit list of files
    Run {
        /// Files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory whose .txt files are archived
        #[arg(short, long)]
        input: PathBuf,

        /// Output archive path
        #[arg(short, long)]
        archive: PathBuf,

        /// Keep the source files after archiving
        #[arg(long)]
        keep_sources: bool,
    },

    /// Validate and extract a zip archive
    Extract {
        /// Archive to extract
        archive: PathBuf,

        /// Destination directory
        #[arg(short, long)]
        dest: PathBuf,
    },

    /// Check whether a file is a readable zip archive
    Validate {
        /// Archive to check
        archive: PathBuf,
    },

    /// Show the effective directory configuration
    Config {
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
