//! Runtime configuration settings

use super::cli::BatchArgs;
use super::AnalysisConfig;
use std::path::PathBuf;

/// Runtime settings for the batch pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Input path (file or directory)
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Number of worker threads
    pub threads: usize,
    /// Scan recursively
    pub recursive: bool,
    /// Re-process files already in the report
    pub force: bool,
    /// Run audio analysis after cue extraction
    pub analyze: bool,
    /// Show progress bars
    pub show_progress: bool,
    /// Analyzer constants
    pub analysis: AnalysisConfig,
}

impl Settings {
    /// Create settings from the `batch` arguments
    pub fn from_cli(args: &BatchArgs, quiet: bool) -> Self {
        let default_threads = num_cpus::get().saturating_sub(1).max(1);

        Self {
            input: args.input.clone(),
            output: args.output.clone(),
            threads: args.threads.unwrap_or(default_threads).max(1),
            recursive: args.recursive,
            force: args.force,
            analyze: !args.no_analysis,
            show_progress: !quiet,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: PathBuf::from("./output"),
            threads: num_cpus::get().saturating_sub(1).max(1),
            recursive: false,
            force: false,
            analyze: true,
            show_progress: true,
            analysis: AnalysisConfig::default(),
        }
    }
}
