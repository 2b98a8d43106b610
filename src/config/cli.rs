//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// cuegrid - DJ cue point extraction and beat-grid analysis
///
/// Reads cue points that Serato, Mixed In Key, Traktor and Rekordbox embed in
/// audio file tags, and scores them against a beat grid tracked from the audio.
#[derive(Parser, Debug)]
#[command(name = "cuegrid")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only, no progress bars)
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the embedded cue points of a file as JSON
    Cues {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List every tag in a file and the DJ software it suggests
    Scan {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Full beat/tempo analysis, optionally scoring cue points
    Analyze(AnalyzeArgs),

    /// Waveform, beats and downbeats around a point in time
    Zoom {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Center of the window in seconds
        #[arg(long, value_name = "SECONDS")]
        center: f64,

        /// Window length in seconds
        #[arg(long, value_name = "SECONDS", default_value = "10")]
        duration: f64,
    },

    /// Suggest cue points at the loudest moments of a track
    Suggest {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Share of the loudest frame a peak must reach (0-1)
        #[arg(long, default_value = "0.7")]
        sensitivity: f64,
    },

    /// Extract and analyze a whole directory into cuegrid.json
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Score the file's embedded cue points
    #[arg(long, default_value = "false")]
    pub embedded: bool,

    /// Score a cue point at this position (seconds); repeatable
    #[arg(long = "cue", value_name = "SECONDS")]
    pub cues: Vec<f64>,

    /// Points in the overview waveform
    #[arg(long, value_name = "N", default_value = "2000")]
    pub waveform_points: usize,

    /// Write the JSON here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input path (file or directory)
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output directory for cuegrid.json
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Number of worker threads (defaults to CPU count - 1)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Scan subdirectories recursively
    #[arg(short, long, default_value = "false")]
    pub recursive: bool,

    /// Re-process files already present in the report
    #[arg(long, default_value = "false")]
    pub force: bool,

    /// Only extract embedded cues, skip audio analysis
    #[arg(long, default_value = "false")]
    pub no_analysis: bool,
}

impl Cli {
    /// Log filter directive from the verbosity flags
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
