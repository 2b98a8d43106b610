//! cuegrid CLI entry point

use clap::Parser;
use cuegrid::config::cli::{AnalyzeArgs, Command};
use cuegrid::config::{AnalysisConfig, Cli, Settings};
use cuegrid::types::CuePoint;
use cuegrid::{pipeline, AudioAnalyzer, CuegridError, EmbeddedCueReader};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Command::Cues { ref file } => {
            let cues = EmbeddedCueReader::new().read_all_embedded_cues(file);
            print_json(&cues)
        }
        Command::Scan { ref file } => print_json(&EmbeddedCueReader::new().scan_file_metadata(file)),
        Command::Analyze(ref args) => run_analyze(args),
        Command::Zoom {
            ref file,
            center,
            duration,
        } => {
            let analyzer = AudioAnalyzer::default();
            analyzer
                .analyze(file, &[])
                .and_then(|analysis| print_json(&analyzer.zoom(&analysis, center, duration)))
        }
        Command::Suggest {
            ref file,
            sensitivity,
        } => AudioAnalyzer::default()
            .suggest_cue_points(file, sensitivity)
            .and_then(|times| print_json(&times)),
        Command::Batch(ref args) => {
            if let Err(e) = validate_batch_inputs(&args.input, &args.output) {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            return run_batch(&Settings::from_cli(args, cli.quiet));
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_analyze(args: &AnalyzeArgs) -> cuegrid::Result<()> {
    let config = AnalysisConfig {
        waveform_points: args.waveform_points,
        ..Default::default()
    };
    let analyzer = AudioAnalyzer::new(config);

    let mut cues: Vec<CuePoint> = if args.embedded {
        EmbeddedCueReader::new().read_all_embedded_cues(&args.file)
    } else {
        Vec::new()
    };
    cues.extend(args.cues.iter().map(|&position| CuePoint::user(position)));

    let analysis = analyzer.analyze(&args.file, &cues)?;
    match &args.output {
        Some(path) => {
            let json = to_json(&analysis)?;
            std::fs::write(path, json).map_err(|e| CuegridError::output_error(path, e))
        }
        None => print_json(&analysis),
    }
}

fn run_batch(settings: &Settings) -> ExitCode {
    match pipeline::run(settings) {
        Ok(result) => {
            println!();
            println!(
                "Summary: {} successful, {} failed, {} skipped (of {} total)",
                result.successful, result.failed, result.skipped, result.total_files
            );
            if result.failed > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> cuegrid::Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CuegridError::ConfigError(format!("Failed to serialize output: {}", e)))
}

fn print_json<T: Serialize>(value: &T) -> cuegrid::Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}

fn validate_batch_inputs(input: &Path, output: &Path) -> Result<(), String> {
    if !input.exists() {
        return Err(format!(
            "Input path does not exist: {}\n\n  Tip: Check the path is correct and accessible.\n  Examples:\n    cuegrid batch -i ~/Music/DJ -o ./report\n    cuegrid batch -i ./track.mp3 -o ./report",
            input.display()
        ));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(format!(
                "Output parent directory does not exist: {}\n\n  Tip: The output directory is created automatically,\n  but its parent must exist.\n  Example: mkdir -p {}",
                parent.display(),
                parent.display()
            ));
        }
    }

    Ok(())
}
