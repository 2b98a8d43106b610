//! Configuration and CLI handling

pub mod analysis;
pub mod cli;
pub mod settings;

pub use analysis::AnalysisConfig;
pub use cli::Cli;
pub use settings::Settings;
