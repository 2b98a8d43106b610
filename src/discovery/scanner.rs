//! Audio file discovery and track IDs

use crate::error::{CuegridError, Result};
use crate::types::AudioFormat;
use hash32::FnvHasher;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// An audio file found on disk
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub format: AudioFormat,
    pub size_bytes: u64,
}

/// Find supported audio files under `input` (a file or a directory)
///
/// Results are sorted by path so batch reports are stable between runs.
/// AppleDouble sidecars (`._name.mp3`) are ignored.
pub fn scan(input: &Path, recursive: bool) -> Result<Vec<DiscoveredFile>> {
    if !input.exists() {
        return Err(CuegridError::FileNotFound(input.to_path_buf()));
    }

    if input.is_file() {
        return match discover_file(input) {
            Some(file) => Ok(vec![file]),
            None => Err(CuegridError::UnsupportedFormat {
                path: input.to_path_buf(),
                format: input
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            }),
        };
    }

    let walker = WalkDir::new(input).max_depth(if recursive { usize::MAX } else { 1 });
    let mut files: Vec<DiscoveredFile> = walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| discover_file(entry.path()))
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    info!("Discovered {} audio files", files.len());
    if files.is_empty() {
        warn!("No supported audio files found in {}", input.display());
    }
    Ok(files)
}

fn discover_file(path: &Path) -> Option<DiscoveredFile> {
    let name = path.file_name()?.to_str()?;
    if name.starts_with("._") {
        return None;
    }
    let format = AudioFormat::from_extension(path.extension()?.to_str()?)?;
    let size_bytes = std::fs::metadata(path).ok()?.len();

    debug!("Discovered: {}", path.display());
    Some(DiscoveredFile {
        path: path.to_path_buf(),
        format,
        size_bytes,
    })
}

/// Deterministic, positive track ID from a file path (FNV-1a)
///
/// Separators and case are normalised first, so the same library mounted on
/// Windows and macOS yields the same IDs.
pub fn generate_track_id(path: &Path) -> i32 {
    use hash32::Hasher as _;
    use std::hash::Hasher as _;

    let normalized = path.to_string_lossy().replace('\\', "/").to_lowercase();
    let mut hasher = FnvHasher::default();
    hasher.write(normalized.as_bytes());
    (hasher.finish32() & 0x7FFF_FFFF) as i32
}
