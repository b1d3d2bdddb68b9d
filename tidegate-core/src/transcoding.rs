//! Offline batch conversion of library files to MP4.
//!
//! Runs separately from request serving: the server only ever streams the
//! bytes that exist on disk, and this job rewrites `.mov`/`.avi`/`.mkv`
//! sources into `.mp4` by shelling out to ffmpeg. Output is written to a
//! temporary file and renamed into place only on success, so the library
//! never contains half-encoded files under a served name.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

/// Source container formats the converter accepts.
const CONVERTIBLE_EXTENSIONS: [&str; 3] = ["mov", "avi", "mkv"];

/// Suffix for in-progress encodes.
const TEMP_SUFFIX: &str = ".tmp";

/// Conversion job configuration.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Name or path of the ffmpeg binary
    pub ffmpeg_binary: String,
    /// Directory converted files are moved into
    pub output_dir: PathBuf,
}

/// Per-file result of a conversion attempt.
#[derive(Debug)]
pub enum ConversionOutcome {
    /// File was encoded and moved into the output directory.
    Converted {
        output: PathBuf,
        output_size: u64,
        elapsed_secs: f64,
    },
    /// Extension is not a convertible source format.
    SkippedUnsupported,
    /// An output with this name already exists.
    SkippedAlreadyConverted,
}

/// Errors from batch conversion.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("input not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("ffmpeg failed: {reason}")]
    Ffmpeg { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Batch converter for library media files.
pub struct MediaConverter {
    options: ConvertOptions,
}

impl MediaConverter {
    /// Creates a converter with the given options.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Checks that the configured ffmpeg binary runs at all.
    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.options.ffmpeg_binary)
            .arg("-version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Converts a single file, skipping non-convertible and already-converted
    /// inputs.
    ///
    /// # Errors
    ///
    /// - `TranscodeError::InputNotFound` - input path does not exist
    /// - `TranscodeError::Ffmpeg` - the encode process failed
    /// - `TranscodeError::Io` - temp-file or rename operations failed
    pub async fn convert_file(&self, input: &Path) -> Result<ConversionOutcome, TranscodeError> {
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(TranscodeError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        let extension = input
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());
        if !matches!(extension.as_deref(), Some(ext) if CONVERTIBLE_EXTENSIONS.contains(&ext)) {
            info!("skipping {}: not a convertible format", input.display());
            return Ok(ConversionOutcome::SkippedUnsupported);
        }

        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("converted");
        let final_output = self.options.output_dir.join(format!("{stem}.mp4"));

        if tokio::fs::try_exists(&final_output).await.unwrap_or(false) {
            info!(
                "skipping {}: {} already exists",
                input.display(),
                final_output.display()
            );
            return Ok(ConversionOutcome::SkippedAlreadyConverted);
        }

        tokio::fs::create_dir_all(&self.options.output_dir).await?;

        // Encode into a temp name in the output directory; rename is atomic
        // within one filesystem.
        let temp_output = self
            .options
            .output_dir
            .join(format!("{stem}.mp4{TEMP_SUFFIX}"));

        info!("converting {} -> {}", input.display(), final_output.display());
        let started = Instant::now();

        let output = tokio::process::Command::new(&self.options.ffmpeg_binary)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-c:v")
            .arg("libx264")
            .arg("-c:a")
            .arg("aac")
            .arg("-c:s")
            .arg("mov_text")
            .arg("-f")
            .arg("mp4")
            .arg(&temp_output)
            .output()
            .await
            .map_err(|e| TranscodeError::Ffmpeg {
                reason: format!("failed to launch {}: {e}", self.options.ffmpeg_binary),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let _ = tokio::fs::remove_file(&temp_output).await;
            return Err(TranscodeError::Ffmpeg {
                reason: stderr.lines().last().unwrap_or("unknown failure").to_string(),
            });
        }

        tokio::fs::rename(&temp_output, &final_output).await?;
        let output_size = tokio::fs::metadata(&final_output).await?.len();
        let elapsed_secs = started.elapsed().as_secs_f64();

        info!(
            "converted {} ({} bytes, {:.1}s)",
            final_output.display(),
            output_size,
            elapsed_secs
        );

        Ok(ConversionOutcome::Converted {
            output: final_output,
            output_size,
            elapsed_secs,
        })
    }

    /// Converts every candidate file directly inside `dir`.
    ///
    /// Individual failures are reported per file and do not abort the batch.
    ///
    /// # Errors
    ///
    /// - `TranscodeError::Io` - the directory itself could not be read
    pub async fn convert_directory(
        &self,
        dir: &Path,
    ) -> Result<Vec<(PathBuf, Result<ConversionOutcome, TranscodeError>)>, TranscodeError> {
        let mut results = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let result = self.convert_file(&path).await;
            if let Err(e) = &result {
                warn!("conversion of {} failed: {e}", path.display());
            }
            results.push((path, result));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn converter(output_dir: PathBuf) -> MediaConverter {
        MediaConverter::new(ConvertOptions {
            ffmpeg_binary: "ffmpeg".to_string(),
            output_dir,
        })
    }

    #[tokio::test]
    async fn test_unsupported_extension_skipped() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("already.mp4");
        std::fs::write(&input, b"mp4 bytes").unwrap();

        let converter = converter(temp.path().join("out"));
        let outcome = converter.convert_file(&input).await.unwrap();
        assert!(matches!(outcome, ConversionOutcome::SkippedUnsupported));
    }

    #[tokio::test]
    async fn test_existing_output_skipped() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("movie.mkv");
        std::fs::write(&input, b"mkv bytes").unwrap();

        let output_dir = temp.path().join("out");
        std::fs::create_dir_all(&output_dir).unwrap();
        std::fs::write(output_dir.join("movie.mp4"), b"done").unwrap();

        let converter = converter(output_dir);
        let outcome = converter.convert_file(&input).await.unwrap();
        assert!(matches!(outcome, ConversionOutcome::SkippedAlreadyConverted));
    }

    #[tokio::test]
    async fn test_missing_input_rejected() {
        let temp = TempDir::new().unwrap();
        let converter = converter(temp.path().join("out"));

        let result = converter.convert_file(&temp.path().join("nope.mkv")).await;
        assert!(matches!(result, Err(TranscodeError::InputNotFound { .. })));
    }

    #[tokio::test]
    async fn test_directory_batch_reports_per_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"text").unwrap();
        std::fs::write(temp.path().join("clip.mp4"), b"mp4").unwrap();

        let converter = converter(temp.path().join("out"));
        let results = converter.convert_directory(temp.path()).await.unwrap();

        assert_eq!(results.len(), 2);
        for (_, result) in results {
            assert!(matches!(
                result,
                Ok(ConversionOutcome::SkippedUnsupported)
            ));
        }
    }
}
