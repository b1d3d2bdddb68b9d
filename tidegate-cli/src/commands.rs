//! CLI command implementations

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Subcommand;
use tidegate_core::{
    ConversionOutcome, ConvertOptions, MediaConverter, Result, TidegateConfig, TranscodeError,
};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the media server
    Serve {
        /// Host to bind to (overrides environment)
        #[arg(long)]
        host: Option<IpAddr>,
        /// Port to bind to (overrides environment)
        #[arg(short, long)]
        port: Option<u16>,
        /// Library root directory (overrides environment)
        #[arg(long)]
        library: Option<PathBuf>,
    },
    /// Convert media files to MP4 for serving
    Convert {
        /// File or directory to convert
        path: PathBuf,
        /// Directory converted files are moved into
        #[arg(short, long, default_value = "converted")]
        output: PathBuf,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            library,
        } => serve(host, port, library).await,
        Commands::Convert { path, output } => convert(path, output).await,
    }
}

/// Load configuration and run the server until interrupted.
///
/// # Errors
/// - `TidegateError::Config` - `API_KEY` is unset or an override is invalid
/// - `TidegateError::Io` - the listener failed to bind or serve
async fn serve(
    host: Option<IpAddr>,
    port: Option<u16>,
    library: Option<PathBuf>,
) -> Result<()> {
    let mut config = TidegateConfig::from_env()?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(library) = library {
        config.library.root = library;
    }

    tidegate_web::run_server(config).await?;
    Ok(())
}

/// Run the offline batch conversion job.
///
/// # Errors
/// - `TidegateError::Transcode` - ffmpeg is unavailable or an encode failed
async fn convert(path: PathBuf, output: PathBuf) -> Result<()> {
    let ffmpeg_binary = TidegateConfig::from_env()
        .map(|c| c.conversion.ffmpeg_binary)
        .unwrap_or_else(|_| "ffmpeg".to_string());

    let converter = MediaConverter::new(ConvertOptions {
        ffmpeg_binary,
        output_dir: output,
    });

    if !converter.is_available() {
        return Err(TranscodeError::Ffmpeg {
            reason: "ffmpeg is not available on this system".to_string(),
        }
        .into());
    }

    if path.is_dir() {
        let results = converter.convert_directory(&path).await?;
        report_batch(&results);
    } else {
        let outcome = converter.convert_file(&path).await?;
        report_outcome(&path, &outcome);
    }

    Ok(())
}

fn report_batch(results: &[(PathBuf, std::result::Result<ConversionOutcome, TranscodeError>)]) {
    let mut converted = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for (path, result) in results {
        match result {
            Ok(outcome @ ConversionOutcome::Converted { .. }) => {
                converted += 1;
                report_outcome(path, outcome);
            }
            Ok(_) => skipped += 1,
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e}", path.display());
            }
        }
    }

    println!("Converted {converted}, skipped {skipped}, failed {failed}");
}

fn report_outcome(path: &std::path::Path, outcome: &ConversionOutcome) {
    match outcome {
        ConversionOutcome::Converted {
            output,
            output_size,
            elapsed_secs,
        } => {
            println!(
                "{} -> {} ({output_size} bytes, {elapsed_secs:.1}s)",
                path.display(),
                output.display()
            );
        }
        ConversionOutcome::SkippedUnsupported => {
            println!("{}: skipped (not a convertible format)", path.display());
        }
        ConversionOutcome::SkippedAlreadyConverted => {
            println!("{}: skipped (already converted)", path.display());
        }
    }
}
