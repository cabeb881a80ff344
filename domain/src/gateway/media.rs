//! Wrappers around the ffmpeg and yt-dlp executables.

use crate::error::Error;
use log::*;
use service::config::Config;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mov", ".mkv", ".flv", ".wmv"];
pub const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".m4a", ".flac", ".ogg", ".aac"];

/// Lowercased extension of `file_name` including the dot, or `""` when there is none.
pub fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

pub fn is_video(file_name: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&extension(file_name).as_str())
}

pub fn is_audio(file_name: &str) -> bool {
    AUDIO_EXTENSIONS.contains(&extension(file_name).as_str())
}

async fn run(program: &str, command: &mut Command) -> Result<Output, Error> {
    let output = command.output().await.map_err(|e| {
        warn!("Failed to start {program}: {e}");
        Error {
            source: Some(Box::new(e)),
            ..Error::provider(format!("{program} could not be started"))
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
        warn!("{program} exited with {}: {stderr}", output.status);
        return Err(Error::provider(format!(
            "{program} exited with {}: {}",
            output.status,
            last_line.trim()
        )));
    }
    Ok(output)
}

/// Extracts a mono 16 kHz PCM WAV track next to `video`, returning its path.
pub async fn extract_audio(config: &Config, video: &Path) -> Result<PathBuf, Error> {
    let output_path = video.with_extension("wav");
    debug!("Extracting audio from {}", video.display());

    run(
        "ffmpeg",
        Command::new(config.ffmpeg_path())
            .arg("-i")
            .arg(video)
            .args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1", "-y"])
            .arg(&output_path),
    )
    .await?;

    Ok(output_path)
}

/// Downloads the best audio stream of a YouTube video as mp3 into `dir`.
pub async fn download_youtube_audio(
    config: &Config,
    url: &str,
    dir: &Path,
) -> Result<PathBuf, Error> {
    let template = dir.join("youtube_audio.%(ext)s");
    info!("Downloading YouTube audio from {url}");

    run(
        "yt-dlp",
        Command::new(config.yt_dlp_path())
            .args(["-f", "bestaudio/best", "-x", "--audio-format", "mp3", "--no-playlist", "-o"])
            .arg(&template)
            .arg(url),
    )
    .await?;

    let expected = dir.join("youtube_audio.mp3");
    if tokio::fs::try_exists(&expected).await.unwrap_or(false) {
        Ok(expected)
    } else {
        Err(Error::provider("yt-dlp did not produce an audio file"))
    }
}
