//! Types for transcription operations.

use std::path::PathBuf;

/// A local audio file to transcribe.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInput {
    pub path: PathBuf,
    /// Name sent to the provider; its extension tells the provider the format.
    pub file_name: String,
}

impl AudioInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());
        Self { path, file_name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_taken_from_the_path() {
        let input = AudioInput::new("/tmp/work/lecture.wav");
        assert_eq!(input.file_name, "lecture.wav");
    }
}
