use std::path::PathBuf;
use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum KonspektError {
    #[error("Lecture not found: {id}")]
    LectureNotFound { id: String },

    #[error("Audio file not found: {path}")]
    AudioNotFound { path: PathBuf },

    #[error("Transcription failed for {audio_path}: {reason}")]
    TranscriptionFailed { audio_path: PathBuf, reason: String },

    #[error("Backend call failed: {reason}")]
    BackendFailed { reason: String },

    #[error("Unknown question type: {kind}")]
    UnknownQuestionType { kind: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, KonspektError>;
