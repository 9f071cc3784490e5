//! Konspekt Core Library
//!
//! Core functionality for transcribing lecture audio with Whisper, building
//! a two-level course summary, and generating quiz questions through an
//! OpenAI-compatible chat backend.

pub mod backend;
pub mod chunk;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod provider;
pub mod quiz;
pub mod store;
pub mod summarize;
pub mod transcribe;
pub mod types;

// Re-export commonly used items at crate root
pub use backend::{ChatBackend, ChatClient};
pub use error::{KonspektError, Result};
pub use format::{format_lecture_readable, format_questions_readable};
pub use pipeline::{PipelineReport, PipelineState, process_lecture};
pub use provider::{Provider, ProviderConfig, ProviderError};
pub use store::{JsonStore, LectureStore, store_batch};
pub use transcribe::{Transcriber, WhisperTranscriber};
pub use types::{
    Lecture, McqItem, McqOptions, Question, QuestionBatch, QuestionKind, Segment, TfItem,
    Transcript,
};
