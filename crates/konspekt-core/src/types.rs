use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KonspektError;

/// One audio-derived unit of content. Created by an external collaborator
/// before the pipeline runs; the pipeline fills in `transcript` and `summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    pub id: String,
    pub title: String,
    pub audio_path: PathBuf,
    pub transcript: Option<String>,
    pub summary: Option<String>,
}

/// Whisper output: flat text plus timestamped segments and detected language.
/// Only `text` ends up on the Lecture; the rest is diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<Segment>,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Mcq,
    Tf,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Mcq => write!(f, "mcq"),
            QuestionKind::Tf => write!(f, "tf"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = KonspektError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcq" => Ok(QuestionKind::Mcq),
            "tf" => Ok(QuestionKind::Tf),
            other => Err(KonspektError::UnknownQuestionType {
                kind: other.to_string(),
            }),
        }
    }
}

/// A persisted quiz item linked to exactly one lecture. Never mutated after
/// creation; `options` is present for `mcq` records and absent for `tf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub lecture_id: String,
    pub kind: QuestionKind,
    pub question: String,
    pub answer: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<McqOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqOptions {
    #[serde(rename = "A", default)]
    pub a: String,
    #[serde(rename = "B", default)]
    pub b: String,
    #[serde(rename = "C", default)]
    pub c: String,
    #[serde(rename = "D", default)]
    pub d: String,
}

/// One multiple-choice item as returned by the backend. Missing option
/// fields deserialize to empty strings rather than rejecting the item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqItem {
    #[serde(default)]
    pub concept: String,
    pub question: String,
    #[serde(default)]
    pub options: McqOptions,
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// One true/false item as returned by the backend; `answer` is the token
/// "True" or "False".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfItem {
    #[serde(default)]
    pub concept: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// A parsed generator batch, tagged with the question kind it carries.
#[derive(Debug, Clone)]
pub enum QuestionBatch {
    Mcq(Vec<McqItem>),
    Tf(Vec<TfItem>),
}

impl QuestionBatch {
    pub fn kind(&self) -> QuestionKind {
        match self {
            QuestionBatch::Mcq(_) => QuestionKind::Mcq,
            QuestionBatch::Tf(_) => QuestionKind::Tf,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QuestionBatch::Mcq(items) => items.len(),
            QuestionBatch::Tf(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
