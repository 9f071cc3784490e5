use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::error::{KonspektError, Result};
use crate::types::{Lecture, McqOptions, Question, QuestionBatch, QuestionKind};

/// Storage port for the persisted entities the pipeline touches. The core
/// never deletes lectures; question clearing exists for explicit regeneration.
#[async_trait]
pub trait LectureStore: Send + Sync {
    async fn get_lecture(&self, id: &str) -> Result<Lecture>;
    async fn save_lecture(&self, lecture: &Lecture) -> Result<()>;
    async fn insert_question(&self, question: &Question) -> Result<()>;
    async fn questions_for(&self, lecture_id: &str) -> Result<Vec<Question>>;
    async fn clear_questions(&self, lecture_id: &str) -> Result<()>;
}

/// Normalize a generator batch into `Question` records and persist each one.
/// Returns the number of records written. There is no dedup key: storing the
/// same batch twice accumulates duplicates.
pub async fn store_batch(
    store: &dyn LectureStore,
    lecture_id: &str,
    batch: QuestionBatch,
) -> Result<usize> {
    let mut stored = 0;
    match batch {
        QuestionBatch::Mcq(items) => {
            for item in items {
                let question = Question {
                    id: Uuid::new_v4(),
                    lecture_id: lecture_id.to_string(),
                    kind: QuestionKind::Mcq,
                    question: item.question.trim().to_string(),
                    answer: item.answer.trim().to_string(),
                    explanation: item.explanation.trim().to_string(),
                    options: Some(McqOptions {
                        a: item.options.a.trim().to_string(),
                        b: item.options.b.trim().to_string(),
                        c: item.options.c.trim().to_string(),
                        d: item.options.d.trim().to_string(),
                    }),
                };
                store.insert_question(&question).await?;
                stored += 1;
            }
        }
        QuestionBatch::Tf(items) => {
            for item in items {
                let question = Question {
                    id: Uuid::new_v4(),
                    lecture_id: lecture_id.to_string(),
                    kind: QuestionKind::Tf,
                    question: item.question.trim().to_string(),
                    answer: item.answer.trim().to_string(),
                    explanation: item.explanation.trim().to_string(),
                    options: None,
                };
                store.insert_question(&question).await?;
                stored += 1;
            }
        }
    }
    Ok(stored)
}

/// File-backed store: one pretty-printed JSON file per lecture plus one
/// question list per lecture under a common data directory.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("konspekt")
    }

    fn lecture_path(&self, id: &str) -> PathBuf {
        self.root.join("lectures").join(format!("{id}.json"))
    }

    fn questions_path(&self, lecture_id: &str) -> PathBuf {
        self.root.join("questions").join(format!("{lecture_id}.json"))
    }

    /// Register a new lecture for a given audio file. This is the external
    /// collaborator's entry point, not a pipeline stage.
    pub async fn create_lecture(&self, title: &str, audio_path: &Path) -> Result<Lecture> {
        let lecture = Lecture {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            audio_path: audio_path.to_path_buf(),
            transcript: None,
            summary: None,
        };
        self.save_lecture(&lecture).await?;
        Ok(lecture)
    }
}

#[async_trait]
impl LectureStore for JsonStore {
    async fn get_lecture(&self, id: &str) -> Result<Lecture> {
        let json_content = match fs::read_to_string(self.lecture_path(id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(KonspektError::LectureNotFound { id: id.to_string() });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json_content)?)
    }

    async fn save_lecture(&self, lecture: &Lecture) -> Result<()> {
        let path = self.lecture_path(&lecture.id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, serde_json::to_string_pretty(lecture)?).await?;
        Ok(())
    }

    async fn insert_question(&self, question: &Question) -> Result<()> {
        let mut questions = self.questions_for(&question.lecture_id).await?;
        questions.push(question.clone());

        let path = self.questions_path(&question.lecture_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, serde_json::to_string_pretty(&questions)?).await?;
        Ok(())
    }

    async fn questions_for(&self, lecture_id: &str) -> Result<Vec<Question>> {
        match fs::read_to_string(self.questions_path(lecture_id)).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear_questions(&self, lecture_id: &str) -> Result<()> {
        match fs::remove_file(self.questions_path(lecture_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
