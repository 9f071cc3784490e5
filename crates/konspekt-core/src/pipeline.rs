//! Pipeline orchestrator: transcribe, summarize, generate, store — strictly
//! in that order. Fatal failures stop the run and leave the partially-written
//! state visible; backend flakiness degrades the output instead of crashing.

use std::fmt;

use crate::backend::ChatBackend;
use crate::chunk::{self, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};
use crate::error::Result;
use crate::quiz;
use crate::store::{LectureStore, store_batch};
use crate::summarize;
use crate::transcribe::Transcriber;
use crate::types::QuestionBatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Transcribing,
    Summarizing,
    GeneratingQuestions,
    Done,
    /// Terminal state reachable from `Transcribing` only: no transcript means
    /// nothing downstream can run.
    Aborted,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Pending => "pending",
            PipelineState::Transcribing => "transcribing",
            PipelineState::Summarizing => "summarizing",
            PipelineState::GeneratingQuestions => "generating questions",
            PipelineState::Done => "done",
            PipelineState::Aborted => "aborted",
        };
        write!(f, "{name}")
    }
}

/// Outcome of one pipeline run. The orchestrator returns this normally
/// whether or not meaningful output was produced; only pre-flight and
/// storage-infrastructure failures surface as `Err`.
#[derive(Debug)]
pub struct PipelineReport {
    pub lecture_id: String,
    pub state: PipelineState,
    pub chunk_count: usize,
    pub degraded_chunks: usize,
    pub summary_degraded: bool,
    pub mcq_stored: usize,
    pub tf_stored: usize,
}

impl PipelineReport {
    fn new(lecture_id: &str) -> Self {
        Self {
            lecture_id: lecture_id.to_string(),
            state: PipelineState::Pending,
            chunk_count: 0,
            degraded_chunks: 0,
            summary_degraded: false,
            mcq_stored: 0,
            tf_stored: 0,
        }
    }
}

/// Run the full transcript-to-assessment pipeline for one lecture.
///
/// Quotas of zero skip the corresponding question type without touching the
/// backend. No stage is retried; every external call is attempted exactly
/// once per run.
pub async fn process_lecture(
    transcriber: &dyn Transcriber,
    backend: &dyn ChatBackend,
    store: &dyn LectureStore,
    lecture_id: &str,
    num_mcq: u32,
    num_tf: u32,
) -> Result<PipelineReport> {
    let mut lecture = store.get_lecture(lecture_id).await?;
    let mut report = PipelineReport::new(lecture_id);

    report.state = PipelineState::Transcribing;
    tracing::info!(lecture_id, audio = %lecture.audio_path.display(), "transcribing");
    let transcript = match transcriber.transcribe(&lecture.audio_path).await {
        Ok(t) if !t.text.trim().is_empty() => t,
        Ok(_) => {
            tracing::error!(lecture_id, "transcription produced no text, aborting run");
            report.state = PipelineState::Aborted;
            return Ok(report);
        }
        Err(e) => {
            tracing::error!(lecture_id, error = %e, "transcription failed, aborting run");
            report.state = PipelineState::Aborted;
            return Ok(report);
        }
    };

    // Checkpoint: the transcript survives a crash of any later stage.
    lecture.transcript = Some(transcript.text.clone());
    store.save_lecture(&lecture).await?;

    report.state = PipelineState::Summarizing;
    let chunks = chunk::split(&transcript.text, DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH);
    report.chunk_count = chunks.len();
    tracing::info!(lecture_id, chunks = chunks.len(), "summarizing");

    let mut fragments = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        match summarize::summarize_chunk(backend, chunk, index, chunks.len()).await {
            Ok(fragment) => fragments.push(fragment),
            Err(e) => {
                tracing::warn!(lecture_id, segment = index + 1, error = %e, "chunk summary failed");
                report.degraded_chunks += 1;
                fragments.push(summarize::chunk_failed_placeholder(index));
            }
        }
    }

    let summary = match summarize::combine(backend, &fragments).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(lecture_id, error = %e, "summary combination failed");
            report.summary_degraded = true;
            summarize::COMBINE_FAILED_PLACEHOLDER.to_string()
        }
    };

    // Checkpoint: even a placeholder summary is persisted so downstream
    // consumers see where the run degraded.
    lecture.summary = Some(summary.clone());
    store.save_lecture(&lecture).await?;

    report.state = PipelineState::GeneratingQuestions;
    if num_mcq > 0 {
        let items = match quiz::generate_mcq(backend, &summary, num_mcq).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(lecture_id, error = %e, "MCQ generation failed");
                Vec::new()
            }
        };
        if items.is_empty() {
            tracing::warn!(lecture_id, "no MCQ items produced");
        } else {
            report.mcq_stored = store_batch(store, lecture_id, QuestionBatch::Mcq(items)).await?;
        }
    }

    if num_tf > 0 {
        let items = match quiz::generate_tf(backend, &summary, num_tf).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(lecture_id, error = %e, "TF generation failed");
                Vec::new()
            }
        };
        if items.is_empty() {
            tracing::warn!(lecture_id, "no TF items produced");
        } else {
            report.tf_stored = store_batch(store, lecture_id, QuestionBatch::Tf(items)).await?;
        }
    }

    report.state = PipelineState::Done;
    tracing::info!(
        lecture_id,
        mcq = report.mcq_stored,
        tf = report.tf_stored,
        "pipeline finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::KonspektError;
    use crate::types::{Lecture, McqItem, McqOptions, Question, QuestionKind, TfItem, Transcript};

    struct FakeTranscriber {
        text: Option<String>,
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
            match &self.text {
                Some(text) => Ok(Transcript {
                    text: text.clone(),
                    segments: Vec::new(),
                    language: "en".to_string(),
                }),
                None => Err(KonspektError::TranscriptionFailed {
                    audio_path: audio_path.to_path_buf(),
                    reason: "engine exploded".to_string(),
                }),
            }
        }
    }

    /// Replays canned responses in call order and records every prompt pair.
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<String>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_prompt.to_string()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(KonspektError::BackendFailed {
                        reason: "script exhausted".to_string(),
                    })
                })
        }
    }

    #[derive(Default)]
    struct MemStore {
        lectures: Mutex<HashMap<String, Lecture>>,
        questions: Mutex<Vec<Question>>,
    }

    impl MemStore {
        fn with_lecture(id: &str) -> Self {
            let store = Self::default();
            store.lectures.lock().unwrap().insert(
                id.to_string(),
                Lecture {
                    id: id.to_string(),
                    title: "Test lecture".to_string(),
                    audio_path: PathBuf::from("/audio/test.wav"),
                    transcript: None,
                    summary: None,
                },
            );
            store
        }

        fn lecture(&self, id: &str) -> Lecture {
            self.lectures.lock().unwrap().get(id).unwrap().clone()
        }

        fn questions(&self) -> Vec<Question> {
            self.questions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LectureStore for MemStore {
        async fn get_lecture(&self, id: &str) -> Result<Lecture> {
            self.lectures
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| KonspektError::LectureNotFound { id: id.to_string() })
        }

        async fn save_lecture(&self, lecture: &Lecture) -> Result<()> {
            self.lectures
                .lock()
                .unwrap()
                .insert(lecture.id.clone(), lecture.clone());
            Ok(())
        }

        async fn insert_question(&self, question: &Question) -> Result<()> {
            self.questions.lock().unwrap().push(question.clone());
            Ok(())
        }

        async fn questions_for(&self, lecture_id: &str) -> Result<Vec<Question>> {
            Ok(self
                .questions
                .lock()
                .unwrap()
                .iter()
                .filter(|q| q.lecture_id == lecture_id)
                .cloned()
                .collect())
        }

        async fn clear_questions(&self, lecture_id: &str) -> Result<()> {
            self.questions
                .lock()
                .unwrap()
                .retain(|q| q.lecture_id != lecture_id);
            Ok(())
        }
    }

    fn backend_down() -> Result<String> {
        Err(KonspektError::BackendFailed {
            reason: "backend down".to_string(),
        })
    }

    fn mcq_json(count: usize) -> String {
        let items: Vec<McqItem> = (0..count)
            .map(|i| McqItem {
                concept: format!("concept {i}"),
                question: format!("Question {i}?"),
                options: McqOptions {
                    a: "alpha".to_string(),
                    b: "bravo".to_string(),
                    c: "charlie".to_string(),
                    d: "delta".to_string(),
                },
                answer: "A".to_string(),
                explanation: "because".to_string(),
            })
            .collect();
        serde_json::to_string(&items).unwrap()
    }

    fn tf_json(count: usize) -> String {
        let items: Vec<TfItem> = (0..count)
            .map(|i| TfItem {
                concept: format!("concept {i}"),
                question: format!("Statement {i}."),
                answer: "True".to_string(),
                explanation: "because".to_string(),
            })
            .collect();
        serde_json::to_string(&items).unwrap()
    }

    #[tokio::test]
    async fn happy_path_stores_the_requested_mcq_batch() {
        let store = MemStore::with_lecture("lec");
        let transcriber = FakeTranscriber {
            text: Some("The heap lives long. The stack is fast.".to_string()),
        };
        let backend = ScriptedBackend::new(vec![
            Ok("fragment".to_string()),
            Ok("combined summary".to_string()),
            Ok(mcq_json(5)),
        ]);

        let report = process_lecture(&transcriber, &backend, &store, "lec", 5, 0)
            .await
            .unwrap();

        assert_eq!(report.state, PipelineState::Done);
        assert_eq!(report.chunk_count, 1);
        assert_eq!(report.mcq_stored, 5);
        assert_eq!(report.tf_stored, 0);

        let questions = store.questions();
        assert_eq!(questions.len(), 5);
        for q in &questions {
            assert_eq!(q.kind, QuestionKind::Mcq);
            assert!(["A", "B", "C", "D"].contains(&q.answer.as_str()));
            let options = q.options.as_ref().unwrap();
            assert!(!options.a.is_empty() && !options.d.is_empty());
        }

        let lecture = store.lecture("lec");
        assert_eq!(
            lecture.transcript.as_deref(),
            Some("The heap lives long. The stack is fast.")
        );
        assert_eq!(lecture.summary.as_deref(), Some("combined summary"));
    }

    #[tokio::test]
    async fn zero_quotas_never_touch_the_generator_or_store() {
        let store = MemStore::with_lecture("lec");
        let transcriber = FakeTranscriber {
            text: Some("One sentence.".to_string()),
        };
        let backend = ScriptedBackend::new(vec![
            Ok("fragment".to_string()),
            Ok("combined summary".to_string()),
        ]);

        let report = process_lecture(&transcriber, &backend, &store, "lec", 0, 0)
            .await
            .unwrap();

        assert_eq!(report.state, PipelineState::Done);
        assert!(store.questions().is_empty());
        // Only the two summary calls happened.
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn failed_transcription_aborts_and_leaves_the_lecture_untouched() {
        let store = MemStore::with_lecture("lec");
        let transcriber = FakeTranscriber { text: None };
        let backend = ScriptedBackend::new(Vec::new());

        let report = process_lecture(&transcriber, &backend, &store, "lec", 3, 3)
            .await
            .unwrap();

        assert_eq!(report.state, PipelineState::Aborted);
        let lecture = store.lecture("lec");
        assert!(lecture.transcript.is_none());
        assert!(lecture.summary.is_none());
        assert!(store.questions().is_empty());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_transcript_counts_as_no_transcript() {
        let store = MemStore::with_lecture("lec");
        let transcriber = FakeTranscriber {
            text: Some("   ".to_string()),
        };
        let backend = ScriptedBackend::new(Vec::new());

        let report = process_lecture(&transcriber, &backend, &store, "lec", 1, 0)
            .await
            .unwrap();

        assert_eq!(report.state, PipelineState::Aborted);
        assert!(store.lecture("lec").transcript.is_none());
    }

    #[tokio::test]
    async fn failed_combine_persists_the_placeholder_and_still_generates() {
        let store = MemStore::with_lecture("lec");
        let transcriber = FakeTranscriber {
            text: Some("A sentence.".to_string()),
        };
        let backend = ScriptedBackend::new(vec![
            Ok("fragment".to_string()),
            backend_down(),
            Ok(mcq_json(1)),
        ]);

        let report = process_lecture(&transcriber, &backend, &store, "lec", 1, 0)
            .await
            .unwrap();

        assert_eq!(report.state, PipelineState::Done);
        assert!(report.summary_degraded);
        assert_eq!(report.mcq_stored, 1);
        assert_eq!(
            store.lecture("lec").summary.as_deref(),
            Some(summarize::COMBINE_FAILED_PLACEHOLDER)
        );
        // Generation ran against the placeholder summary.
        let calls = backend.calls();
        assert_eq!(
            calls.last().unwrap().1,
            summarize::COMBINE_FAILED_PLACEHOLDER
        );
    }

    #[tokio::test]
    async fn failed_chunk_summary_degrades_without_stopping_the_run() {
        let store = MemStore::with_lecture("lec");
        let transcriber = FakeTranscriber {
            text: Some("A sentence.".to_string()),
        };
        let backend = ScriptedBackend::new(vec![backend_down(), Ok("combined".to_string())]);

        let report = process_lecture(&transcriber, &backend, &store, "lec", 0, 0)
            .await
            .unwrap();

        assert_eq!(report.state, PipelineState::Done);
        assert_eq!(report.degraded_chunks, 1);
        // The combine call saw the per-segment placeholder.
        let calls = backend.calls();
        assert!(calls[1].1.contains("summary failed for segment 1"));
        assert_eq!(store.lecture("lec").summary.as_deref(), Some("combined"));
    }

    #[tokio::test]
    async fn mcq_failure_does_not_block_the_tf_branch() {
        let store = MemStore::with_lecture("lec");
        let transcriber = FakeTranscriber {
            text: Some("A sentence.".to_string()),
        };
        let backend = ScriptedBackend::new(vec![
            Ok("fragment".to_string()),
            Ok("combined summary".to_string()),
            Ok("not even json [".to_string()),
            Ok(tf_json(2)),
        ]);

        let report = process_lecture(&transcriber, &backend, &store, "lec", 2, 2)
            .await
            .unwrap();

        assert_eq!(report.state, PipelineState::Done);
        assert_eq!(report.mcq_stored, 0);
        assert_eq!(report.tf_stored, 2);

        let questions = store.questions();
        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|q| q.kind == QuestionKind::Tf));
    }

    #[tokio::test]
    async fn unknown_lecture_is_a_fatal_error() {
        let store = MemStore::default();
        let transcriber = FakeTranscriber { text: None };
        let backend = ScriptedBackend::new(Vec::new());

        let err = process_lecture(&transcriber, &backend, &store, "ghost", 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, KonspektError::LectureNotFound { .. }));
    }
}
