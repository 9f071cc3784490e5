//! Two-level summarization: a short abstract per transcript chunk, then one
//! combined course summary folded from all the abstracts. Both sub-steps
//! return `Err` on backend failure; the orchestrator substitutes placeholders
//! so a flaky backend degrades the summary instead of killing the run.

use crate::backend::ChatBackend;
use crate::error::Result;

/// Persisted in place of the course summary when the combine call fails.
pub const COMBINE_FAILED_PLACEHOLDER: &str = "combination failed";

/// Substituted for a single chunk's abstract when its backend call fails.
pub fn chunk_failed_placeholder(index: usize) -> String {
    format!("summary failed for segment {}", index + 1)
}

static COMBINE_PROMPT: &str = r#"You are an instructional design expert. Merge the numbered segment summaries provided by the user into one complete course summary with this structure:

Course overview: what the course covers and why it matters (150-200 words)
Learning objectives: 4-5 objectives as a bullet list
Outcomes: what students can do after completing the course (under 60 words)

Avoid repeating the same point across sections and keep the whole summary under 400 words."#;

/// Request a short abstract for one chunk, contextualized with its position
/// among `total` chunks. The length guidance is advisory, not enforced.
pub async fn summarize_chunk(
    backend: &dyn ChatBackend,
    chunk: &str,
    index: usize,
    total: usize,
) -> Result<String> {
    let system_prompt = format!(
        r#"You are a course summary writer. Summarize segment {n} of {total} of a lecture transcript:
- a concise overview of the segment (2-3 sentences)
- 2-4 key learning points as a bullet list

Keep the whole summary under 150 words."#,
        n = index + 1,
        total = total,
    );
    backend.complete(&system_prompt, chunk).await
}

/// Fold all per-chunk abstracts into one consolidated course summary.
pub async fn combine(backend: &dyn ChatBackend, fragments: &[String]) -> Result<String> {
    let combined = fragments
        .iter()
        .enumerate()
        .map(|(i, fragment)| format!("Segment {}: {}", i + 1, fragment))
        .collect::<Vec<_>>()
        .join("\n\n");
    backend.complete(COMBINE_PROMPT, &combined).await
}
