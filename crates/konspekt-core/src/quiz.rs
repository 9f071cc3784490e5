//! Quiz generation: one backend call per question type, demanding a strict
//! JSON array that parses directly into typed items. Semantic quality of the
//! questions is the backend's concern; only structure is validated here.

use crate::backend::ChatBackend;
use crate::error::Result;
use crate::types::{McqItem, TfItem};

fn mcq_prompt(count: u32) -> String {
    format!(
        r#"You are a course quiz writer. Based on the course summary provided by the user, write {count} multiple-choice questions.

Return ONLY a valid JSON array, no markdown, no explanation:
[
  {{
    "concept": "concept being tested",
    "question": "question text",
    "options": {{
      "A": "option A",
      "B": "option B",
      "C": "option C",
      "D": "option D"
    }},
    "answer": "B",
    "explanation": "why the answer is correct"
  }}
]"#
    )
}

fn tf_prompt(count: u32) -> String {
    format!(
        r#"You are a course quiz writer. Based on the course summary provided by the user, write {count} true/false questions.

Return ONLY a valid JSON array, no markdown, no explanation:
[
  {{
    "concept": "concept being tested",
    "question": "statement to judge",
    "answer": "True",
    "explanation": "why the statement is true or false"
  }}
]"#
    )
}

/// Request `count` multiple-choice items. A malformed response is an `Err`
/// the caller maps to "no questions produced", never a pipeline abort.
pub async fn generate_mcq(
    backend: &dyn ChatBackend,
    summary: &str,
    count: u32,
) -> Result<Vec<McqItem>> {
    let content = backend.complete(&mcq_prompt(count), summary).await?;
    parse_mcq(&content)
}

/// Request `count` true/false items.
pub async fn generate_tf(
    backend: &dyn ChatBackend,
    summary: &str,
    count: u32,
) -> Result<Vec<TfItem>> {
    let content = backend.complete(&tf_prompt(count), summary).await?;
    parse_tf(&content)
}

pub fn parse_mcq(content: &str) -> Result<Vec<McqItem>> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse_tf(content: &str) -> Result<Vec<TfItem>> {
    Ok(serde_json::from_str(content)?)
}
