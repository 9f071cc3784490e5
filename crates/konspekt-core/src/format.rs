use crate::types::{Lecture, Question, QuestionKind};

/// Format a lecture's derived state as human-readable markdown.
pub fn format_lecture_readable(lecture: &Lecture) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", lecture.title));
    output.push_str(&format!(
        "**Id:** {} | **Audio:** {}\n\n",
        lecture.id,
        lecture.audio_path.display()
    ));

    match &lecture.summary {
        Some(summary) => {
            output.push_str("## Summary\n\n");
            output.push_str(summary);
            output.push_str("\n\n");
        }
        None => output.push_str("_No summary yet._\n\n"),
    }

    match &lecture.transcript {
        Some(transcript) => {
            output.push_str(&format!(
                "## Transcript\n\n{} characters transcribed\n",
                transcript.chars().count()
            ));
        }
        None => output.push_str("_No transcript yet._\n"),
    }

    output
}

/// Format stored questions as a human-readable quiz sheet.
pub fn format_questions_readable(questions: &[Question]) -> String {
    let mut output = String::new();

    for (i, question) in questions.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, question.question));
        if question.kind == QuestionKind::Mcq {
            if let Some(options) = &question.options {
                output.push_str(&format!("   A) {}\n", options.a));
                output.push_str(&format!("   B) {}\n", options.b));
                output.push_str(&format!("   C) {}\n", options.c));
                output.push_str(&format!("   D) {}\n", options.d));
            }
        }
        output.push_str(&format!("   Answer: {}\n", question.answer));
        if !question.explanation.is_empty() {
            output.push_str(&format!("   Explanation: {}\n", question.explanation));
        }
        output.push('\n');
    }

    if questions.is_empty() {
        output.push_str("No questions stored.\n");
    }

    output
}
