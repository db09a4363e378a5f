use std::io::{self, Write};

use anyhow::Result;

const DIVIDER: &str = "---";

/// Renders each question followed by its answer and a divider.
pub fn format_answers(questions: &[String], answers: &[String]) -> String {
    let mut out = String::new();
    for (question, answer) in questions.iter().zip(answers) {
        out.push_str(&format!("Question: {}\n", question));
        out.push_str(&format!("Answer: {}\n", answer));
        out.push_str(DIVIDER);
        out.push('\n');
    }
    out
}

pub fn print_answers(questions: &[String], answers: &[String]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(format_answers(questions, answers).as_bytes())?;
    stdout.flush()?;
    Ok(())
}
