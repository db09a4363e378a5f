/// Splits raw question input into one question per line.
///
/// Blank lines are kept as empty questions, and so is the empty tail after a
/// final newline, so every line of input gets an answer slot. A `\r` left by
/// CRLF line endings is dropped.
pub fn split_questions(raw: &str) -> Vec<String> {
    raw.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
