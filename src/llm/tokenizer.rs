use once_cell::sync::Lazy;
use tiktoken_rs::{cl100k_base, CoreBPE};
use tracing::warn;

// cl100k_base is the encoding of the gpt-3.5-turbo family.
static BPE: Lazy<Option<CoreBPE>> = Lazy::new(|| match cl100k_base() {
    Ok(bpe) => Some(bpe),
    Err(e) => {
        warn!("cl100k_base encoding unavailable, estimating tokens from characters: {}", e);
        None
    }
});

/// Number of tokens `text` encodes to. Empty text is 0 tokens.
pub fn count_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    match BPE.as_ref() {
        Some(bpe) => bpe.encode_ordinary(text).len(),
        None => estimate_tokens(text),
    }
}

/// Rough count of four characters per token.
fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
