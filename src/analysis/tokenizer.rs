use crate::analysis::token::Token;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;
}

/// Standard Unicode tokenizer: default lower-casing, then split on maximal
/// runs of characters that are neither a letter nor a digit. Empty tokens
/// are discarded. No stemming, no stop-words, no accent folding. The same
/// tokenizer analyzes both documents and queries, so matching is symmetric.
#[derive(Debug, Clone, Default)]
pub struct StandardTokenizer;

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let lowered = text.to_lowercase();
        let mut tokens = Vec::new();
        let mut position = 0u32;

        for word in lowered.split(|c: char| !c.is_alphanumeric()) {
            if word.is_empty() {
                continue;
            }
            tokens.push(Token::new(word.to_string(), position));
            position += 1;
        }

        tokens
    }

    fn name(&self) -> &str {
        "standard"
    }
}
