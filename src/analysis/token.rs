use serde::{Deserialize, Serialize};

/// Token representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Position within the tokenized text. The indexing pipeline rebases
    /// this onto the document-global counter.
    pub position: u32,
}

impl Token {
    pub fn new(text: String, position: u32) -> Self {
        Token { text, position }
    }
}
