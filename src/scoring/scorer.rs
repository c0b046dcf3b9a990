/// Scorer trait
pub trait Scorer: Send + Sync {
    /// Inverse document frequency for a token seen in `doc_freq` of
    /// `total_docs` documents.
    fn idf(&self, total_docs: usize, doc_freq: u32) -> f64;

    /// Contribution of one token to one document's score.
    fn score(&self, idf: f64, term_freq: u32, doc_len: u32, avg_doc_len: f64) -> f64;

    fn name(&self) -> &str;
}

/// Okapi BM25 scorer.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Scorer {
    pub k1: f64, // Term frequency saturation
    pub b: f64,  // Length normalization strength
}

impl Default for Bm25Scorer {
    fn default() -> Self {
        Bm25Scorer { k1: 1.5, b: 0.75 }
    }
}

impl Scorer for Bm25Scorer {
    fn idf(&self, total_docs: usize, doc_freq: u32) -> f64 {
        let n = total_docs as f64;
        let df = doc_freq as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn score(&self, idf: f64, term_freq: u32, doc_len: u32, avg_doc_len: f64) -> f64 {
        let tf = term_freq as f64;
        let numerator = idf * tf * (self.k1 + 1.0);
        let denominator =
            tf + self.k1 * (1.0 - self.b + self.b * (doc_len as f64 / avg_doc_len));
        numerator / denominator
    }

    fn name(&self) -> &str {
        "bm25"
    }
}
