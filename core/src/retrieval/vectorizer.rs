use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

pub const MAX_FEATURES: usize = 5000;

static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("TOKEN_REGEX is valid"))
}

/// Sparse row: `(term_id, weight)` pairs sorted by term id.
pub type SparseVector = Vec<(usize, f64)>;

/// Unigrams plus space-joined adjacent bigrams of the lowercased text.
pub fn terms(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = token_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .collect();
    let mut out: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    out.extend(tokens.windows(2).map(|w| format!("{} {}", w[0], w[1])));
    out
}

/// Smoothed TF-IDF with L2-normalised rows.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learns the vocabulary (capped at `max_features` by corpus frequency,
    /// ties alphabetical) and the idf of every kept term.
    pub fn fit<S: AsRef<str>>(docs: &[S], max_features: usize) -> Self {
        let mut corpus_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in docs {
            let mut seen = std::collections::HashSet::new();
            for term in terms(doc.as_ref()) {
                *corpus_freq.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.clone()) {
                    *doc_freq.entry(term).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        // Term ids follow alphabetical order of the kept vocabulary.
        let mut kept: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        kept.sort();

        let n = docs.len() as f64;
        let idf = kept
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        let vocabulary = kept.into_iter().enumerate().map(|(i, t)| (t, i)).collect();

        Self { vocabulary, idf }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    /// Terms outside the vocabulary are ignored. A text with no known term
    /// yields an empty vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in terms(text) {
            if let Some(&id) = self.vocabulary.get(&term) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(id, tf)| (id, tf * self.idf[id]))
            .collect();
        row.sort_by_key(|(id, _)| *id);

        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in row.iter_mut() {
                *w /= norm;
            }
        }
        row
    }
}

/// Dot product of two sorted sparse vectors; cosine for L2-normalised rows.
pub fn dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut acc = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                acc += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_include_bigrams_and_drop_short_tokens() {
        assert_eq!(
            terms("Ver mi resumen y saldo"),
            vec!["ver", "mi", "resumen", "saldo", "ver mi", "mi resumen", "resumen saldo"]
        );
        assert!(terms("a b c").is_empty());
    }

    #[test]
    fn identical_text_has_unit_similarity() {
        let docs = ["quiero ver mi resumen", "limite de la tarjeta", "hola"];
        let v = TfidfVectorizer::fit(&docs, MAX_FEATURES);
        let a = v.transform("quiero ver mi resumen");
        let b = v.transform("quiero ver mi resumen");
        assert!((dot(&a, &b) - 1.0).abs() < 1e-9);
        let c = v.transform("limite de la tarjeta");
        assert!(dot(&a, &c).abs() < 1e-12);
    }

    #[test]
    fn unknown_terms_are_ignored() {
        let v = TfidfVectorizer::fit(&["resumen de cuenta"], MAX_FEATURES);
        assert!(v.transform("pizza futbol").is_empty());
        let q = v.transform("resumen pizza");
        assert_eq!(q.len(), 1);
        assert!((q[0].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn vocabulary_is_capped_by_frequency() {
        let docs = ["aa bb", "aa cc", "aa bb"];
        let v = TfidfVectorizer::fit(&docs, 2);
        assert_eq!(v.vocabulary_len(), 2);
        // "aa" (3) and "aa bb"/"bb" (2 each): alphabetical tie-break keeps "aa bb"
        assert!(!v.transform("aa").is_empty());
        assert!(!v.transform("zz aa bb").is_empty());
        assert!(v.transform("cc").is_empty());
        assert!(v.transform("bb").is_empty());
    }
}
