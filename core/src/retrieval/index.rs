use super::vectorizer::{dot, SparseVector, TfidfVectorizer, MAX_FEATURES};
use crate::training::{TrainingCatalog, TrainingPhrase};

/// Term-weighted vectors of every training phrase, one row per phrase.
///
/// Built once per run; read-only afterwards and shared between workers.
#[derive(Debug, Clone, Default)]
pub struct TrainingIndex {
    catalog: TrainingCatalog,
    vectorizer: TfidfVectorizer,
    rows: Vec<SparseVector>,
}

impl TrainingIndex {
    pub fn build(catalog: TrainingCatalog) -> Self {
        let texts: Vec<&str> = catalog
            .phrases()
            .iter()
            .map(|p| p.normalized_phrase.as_str())
            .collect();
        let vectorizer = TfidfVectorizer::fit(&texts, MAX_FEATURES);
        let rows = texts.iter().map(|t| vectorizer.transform(t)).collect();

        tracing::info!(
            target: "nomatch.retrieval",
            stage = "retrieval.index.built",
            phrases = catalog.len(),
            intents = catalog.intents().len(),
            vocabulary = vectorizer.vocabulary_len()
        );

        Self {
            catalog,
            vectorizer,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn phrases(&self) -> &[TrainingPhrase] {
        self.catalog.phrases()
    }

    /// Cosine similarity of `query` against every row, in catalog order.
    pub fn similarities(&self, query: &str) -> Vec<f64> {
        let q = self.vectorizer.transform(query);
        self.rows.iter().map(|row| dot(row, &q)).collect()
    }
}
