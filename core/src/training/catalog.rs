use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::turns::{flow_from_intent, normalize_text};

fn default_language() -> String {
    "es".to_string()
}

/// A training example as it arrives from ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub intent: String,
    pub phrase: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl TrainingRecord {
    pub fn new(intent: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            phrase: phrase.into(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPhrase {
    pub intent: String,
    pub flow: String,
    pub language: String,
    pub phrase: String,
    pub normalized_phrase: String,
    pub row_id: usize,
}

/// Immutable catalog of training phrases, one row per phrase.
#[derive(Debug, Clone, Default)]
pub struct TrainingCatalog {
    phrases: Vec<TrainingPhrase>,
}

impl TrainingCatalog {
    /// Assigns `row_id` in input order and derives `flow` and
    /// `normalized_phrase`. An empty intent is a fatal input error.
    pub fn new(records: Vec<TrainingRecord>) -> Result<Self, InputError> {
        let phrases = records
            .into_iter()
            .enumerate()
            .map(|(row_id, rec)| {
                let intent = rec.intent.trim().to_string();
                if intent.is_empty() {
                    return Err(InputError::EmptyIntent { position: row_id });
                }
                let language = match rec.language.trim() {
                    "" => default_language(),
                    l => l.to_string(),
                };
                Ok(TrainingPhrase {
                    flow: flow_from_intent(&intent),
                    normalized_phrase: normalize_text(&rec.phrase),
                    intent,
                    language,
                    phrase: rec.phrase,
                    row_id,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { phrases })
    }

    pub fn phrases(&self) -> &[TrainingPhrase] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Distinct intents in order of first appearance.
    pub fn intents(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.phrases
            .iter()
            .filter(|p| seen.insert(p.intent.as_str()))
            .map(|p| p.intent.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_derives_fields_in_order() {
        let catalog = TrainingCatalog::new(vec![
            TrainingRecord::new("Cuentas_Resumen", "Quiero mi resumen"),
            TrainingRecord::new("Tarjetas_Limite", "Límite de mi tarjeta"),
            TrainingRecord::new("Cuentas_Resumen", "ver resumen de cuenta"),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 3);
        let p = &catalog.phrases()[1];
        assert_eq!(p.row_id, 1);
        assert_eq!(p.flow, "Tarjetas");
        assert_eq!(p.language, "es");
        assert_eq!(p.normalized_phrase, "limite de mi tarjeta");
        assert_eq!(catalog.intents(), vec!["Cuentas_Resumen", "Tarjetas_Limite"]);
    }

    #[test]
    fn empty_intent_is_rejected() {
        let err = TrainingCatalog::new(vec![
            TrainingRecord::new("A", "x"),
            TrainingRecord::new("  ", "y"),
        ])
        .unwrap_err();
        assert_eq!(err, InputError::EmptyIntent { position: 1 });
    }
}
