use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::index::TrainingIndex;
use crate::config::AnalysisConfig;
use crate::flow_context::is_specific_flow;
use crate::util::round_to;

const W_MAX: f64 = 0.65;
const W_AVG_TOP5: f64 = 0.25;
const W_HITS: f64 = 0.10;
const FLOW_BOOST: f64 = 1.1;
const TOP_K_AVG: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub phrase: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateIntent {
    pub intent: String,
    pub flow: String,
    pub score: f64,
    pub evidence: Vec<Evidence>,
    pub training_phrases: Vec<String>,
}

impl CandidateIntent {
    pub fn max_similarity(&self) -> f64 {
        self.evidence
            .iter()
            .map(|e| e.similarity)
            .fold(0.0, f64::max)
    }
}

/// Ranked, evidence-backed intent candidates for a normalized query.
///
/// Per intent: `0.65*max_sim + 0.25*avg_top5 + 0.10*ln(1+hits)`, boosted by
/// 1.1 when the intent's flow equals a specific `flow_ref`. Sorted by score
/// descending; ties keep catalog order.
pub fn retrieve(
    index: &TrainingIndex,
    query_normalized: &str,
    flow_ref: &str,
    top_intents: usize,
    evidence_per_intent: usize,
) -> Vec<CandidateIntent> {
    if query_normalized.trim().is_empty() || index.is_empty() {
        return Vec::new();
    }

    let sims = index.similarities(query_normalized);
    let phrases = index.phrases();

    // intent -> rows, in order of first appearance
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row, p) in phrases.iter().enumerate() {
        groups
            .entry(p.intent.as_str())
            .or_insert_with(|| {
                order.push(p.intent.as_str());
                Vec::new()
            })
            .push(row);
    }

    let boost_flow = is_specific_flow(flow_ref).then_some(flow_ref);

    let mut candidates: Vec<CandidateIntent> = order
        .into_iter()
        .map(|intent| {
            let rows = &groups[intent];
            let mut ranked = rows.clone();
            ranked.sort_by(|&a, &b| sims[b].total_cmp(&sims[a]));

            let max_sim = ranked.first().map(|&r| sims[r]).unwrap_or(0.0);
            let avg_top5 =
                ranked.iter().take(TOP_K_AVG).map(|&r| sims[r]).sum::<f64>() / TOP_K_AVG as f64;
            let hits = rows.len() as f64;

            let flow = phrases[rows[0]].flow.clone();
            let mut score = W_MAX * max_sim + W_AVG_TOP5 * avg_top5 + W_HITS * (1.0 + hits).ln();
            if boost_flow == Some(flow.as_str()) {
                score *= FLOW_BOOST;
            }

            CandidateIntent {
                intent: intent.to_string(),
                flow,
                score: round_to(score, 4),
                evidence: ranked
                    .iter()
                    .take(evidence_per_intent)
                    .map(|&r| Evidence {
                        phrase: phrases[r].phrase.clone(),
                        similarity: sims[r],
                    })
                    .collect(),
                training_phrases: rows.iter().map(|&r| phrases[r].phrase.clone()).collect(),
            }
        })
        .collect();

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(top_intents);
    candidates
}

/// Retrieval bound to a shared index and the configured limits.
#[derive(Debug, Clone)]
pub struct Retriever {
    index: Arc<TrainingIndex>,
    top_intents: usize,
    evidence_per_intent: usize,
}

impl Retriever {
    pub fn new(index: Arc<TrainingIndex>, cfg: &AnalysisConfig) -> Self {
        Self {
            index,
            top_intents: cfg.top_intents,
            evidence_per_intent: cfg.evidence_per_intent,
        }
    }

    pub fn retrieve(&self, query_normalized: &str, flow_ref: &str) -> Vec<CandidateIntent> {
        retrieve(
            &self.index,
            query_normalized,
            flow_ref,
            self.top_intents,
            self.evidence_per_intent,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{TrainingCatalog, TrainingRecord};

    fn index() -> TrainingIndex {
        let catalog = TrainingCatalog::new(vec![
            TrainingRecord::new("Cuentas_Resumen", "quiero ver mi resumen de cuenta"),
            TrainingRecord::new("Cuentas_Resumen", "resumen de la cuenta"),
            TrainingRecord::new("Cuentas_Saldo", "cual es mi saldo"),
            TrainingRecord::new("Tarjetas_Limite", "limite de mi tarjeta"),
            TrainingRecord::new("Tarjetas_Limite", "cuanto es el limite"),
            TrainingRecord::new("Tarjetas_Adicional", "pedir tarjeta adicional"),
        ])
        .unwrap();
        TrainingIndex::build(catalog)
    }

    #[test]
    fn empty_query_or_index_yields_nothing() {
        let idx = index();
        assert!(retrieve(&idx, "", "UNKNOWN", 10, 6).is_empty());
        assert!(retrieve(&idx, "   ", "UNKNOWN", 10, 6).is_empty());
        let empty = TrainingIndex::build(TrainingCatalog::default());
        assert!(retrieve(&empty, "resumen", "UNKNOWN", 10, 6).is_empty());
    }

    #[test]
    fn candidates_are_sorted_and_bounded() {
        let idx = index();
        let cands = retrieve(&idx, "quiero ver el resumen de mi cuenta", "UNKNOWN", 3, 1);
        assert_eq!(cands.len(), 3);
        assert_eq!(cands[0].intent, "Cuentas_Resumen");
        assert!(cands.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(cands.iter().all(|c| c.evidence.len() <= 1));
        assert_eq!(cands[0].training_phrases.len(), 2);
        assert_eq!(cands[0].evidence[0].phrase, "quiero ver mi resumen de cuenta");
    }

    #[test]
    fn score_follows_weighting() {
        let idx = index();
        let cands = retrieve(&idx, "pedir tarjeta adicional", "UNKNOWN", 10, 6);
        let top = &cands[0];
        assert_eq!(top.intent, "Tarjetas_Adicional");
        // single phrase, identical text: max = 1, avg_top5 = 1/5, hits = 1
        let expected = round_to(0.65 + 0.25 * 0.2 + 0.10 * 2f64.ln(), 4);
        assert!((top.score - expected).abs() < 1e-9);
        assert!((top.max_similarity() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn flow_affinity_boosts_matching_intents() {
        let idx = index();
        let plain = retrieve(&idx, "mi saldo", "UNKNOWN", 10, 6);
        let boosted = retrieve(&idx, "mi saldo", "Cuentas", 10, 6);
        let score_of = |cs: &[CandidateIntent], name: &str| {
            cs.iter().find(|c| c.intent == name).map(|c| c.score).unwrap()
        };
        let before = score_of(&plain, "Cuentas_Saldo");
        let after = score_of(&boosted, "Cuentas_Saldo");
        assert!((after - round_to(before * 1.1, 4)).abs() < 1e-3);
        assert_eq!(
            score_of(&plain, "Tarjetas_Limite"),
            score_of(&boosted, "Tarjetas_Limite")
        );

        // CHIT never boosts
        let chit = retrieve(&idx, "mi saldo", "CHIT", 10, 6);
        assert_eq!(score_of(&chit, "Cuentas_Saldo"), before);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = TrainingCatalog::new(vec![
            TrainingRecord::new("B_Intent", "nada que ver"),
            TrainingRecord::new("A_Intent", "otra cosa"),
        ])
        .unwrap();
        let idx = TrainingIndex::build(catalog);
        let cands = retrieve(&idx, "pizza", "UNKNOWN", 10, 6);
        let names: Vec<&str> = cands.iter().map(|c| c.intent.as_str()).collect();
        assert_eq!(names, vec!["B_Intent", "A_Intent"]);
    }
}
