use crate::config::AnalysisConfig;
use crate::flow_context::is_specific_flow;
use crate::judge::{CasePayload, Decision, JudgeResult};
use crate::retrieval::CandidateIntent;
use crate::signals::SlotSignal;
use crate::util::round_to;

pub const NEW_INTENT_CAP: f64 = 0.6;
pub const UNHANDLED_PARAMETER_CAP: f64 = 0.65;
pub const OUT_OF_SCOPE_CONFIDENCE: f64 = 0.85;
pub const SHORT_TRIGGER_WORDS: usize = 4;

/// Lowercased substrings that mark a trigger as clearly outside the domain.
pub const OUT_OF_DOMAIN_KEYWORDS: [&str; 4] = ["torta", "futbol", "receta", "clima"];

/// Deterministic consistency rules over a judge answer.
#[derive(Debug, Clone)]
pub struct PostValidator {
    strong_match: f64,
    weak_match: f64,
}

impl PostValidator {
    pub fn new(cfg: &AnalysisConfig) -> Self {
        Self {
            strong_match: cfg.strong_match,
            weak_match: cfg.weak_match,
        }
    }

    pub fn validate_payload(&self, result: JudgeResult, payload: &CasePayload) -> JudgeResult {
        self.validate(
            result,
            &payload.candidates,
            &payload.flow_ref,
            &payload.slot_signals,
            &payload.trigger_text,
        )
    }

    /// Applies, in order:
    /// - flow conflict: a strong candidate in `flow_ref` contradicts a
    ///   NEW_INTENT decision, cap at 0.6 and flag;
    /// - unhandled parameter: a short trigger with slot signals not judged
    ///   MISSING_PARAMETER_HANDLER, cap at 0.65 and flag;
    /// - out of scope: weak evidence and an out-of-domain keyword force
    ///   OUT_OF_SCOPE at 0.85, unflagged, replacing the previous effects.
    ///
    /// Confidence is rounded to 2 decimals.
    pub fn validate(
        &self,
        mut result: JudgeResult,
        candidates: &[CandidateIntent],
        flow_ref: &str,
        slot_signals: &[SlotSignal],
        trigger_text: &str,
    ) -> JudgeResult {
        let mut confidence = result.confidence;
        let mut review_flag = false;
        let mut fired: Vec<&'static str> = Vec::new();

        let strong_in_flow = is_specific_flow(flow_ref)
            && candidates.iter().any(|c| {
                c.flow == flow_ref && c.evidence.iter().any(|e| e.similarity >= self.strong_match)
            });
        if strong_in_flow && result.decision.contains("NEW_INTENT") {
            confidence = confidence.min(NEW_INTENT_CAP);
            review_flag = true;
            fired.push("flow_conflict");
        }

        let short_trigger = trigger_text.split_whitespace().count() <= SHORT_TRIGGER_WORDS;
        if !slot_signals.is_empty()
            && short_trigger
            && !result.decision.contains("MISSING_PARAMETER_HANDLER")
        {
            confidence = confidence.min(UNHANDLED_PARAMETER_CAP);
            review_flag = true;
            fired.push("unhandled_parameter");
        }

        let max_sim = candidates
            .iter()
            .map(CandidateIntent::max_similarity)
            .fold(0.0, f64::max);
        if max_sim < self.weak_match
            && result.decision != Decision::OutOfScope
            && has_out_of_domain_keyword(trigger_text)
        {
            result.decision = Decision::OutOfScope;
            confidence = OUT_OF_SCOPE_CONFIDENCE;
            review_flag = false;
            fired.push("out_of_scope");
        }

        if !fired.is_empty() {
            tracing::debug!(
                target: "nomatch.validate",
                stage = "validate.rules",
                rules = ?fired,
                judge_confidence = result.confidence,
                confidence
            );
        }

        result.confidence = round_to(confidence, 2);
        result.review_flag = review_flag;
        result
    }
}

fn has_out_of_domain_keyword(trigger_text: &str) -> bool {
    let lowered = trigger_text.to_lowercase();
    OUT_OF_DOMAIN_KEYWORDS.iter().any(|k| lowered.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::Evidence;

    fn validator() -> PostValidator {
        PostValidator::new(&AnalysisConfig::default())
    }

    fn candidate(intent: &str, flow: &str, sim: f64) -> CandidateIntent {
        CandidateIntent {
            intent: intent.into(),
            flow: flow.into(),
            score: 0.5,
            evidence: vec![Evidence {
                phrase: "x".into(),
                similarity: sim,
            }],
            training_phrases: vec!["x".into()],
        }
    }

    fn judged(decision: Decision, confidence: f64) -> JudgeResult {
        JudgeResult {
            decision,
            confidence,
            ..JudgeResult::default()
        }
    }

    #[test]
    fn strong_match_in_flow_caps_new_intent() {
        let out = validator().validate(
            judged(Decision::NewIntentInFlow, 0.9),
            &[candidate("Cuentas_Resumen", "Cuentas", 0.8)],
            "Cuentas",
            &[],
            "quiero ver el resumen de mi cuenta corriente",
        );
        assert!(out.confidence <= 0.6);
        assert!(out.review_flag);
        assert_eq!(out.decision, Decision::NewIntentInFlow);
    }

    #[test]
    fn flow_conflict_needs_a_specific_flow() {
        for flow_ref in ["UNKNOWN", "CHIT"] {
            let out = validator().validate(
                judged(Decision::NewIntentInFlow, 0.9),
                &[candidate("CHIT_X", flow_ref, 0.95)],
                flow_ref,
                &[],
                "una frase bastante larga sin parametros",
            );
            assert_eq!(out.confidence, 0.9);
            assert!(!out.review_flag);
        }
    }

    #[test]
    fn short_trigger_with_signals_is_capped() {
        let out = validator().validate(
            judged(Decision::MissedExistingIntentInFlow, 0.93),
            &[candidate("Cuentas_Resumen", "Cuentas", 0.4)],
            "Cuentas",
            &[SlotSignal::MonthPeriod],
            "el de marzo",
        );
        assert_eq!(out.confidence, 0.65);
        assert!(out.review_flag);

        let handled = validator().validate(
            judged(Decision::MissingParameterHandler, 0.93),
            &[],
            "Cuentas",
            &[SlotSignal::MonthPeriod],
            "el de marzo",
        );
        assert_eq!(handled.confidence, 0.93);
        assert!(!handled.review_flag);
    }

    #[test]
    fn rules_a_and_b_stack() {
        let out = validator().validate(
            judged(Decision::NewIntentInFlow, 0.99),
            &[candidate("Cuentas_Resumen", "Cuentas", 0.9)],
            "Cuentas",
            &[SlotSignal::MonthPeriod],
            "marzo",
        );
        assert_eq!(out.confidence, 0.6);
        assert!(out.review_flag);
    }

    #[test]
    fn out_of_domain_keyword_overrides() {
        let out = validator().validate(
            judged(Decision::NewIntentInFlow, 0.2),
            &[candidate("Cuentas_Resumen", "Cuentas", 0.1)],
            "Cuentas",
            &[SlotSignal::AmountQuery],
            "Cuánto dura una receta de Torta",
        );
        assert_eq!(out.decision, Decision::OutOfScope);
        assert_eq!(out.confidence, 0.85);
        assert!(!out.review_flag);
    }

    #[test]
    fn out_of_scope_override_clears_parameter_review() {
        let trigger = "torta en dolares";
        let signals = crate::signals::detect_slot_signals(trigger);
        assert_eq!(signals, vec![SlotSignal::Currency]);

        let capped = validator().validate(
            judged(Decision::MissedExistingIntentInFlow, 0.9),
            &[candidate("Tarjetas_Limite", "Tarjetas", 0.6)],
            "Tarjetas",
            &signals,
            trigger,
        );
        assert_eq!(capped.confidence, 0.65);
        assert!(capped.review_flag);

        let out = validator().validate(
            judged(Decision::MissedExistingIntentInFlow, 0.9),
            &[candidate("Tarjetas_Limite", "Tarjetas", 0.3)],
            "Tarjetas",
            &signals,
            trigger,
        );
        assert_eq!(out.decision, Decision::OutOfScope);
        assert_eq!(out.confidence, 0.85);
        assert!(!out.review_flag);
    }

    #[test]
    fn strong_evidence_blocks_out_of_scope_override() {
        let out = validator().validate(
            judged(Decision::Ambiguous, 0.4),
            &[candidate("Clima_Consulta", "Clima", 0.7)],
            "UNKNOWN",
            &[],
            "como esta el clima hoy en la ciudad",
        );
        assert_eq!(out.decision, Decision::Ambiguous);
        assert_eq!(out.confidence, 0.4);
    }

    #[test]
    fn confidence_never_increases_except_override() {
        let cases = [
            (Decision::NewIntentInFlow, 0.33333, "hola"),
            (Decision::FlowSwitch, 0.777, "el de marzo"),
            (Decision::OutOfScope, 0.1, "receta"),
            (Decision::Ambiguous, 0.0, "torta"),
        ];
        for (decision, conf, text) in cases {
            let signals = crate::signals::detect_slot_signals(text);
            let out = validator().validate(
                judged(decision, conf),
                &[candidate("Cuentas_Resumen", "Cuentas", 0.8)],
                "Cuentas",
                &signals,
                text,
            );
            assert!(
                out.confidence <= round_to(conf, 2) || out.confidence == 0.85,
                "{text}: {} > {conf}",
                out.confidence
            );
            assert!((0.0..=1.0).contains(&out.confidence));
        }
    }
}
