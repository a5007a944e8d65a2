use std::fmt::Write as _;

use super::aggregate::AggregatedReport;
use super::row::ReportRow;

const TEXT_IMPROVEMENTS: usize = 15;
const TEXT_PHRASE_INTENTS: usize = 10;
const TEXT_PHRASES: usize = 5;

pub fn rows_to_json(rows: &[ReportRow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

/// One row per line, newline-terminated.
pub fn rows_to_jsonl(rows: &[ReportRow]) -> serde_json::Result<String> {
    let mut out = String::new();
    for r in rows {
        out.push_str(&serde_json::to_string(r)?);
        out.push('\n');
    }
    Ok(out)
}

/// Human-readable summary of the rows and, when given, the aggregation.
pub fn format_text(rows: &[ReportRow], aggregate: Option<&AggregatedReport>) -> String {
    let mut out = String::new();
    let review = rows.iter().filter(|r| r.review_flag).count();

    let _ = writeln!(out, "NO_MATCH analysis");
    let _ = writeln!(out, "cases: {}", rows.len());
    let _ = writeln!(out, "review_flagged: {review}");

    for r in rows {
        let _ = writeln!(
            out,
            "- {} [{}] {} -> {} ({:.2}{})",
            r.case_id,
            r.flow_ref,
            r.decision,
            if r.intent_top.is_empty() { "-" } else { r.intent_top.as_str() },
            r.confidence,
            if r.review_flag { ", review" } else { "" }
        );
        if !r.trigger_text.is_empty() {
            let _ = writeln!(out, "  trigger: {}", r.trigger_text);
        }
        if !r.slot_signals.is_empty() {
            let signals: Vec<&str> = r.slot_signals.iter().map(|s| s.as_str()).collect();
            let _ = writeln!(out, "  slot_signals: {}", signals.join(", "));
        }
    }

    if let Some(agg) = aggregate {
        out.push('\n');
        out.push_str(&format_aggregate_text(agg));
    }
    out
}

pub fn format_aggregate_text(agg: &AggregatedReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Summary by flow (total cases: {})", agg.total_cases);

    for (flow, s) in &agg.by_flow {
        let _ = writeln!(out, "## {flow}");
        let _ = writeln!(out, "- cases: {}", s.case_count);

        let mut counts: Vec<(&String, &usize)> = s.decision_counts.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        if !counts.is_empty() {
            let joined: Vec<String> = counts.iter().map(|(d, n)| format!("{d}({n})")).collect();
            let _ = writeln!(out, "- decisions: {}", joined.join(", "));
        }

        if !s.improvements.is_empty() {
            let _ = writeln!(out, "- improvements:");
            for imp in s.improvements.iter().take(TEXT_IMPROVEMENTS) {
                let _ = writeln!(out, "  - {imp}");
            }
        }

        if !s.new_training_phrases.is_empty() {
            let _ = writeln!(out, "- new training phrases:");
            for (intent, phrases) in s.new_training_phrases.iter().take(TEXT_PHRASE_INTENTS) {
                let shown: Vec<&str> = phrases.iter().take(TEXT_PHRASES).map(String::as_str).collect();
                let more = if phrases.len() > TEXT_PHRASES { ", ..." } else { "" };
                let _ = writeln!(out, "  - {intent}: {}{more}", shown.join(" | "));
            }
        }
    }

    let _ = writeln!(out, "\nBy intent (flow|intent)");
    for (key, s) in &agg.by_intent {
        let _ = writeln!(out, "- {key}: {} cases", s.case_count);
    }
    out
}
