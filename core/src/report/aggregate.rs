use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::row::ReportRow;
use crate::flow_context::UNKNOWN_FLOW;

pub const FLOW_TRIGGER_SAMPLES: usize = 50;
pub const INTENT_TRIGGER_SAMPLES: usize = 30;
pub const NO_INTENT: &str = "NO_INTENT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub case_count: usize,
    pub decisions: Vec<String>,
    pub decision_counts: BTreeMap<String, usize>,
    pub trigger_samples: Vec<String>,
    pub intent_top_counts: BTreeMap<String, usize>,
    pub improvements: Vec<String>,
    pub new_training_phrases: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentSummary {
    pub flow: String,
    pub intent: String,
    pub case_count: usize,
    pub decisions: Vec<String>,
    pub decision_counts: BTreeMap<String, usize>,
    pub trigger_samples: Vec<String>,
    pub improvements: Vec<String>,
}

/// Flow-level and intent-within-flow summaries of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedReport {
    pub total_cases: usize,
    pub by_flow: BTreeMap<String, FlowSummary>,
    /// Keyed `"{flow}|{intent}"`.
    pub by_intent: BTreeMap<String, IntentSummary>,
}

fn flow_key(row: &ReportRow) -> String {
    match row.flow_ref.trim() {
        "" => UNKNOWN_FLOW.to_string(),
        f => f.to_string(),
    }
}

fn intent_key(row: &ReportRow) -> String {
    match row.intent_top.trim() {
        "" => NO_INTENT.to_string(),
        i => i.to_string(),
    }
}

/// Keeps the first occurrence of every value, in order.
fn first_seen<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

fn decisions_of(group: &[&ReportRow]) -> Vec<String> {
    group
        .iter()
        .map(|r| r.decision.as_str().trim().to_string())
        .filter(|d| !d.is_empty())
        .collect()
}

fn count_values(items: &[String]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item.clone()).or_insert(0) += 1;
    }
    counts
}

fn trigger_samples(group: &[&ReportRow], cap: usize) -> Vec<String> {
    let mut samples = first_seen(
        group
            .iter()
            .map(|r| r.trigger_text.trim().to_string())
            .filter(|t| !t.is_empty()),
    );
    samples.truncate(cap);
    samples
}

fn improvements_of(group: &[&ReportRow]) -> Vec<String> {
    first_seen(group.iter().flat_map(|r| r.improvements.iter().cloned()))
}

fn summarize_flow(group: &[&ReportRow]) -> FlowSummary {
    let decisions = decisions_of(group);

    let mut intent_top_counts = BTreeMap::new();
    for r in group {
        let it = r.intent_top.trim();
        if !it.is_empty() {
            *intent_top_counts.entry(it.to_string()).or_insert(0) += 1;
        }
    }

    let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for r in group {
        for (intent, phrases) in &r.new_training_phrases {
            merged
                .entry(intent.clone())
                .or_default()
                .extend(phrases.iter().cloned());
        }
    }
    let new_training_phrases = merged
        .into_iter()
        .map(|(intent, phrases)| (intent, first_seen(phrases)))
        .collect();

    FlowSummary {
        case_count: group.len(),
        decision_counts: count_values(&decisions),
        decisions,
        trigger_samples: trigger_samples(group, FLOW_TRIGGER_SAMPLES),
        intent_top_counts,
        improvements: improvements_of(group),
        new_training_phrases,
    }
}

fn summarize_intent(flow: String, intent: String, group: &[&ReportRow]) -> IntentSummary {
    let decisions = decisions_of(group);
    IntentSummary {
        flow,
        intent,
        case_count: group.len(),
        decision_counts: count_values(&decisions),
        decisions,
        trigger_samples: trigger_samples(group, INTENT_TRIGGER_SAMPLES),
        improvements: improvements_of(group),
    }
}

/// Second pass over finished rows.
pub fn aggregate(rows: &[ReportRow]) -> AggregatedReport {
    let mut flows: BTreeMap<String, Vec<&ReportRow>> = BTreeMap::new();
    let mut intents: BTreeMap<(String, String), Vec<&ReportRow>> = BTreeMap::new();

    for r in rows {
        let flow = flow_key(r);
        intents
            .entry((flow.clone(), intent_key(r)))
            .or_default()
            .push(r);
        flows.entry(flow).or_default().push(r);
    }

    let by_flow = flows
        .into_iter()
        .map(|(flow, group)| {
            let summary = summarize_flow(&group);
            (flow, summary)
        })
        .collect();

    let by_intent = intents
        .into_iter()
        .map(|((flow, intent), group)| {
            let key = format!("{flow}|{intent}");
            (key, summarize_intent(flow, intent, &group))
        })
        .collect();

    AggregatedReport {
        total_cases: rows.len(),
        by_flow,
        by_intent,
    }
}
