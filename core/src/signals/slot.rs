use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parameter-like value detected in a user utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotSignal {
    MonthPeriod,
    Currency,
    CardType,
    RelationMinor,
    AmountQuery,
}

impl SlotSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotSignal::MonthPeriod => "MONTH_PERIOD",
            SlotSignal::Currency => "CURRENCY",
            SlotSignal::CardType => "CARD_TYPE",
            SlotSignal::RelationMinor => "RELATION_MINOR",
            SlotSignal::AmountQuery => "AMOUNT_QUERY",
        }
    }
}

impl fmt::Display for SlotSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct SlotRule {
    pub signal: SlotSignal,
    pub patterns: Vec<Regex>,
}

const RULE_TABLE: &[(SlotSignal, &[&str])] = &[
    (
        SlotSignal::MonthPeriod,
        &[
            r"(?i)\b(enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|octubre|noviembre|diciembre)\b",
            r"(?i)\b(mes\s+pasado|mes\s+anterior|[uú]ltimo\s+mes|este\s+mes)\b",
        ],
    ),
    (SlotSignal::Currency, &[r"(?i)\b(usd|u\$s|d[oó]lar(?:es)?)\b"]),
    (
        SlotSignal::CardType,
        &[r"(?i)\b(adicional|titular|suplementaria)\b"],
    ),
    (
        SlotSignal::RelationMinor,
        &[r"(?i)\b(hijo|hija|menor|menor\s+de\s+edad|tutor)\b"],
    ),
    (
        SlotSignal::AmountQuery,
        &[r"(?i)\b(cu[aá]nto|monto|m[aá]ximo|hasta)\b"],
    ),
];

static SLOT_RULES: OnceLock<Vec<SlotRule>> = OnceLock::new();

/// Compiled rule table, in evaluation order.
pub fn slot_rules() -> &'static [SlotRule] {
    SLOT_RULES.get_or_init(|| {
        RULE_TABLE
            .iter()
            .map(|(signal, patterns)| SlotRule {
                signal: *signal,
                patterns: patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("slot pattern is valid"))
                    .collect(),
            })
            .collect()
    })
}

/// Tags whose pattern group matches `text`, once each, in table order.
pub fn detect_slot_signals(text: &str) -> Vec<SlotSignal> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    slot_rules()
        .iter()
        .filter(|rule| rule.patterns.iter().any(|re| re.is_match(text)))
        .map(|rule| rule.signal)
        .collect()
}
