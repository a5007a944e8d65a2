use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a NO_MATCH happened, as classified by the judge.
///
/// Unknown labels are preserved verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Decision {
    MissedExistingIntentInFlow,
    NewIntentInFlow,
    MissingParameterHandler,
    FlowSwitch,
    OutOfScope,
    #[default]
    Ambiguous,
    Other(String),
}

impl Decision {
    pub const KNOWN: [Decision; 6] = [
        Decision::MissedExistingIntentInFlow,
        Decision::NewIntentInFlow,
        Decision::MissingParameterHandler,
        Decision::FlowSwitch,
        Decision::OutOfScope,
        Decision::Ambiguous,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Decision::MissedExistingIntentInFlow => "MISSED_EXISTING_INTENT_IN_FLOW",
            Decision::NewIntentInFlow => "NEW_INTENT_IN_FLOW",
            Decision::MissingParameterHandler => "MISSING_PARAMETER_HANDLER",
            Decision::FlowSwitch => "FLOW_SWITCH",
            Decision::OutOfScope => "OUT_OF_SCOPE",
            Decision::Ambiguous => "AMBIGUOUS",
            Decision::Other(s) => s.as_str(),
        }
    }

    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        Self::KNOWN
            .iter()
            .find(|d| d.as_str() == label)
            .cloned()
            .unwrap_or_else(|| Decision::Other(label.to_string()))
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.as_str().contains(needle)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Decision {
    fn from(s: String) -> Self {
        Decision::parse(&s)
    }
}

impl From<Decision> for String {
    fn from(d: Decision) -> Self {
        d.as_str().to_string()
    }
}

/// Classification and remediation for one case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JudgeResult {
    pub decision: Decision,
    #[serde(default)]
    pub flow_recommended: String,
    #[serde(default)]
    pub intent_recommended: Vec<String>,
    #[serde(default)]
    pub intents_relevantes: Vec<String>,
    #[serde(default)]
    pub why: String,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub new_training_phrases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub suggested_parameters: Vec<serde_json::Value>,
    #[serde(default)]
    pub suggested_contexts: Vec<serde_json::Value>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub review_flag: bool,
}

impl JudgeResult {
    pub fn intent_top(&self) -> &str {
        self.intent_recommended
            .first()
            .map(String::as_str)
            .unwrap_or("")
    }
}
