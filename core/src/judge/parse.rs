use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::types::{Decision, JudgeResult};
use crate::error::JudgeError;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

static JSON_OBJECT_REGEX: OnceLock<Regex> = OnceLock::new();
static FENCE_OPEN_REGEX: OnceLock<Regex> = OnceLock::new();
static FENCE_CLOSE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Strips code fences and returns the outermost `{...}` span.
pub fn extract_json_object(text: &str) -> Result<&str, JudgeError> {
    let mut text = text.trim();
    if text.starts_with("```") {
        let open = FENCE_OPEN_REGEX
            .get_or_init(|| Regex::new(r"^```[a-zA-Z]*\s*").expect("FENCE_OPEN_REGEX is valid"));
        let close = FENCE_CLOSE_REGEX
            .get_or_init(|| Regex::new(r"\s*```$").expect("FENCE_CLOSE_REGEX is valid"));
        if let Some(m) = open.find(text) {
            text = &text[m.end()..];
        }
        if let Some(m) = close.find(text) {
            text = &text[..m.start()];
        }
        text = text.trim();
    }

    let re = JSON_OBJECT_REGEX
        .get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("JSON_OBJECT_REGEX is valid"));
    re.find(text)
        .map(|m| m.as_str())
        .ok_or_else(|| JudgeError::Malformed("no JSON object found in model output".to_string()))
}

/// Lenient decoding of a judge answer into a [`JudgeResult`].
///
/// Missing fields default; confidence defaults to 0.5 and is clamped to
/// `[0, 1]`. `review_flag` is always false here.
pub fn parse_judge_output(text: &str) -> Result<JudgeResult, JudgeError> {
    let raw = extract_json_object(text)?;
    let value: Value =
        serde_json::from_str(raw).map_err(|e| JudgeError::Malformed(e.to_string()))?;
    let Value::Object(obj) = value else {
        return Err(JudgeError::Malformed("top-level JSON is not an object".to_string()));
    };
    Ok(from_object(&obj))
}

fn from_object(obj: &Map<String, Value>) -> JudgeResult {
    let decision = obj
        .get("decision")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Decision::parse)
        .unwrap_or_default();

    let dialogflow = obj.get("suggested_dialogflow").and_then(Value::as_object);
    let suggested = |nested: &str, flat: &str| -> Vec<Value> {
        dialogflow
            .and_then(|d| d.get(nested))
            .or_else(|| obj.get(flat))
            .map(value_list)
            .unwrap_or_default()
    };

    JudgeResult {
        decision,
        flow_recommended: obj
            .get("flow_recommended")
            .map(text_of)
            .unwrap_or_default(),
        intent_recommended: obj
            .get("intent_recommended")
            .map(intent_list)
            .unwrap_or_default(),
        intents_relevantes: obj
            .get("intents_relevantes")
            .map(intent_list)
            .unwrap_or_default(),
        why: obj.get("why").map(text_of).unwrap_or_default(),
        improvements: obj
            .get("improvements")
            .map(string_list)
            .unwrap_or_default(),
        new_training_phrases: obj
            .get("new_training_phrases")
            .map(phrase_map)
            .unwrap_or_default(),
        suggested_parameters: suggested("parameters", "suggested_parameters"),
        suggested_contexts: suggested("contexts", "suggested_contexts"),
        confidence: obj
            .get("confidence")
            .and_then(number_of)
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0),
        review_flag: false,
    }
}

fn text_of(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn number_of(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn value_list(v: &Value) -> Vec<Value> {
    match v {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn string_list(v: &Value) -> Vec<String> {
    value_list(v)
        .iter()
        .map(text_of)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Entries may be plain names or objects carrying an `intent` field.
fn intent_list(v: &Value) -> Vec<String> {
    value_list(v)
        .iter()
        .filter_map(|item| match item {
            Value::Object(o) => o.get("intent").map(text_of),
            other => Some(text_of(other)),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn phrase_map(v: &Value) -> BTreeMap<String, Vec<String>> {
    let Some(obj) = v.as_object() else {
        return BTreeMap::new();
    };
    obj.iter()
        .map(|(intent, phrases)| (intent.clone(), string_list(phrases)))
        .filter(|(_, phrases)| !phrases.is_empty())
        .collect()
}
