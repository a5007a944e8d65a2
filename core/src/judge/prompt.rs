use serde_json::json;

use super::payload::CasePayload;

pub const SYSTEM_JSON_ONLY: &str = "You are an NLU analyst for a Dialogflow agent. \
Reply with ONE valid JSON object only (no markdown, no extra text). \
If information is missing, still return the JSON with decision='AMBIGUOUS' and a low confidence.";

fn schema_hint() -> serde_json::Value {
    json!({
        "decision": "MISSED_EXISTING_INTENT_IN_FLOW | NEW_INTENT_IN_FLOW | MISSING_PARAMETER_HANDLER | FLOW_SWITCH | OUT_OF_SCOPE | AMBIGUOUS",
        "flow_recommended": "string",
        "intent_recommended": ["string"],
        "intents_relevantes": [],
        "why": "string",
        "improvements": [],
        "new_training_phrases": {},
        "suggested_dialogflow": {"parameters": [], "contexts": []},
        "confidence": 0.0
    })
}

/// User prompt for one case: task, decision rules, schema and the payload.
pub fn build_judge_prompt(payload: &CasePayload) -> String {
    let input = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Task: classify the NO_MATCH and recommend actions in Dialogflow.\n\
Rules:\n\
- Pick exactly ONE decision from the enum.\n\
- If the user text looks like a VALUE (month, currency, additional card, minor, etc.) inside an active flow, prefer MISSING_PARAMETER_HANDLER.\n\
- If an existing intent is very similar (evidence with high similarity), prefer MISSED_EXISTING_INTENT_IN_FLOW.\n\
- If no intent exists and the text belongs to the flow's domain, NEW_INTENT_IN_FLOW.\n\
- If the text is out of domain, OUT_OF_SCOPE.\n\n\
Output: strict JSON with this shape (schema example, do NOT invent fields):\n\
{schema}\n\n\
INPUT:\n\
{input}",
        schema = schema_hint(),
    )
}

/// Second-chance prompt asking to reformat a malformed answer verbatim.
pub fn build_repair_prompt(previous_output: &str) -> String {
    format!(
        "Your output was not valid JSON. Convert EXACTLY the following content into valid JSON, \
without adding or removing meaning. Reply with JSON ONLY:\n{previous_output}"
    )
}
