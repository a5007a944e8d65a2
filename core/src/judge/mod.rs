pub mod r#trait;

mod outcome;
mod parse;
mod payload;
mod prompt;
mod types;

pub use r#trait::JudgePlugin;

pub use outcome::{
    failed_judge_result, no_judge_result, JudgeOutcome, NO_JUDGE_CONFIDENCE, NO_JUDGE_NOTE,
};
pub use parse::{extract_json_object, parse_judge_output, DEFAULT_CONFIDENCE};
pub use payload::CasePayload;
pub use prompt::{build_judge_prompt, build_repair_prompt, SYSTEM_JSON_ONLY};
pub use types::{Decision, JudgeResult};
