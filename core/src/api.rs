//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `nomatch_core::api` instead of reaching into internal modules.

pub use crate::cases::{extract_cases, Case};
pub use crate::config::{
    apply_env_overrides, get_nomatch_data_dir, load_default, load_from_path, AnalysisConfig,
    AppConfig, ChatJudgeConfig, JudgeConfig, JudgeProvider, LoggingConfig, OutputConfig,
    OutputFormat,
};
pub use crate::context::{AppContext, JudgeFactory};
pub use crate::error::{CliError, InputError, JudgeError, PipelineError};
pub use crate::flow_context::{ContextEntry, FlowContextResolver, FlowRef};
pub use crate::judge::{
    build_judge_prompt, build_repair_prompt, parse_judge_output, CasePayload, Decision,
    JudgeOutcome, JudgePlugin, JudgeResult, SYSTEM_JSON_ONLY,
};
pub use crate::pipeline::{run_analysis, AnalysisInput, AnalysisRun, JudgeMode, RunStats};
pub use crate::report::{
    aggregate, format_aggregate_text, format_text, rows_to_json, rows_to_jsonl, AggregatedReport,
    ReportRow,
};
pub use crate::retrieval::{retrieve, CandidateIntent, Evidence, Retriever, TrainingIndex};
pub use crate::signals::{detect_slot_signals, SlotSignal};
pub use crate::training::{TrainingCatalog, TrainingPhrase, TrainingRecord};
pub use crate::turns::{flow_from_intent, normalize_text, Speaker, Turn, TurnTable};
pub use crate::validate::PostValidator;
