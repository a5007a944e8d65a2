mod aggregate;
mod format;
mod row;

pub use aggregate::{
    aggregate, AggregatedReport, FlowSummary, IntentSummary, FLOW_TRIGGER_SAMPLES,
    INTENT_TRIGGER_SAMPLES, NO_INTENT,
};
pub use format::{format_aggregate_text, format_text, rows_to_json, rows_to_jsonl};
pub use row::{ReportRow, TOP_EVIDENCE};
