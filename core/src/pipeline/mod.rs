mod engine;
mod prepare;
mod progress;
mod scheduler;

pub use engine::{
    judge_payloads, prepare_payloads, resolve_outcome, run_analysis, AnalysisInput, AnalysisRun,
    JudgeMode, RunStats,
};
pub use prepare::CasePreparer;
pub use progress::JudgeProgress;
pub use scheduler::parallel_map_ordered;
