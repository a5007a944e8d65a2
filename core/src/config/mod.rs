mod load;
mod types;

pub use load::{apply_env_overrides, get_nomatch_data_dir, load_default, load_from_path};
pub use types::{
    default_neutral_flows, default_worker_count, AnalysisConfig, AppConfig, ChatJudgeConfig,
    JudgeConfig, JudgeProvider, LoggingConfig, OutputConfig, OutputFormat, MAX_WORKERS_CAP,
};
