use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub judge: JudgeConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "nomatch_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Tunables consumed by the case-analysis pipeline.
///
/// Every component receives the values it needs from this object at
/// construction; nothing reads process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Upper bound on turns scanned when building a context window.
    #[serde(default = "default_max_context_messages")]
    pub max_context_messages: usize,

    /// Number of intent candidates kept per case.
    #[serde(default = "default_top_intents")]
    pub top_intents: usize,

    /// Evidence phrases attached to each candidate.
    #[serde(default = "default_evidence_per_intent")]
    pub evidence_per_intent: usize,

    /// Similarity at or above which evidence counts as a strong match.
    #[serde(default = "default_strong_match")]
    pub strong_match: f64,

    /// Similarity below which the best evidence counts as a weak match.
    #[serde(default = "default_weak_match")]
    pub weak_match: f64,

    /// Worker pool size for per-case preprocessing. `None` derives it from
    /// the available parallelism.
    #[serde(default)]
    pub max_workers: Option<usize>,

    /// Flows that neither establish nor break topical continuity.
    #[serde(default = "default_neutral_flows")]
    pub neutral_flows: BTreeSet<String>,
}

pub const MAX_WORKERS_CAP: usize = 8;

fn default_max_context_messages() -> usize {
    12
}

fn default_top_intents() -> usize {
    10
}

fn default_evidence_per_intent() -> usize {
    6
}

fn default_strong_match() -> f64 {
    0.72
}

fn default_weak_match() -> f64 {
    0.55
}

pub fn default_neutral_flows() -> BTreeSet<String> {
    ["CHIT", "GENERIC", "SALUDO", "DERIVACION", "AGENTE", "NO_MATCH"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// `max(cpus - 1, 1)`, capped at [`MAX_WORKERS_CAP`].
pub fn default_worker_count() -> usize {
    num_cpus::get()
        .saturating_sub(1)
        .max(1)
        .min(MAX_WORKERS_CAP)
}

impl AnalysisConfig {
    pub fn worker_count(&self) -> usize {
        match self.max_workers {
            Some(n) => n.clamp(1, MAX_WORKERS_CAP),
            None => default_worker_count(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_context_messages: default_max_context_messages(),
            top_intents: default_top_intents(),
            evidence_per_intent: default_evidence_per_intent(),
            strong_match: default_strong_match(),
            weak_match: default_weak_match(),
            max_workers: None,
            neutral_flows: default_neutral_flows(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawJudgeConfig")]
pub struct JudgeConfig {
    pub enabled: bool,

    #[serde(flatten)]
    pub provider: JudgeProvider,
}

/// Tag of the `provider` key; absent means `chat`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
enum ProviderTag {
    #[default]
    #[serde(rename = "chat")]
    Chat,
}

/// On-disk shape of `[judge]`: every key optional, provider settings inline.
#[derive(Deserialize)]
struct RawJudgeConfig {
    #[serde(default = "default_judge_enabled")]
    enabled: bool,
    #[serde(default)]
    provider: ProviderTag,
    #[serde(flatten)]
    settings: ChatJudgeConfig,
}

impl From<RawJudgeConfig> for JudgeConfig {
    fn from(raw: RawJudgeConfig) -> Self {
        let provider = match raw.provider {
            ProviderTag::Chat => JudgeProvider::Chat(raw.settings),
        };
        Self {
            enabled: raw.enabled,
            provider,
        }
    }
}

fn default_judge_enabled() -> bool {
    true
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            enabled: default_judge_enabled(),
            provider: JudgeProvider::Chat(ChatJudgeConfig::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum JudgeProvider {
    /// OpenAI-compatible `/v1/chat/completions` endpoint (llama.cpp server,
    /// ollama, vLLM, ...).
    #[serde(rename = "chat")]
    Chat(ChatJudgeConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatJudgeConfig {
    #[serde(default = "default_judge_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_judge_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_judge_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_judge_model() -> String {
    "local".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_top_p() -> f32 {
    0.9
}

fn default_max_tokens() -> u32 {
    800
}

fn default_seed() -> u64 {
    42
}

fn default_timeout_ms() -> u64 {
    120_000
}

impl Default for ChatJudgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_judge_url(),
            api_key: String::new(),
            model: default_judge_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            seed: default_seed(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Jsonl,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_format")]
    pub format: OutputFormat,

    /// Build the flow/intent summary after the per-case pass.
    #[serde(default = "default_aggregate")]
    pub aggregate: bool,

    /// Show a progress bar while the judge stage runs.
    #[serde(default = "default_progress")]
    pub progress: bool,
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Json
}

fn default_aggregate() -> bool {
    true
}

fn default_progress() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            aggregate: default_aggregate(),
            progress: default_progress(),
        }
    }
}
