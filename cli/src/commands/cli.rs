use clap::{Args as ClapArgs, Parser, Subcommand};
use nomatch_core::api::{AppConfig, JudgeProvider, OutputFormat};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Jsonl,
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Jsonl => OutputFormat::Jsonl,
            FormatArg::Text => OutputFormat::Text,
        }
    }
}

/// Summary output for `aggregate`; the summary is a single document, so
/// there is no line-delimited form.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormat {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "nomatch", version, about = "Explain why a dialogue agent answered NO_MATCH")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file; defaults to ~/.nomatch/config.toml, then ./config.toml.
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Conversation turns (.csv, or .jsonl with one turn per line).
    #[arg(long)]
    pub turns: String,

    /// Training phrases CSV with `intent`, `phrase` and optional `language`.
    #[arg(long)]
    pub training: String,

    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Skip the judge; every case gets the top retrieval candidate.
    #[arg(long, default_value_t = false)]
    pub no_judge: bool,

    #[arg(long)]
    pub judge_url: Option<String>,

    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Write `analysis.jsonl`, `summary.json` and `run.json` here instead of
    /// printing rows.
    #[arg(long)]
    pub out_dir: Option<String>,

    #[arg(long, default_value_t = false)]
    pub no_aggregate: bool,

    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl AnalyzeArgs {
    /// Flags win over file and environment values.
    pub fn apply_overrides(&self, cfg: &mut AppConfig) {
        if let Some(n) = self.max_workers {
            cfg.analysis.max_workers = Some(n);
        }
        if self.no_judge {
            cfg.judge.enabled = false;
        }
        if let Some(url) = self.judge_url.as_deref().filter(|u| !u.trim().is_empty()) {
            let JudgeProvider::Chat(ref mut chat) = cfg.judge.provider;
            chat.base_url = url.to_string();
        }
        if let Some(f) = self.format {
            cfg.output.format = f.into();
        }
        if self.no_aggregate {
            cfg.output.aggregate = false;
        }
        if self.no_progress {
            cfg.output.progress = false;
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AggregateArgs {
    /// `analysis.jsonl` produced by `analyze --out-dir`.
    #[arg(long)]
    pub input: String,

    /// Write the summary JSON here instead of stdout.
    #[arg(long)]
    pub out: Option<String>,

    #[arg(long, value_enum, default_value_t = SummaryFormat::Json)]
    pub format: SummaryFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze every NO_MATCH case in a conversation log.
    Analyze(AnalyzeArgs),
    /// Rebuild the flow/intent summary from saved rows.
    Aggregate(AggregateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_flags_override_config() {
        let args = Args::parse_from([
            "nomatch",
            "analyze",
            "--turns",
            "t.csv",
            "--training",
            "p.csv",
            "--max-workers",
            "3",
            "--no-judge",
            "--judge-url",
            "http://judge:9000",
            "--format",
            "jsonl",
            "--no-aggregate",
        ]);
        let Commands::Analyze(a) = args.command else {
            panic!("expected analyze");
        };

        let mut cfg = AppConfig::default();
        a.apply_overrides(&mut cfg);
        assert_eq!(cfg.analysis.max_workers, Some(3));
        assert!(!cfg.judge.enabled);
        let JudgeProvider::Chat(chat) = &cfg.judge.provider;
        assert_eq!(chat.base_url, "http://judge:9000");
        assert_eq!(cfg.output.format, OutputFormat::Jsonl);
        assert!(!cfg.output.aggregate);
        assert!(cfg.output.progress);
    }

    #[test]
    fn config_flag_is_global() {
        let args = Args::parse_from([
            "nomatch",
            "aggregate",
            "--input",
            "out/analysis.jsonl",
            "--config",
            "custom.toml",
        ]);
        assert_eq!(args.config.as_deref(), Some("custom.toml"));
        assert!(matches!(args.command, Commands::Aggregate(_)));
    }

    #[test]
    fn aggregate_rejects_line_delimited_format() {
        let res = Args::try_parse_from([
            "nomatch",
            "aggregate",
            "--input",
            "analysis.jsonl",
            "--format",
            "jsonl",
        ]);
        assert!(res.is_err());

        let args = Args::parse_from([
            "nomatch",
            "aggregate",
            "--input",
            "analysis.jsonl",
            "--format",
            "text",
        ]);
        let Commands::Aggregate(a) = args.command else {
            panic!("expected aggregate");
        };
        assert_eq!(a.format, SummaryFormat::Text);
    }
}
