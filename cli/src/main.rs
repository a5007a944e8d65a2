use clap::Parser;
use nomatch_cli::commands::{aggregate, analyze, cli};
use nomatch_cli::io::expand_path;
use nomatch_core::api::{self as core_api, AppContext, CliError};
use nomatch_plugins::PluginJudgeFactory;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut cfg = match args.config.as_deref() {
        Some(p) => core_api::load_from_path(&expand_path(p)),
        None => core_api::load_default(),
    }
    .map_err(|e| CliError::Config(format!("{e:#}")))?;

    if let cli::Commands::Analyze(a) = &args.command {
        a.apply_overrides(&mut cfg);
    }
    if !atty::is(atty::Stream::Stderr) {
        cfg.output.progress = false;
    }
    init_tracing(&cfg.logging).map_err(CliError::Command)?;

    let ctx = AppContext::new(cfg, Some(Arc::new(PluginJudgeFactory)));
    tracing::debug!(
        target: "nomatch.cli",
        stage = "cli.start",
        run_id = %ctx.run_id(),
        version = env!("CARGO_PKG_VERSION")
    );

    dispatch(args.command, ctx).await
}

async fn dispatch(cmd: cli::Commands, ctx: AppContext) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::Analyze(a) => analyze::run_analyze(a, &ctx).await,
        cli::Commands::Aggregate(a) => aggregate::run_aggregate(a),
    }
}

fn init_tracing(logging: &core_api::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => expand_path(d),
            None => std::env::temp_dir().join("nomatch"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("nomatch.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
