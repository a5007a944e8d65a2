use std::path::{Path, PathBuf};

use super::types::{AppConfig, JudgeProvider};

/// Get the default nomatch data directory: ~/.nomatch
pub fn get_nomatch_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".nomatch"))
}

/// Load configuration from an explicit file, failing if it cannot be read.
pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read config {}: {e}", path.display()))?;
    let mut cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("parse config {}: {e}", path.display()))?;
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.nomatch/config.toml
    let user_config = get_nomatch_data_dir().ok().map(|d| d.join("config.toml"));

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg: AppConfig = match user_config {
        Some(p) if p.exists() => {
            let s = std::fs::read_to_string(&p)?;
            toml::from_str::<AppConfig>(&s)?
        }
        _ if local_config.exists() => {
            let s = std::fs::read_to_string(local_config)?;
            toml::from_str::<AppConfig>(&s)?
        }
        _ => AppConfig::default(),
    };

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Environment variables win over file values.
pub fn apply_env_overrides(cfg: &mut AppConfig) {
    let JudgeProvider::Chat(ref mut chat) = cfg.judge.provider;

    if let Some(v) = non_empty_env("NOMATCH_JUDGE_URL") {
        chat.base_url = v;
    }
    if let Some(v) = non_empty_env("NOMATCH_JUDGE_API_KEY") {
        chat.api_key = v;
    }
    if let Some(v) = non_empty_env("NOMATCH_JUDGE_MODEL") {
        chat.model = v;
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
