//! Builds judge plugins from configuration for the CLI and the context layer.
use async_trait::async_trait;
use nomatch_core::api::{JudgeConfig, JudgeError, JudgeFactory, JudgePlugin, JudgeProvider};

use crate::judge::ChatJudgePlugin;

pub fn build_judge(cfg: &JudgeConfig) -> anyhow::Result<Box<dyn JudgePlugin>> {
    match &cfg.provider {
        JudgeProvider::Chat(chat_cfg) => Ok(Box::new(ChatJudgePlugin::new(chat_cfg)?)),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PluginJudgeFactory;

#[async_trait]
impl JudgeFactory for PluginJudgeFactory {
    async fn build_judge(&self, cfg: &JudgeConfig) -> Result<Box<dyn JudgePlugin>, JudgeError> {
        build_judge(cfg).map_err(|e| JudgeError::Unavailable(format!("{e:#}")))
    }
}
