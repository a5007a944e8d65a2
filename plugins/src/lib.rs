pub mod factory;
pub mod judge;

pub use factory::{build_judge, PluginJudgeFactory};
