use thiserror::Error;

use super::input::InputError;
use super::pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("pipeline failed: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit code for this failure.
    ///
    /// 11 config, 12 fatal input, 20 io, 50 internal.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 11,
            CliError::Input(_) => 12,
            CliError::Pipeline(pe) => match pe {
                PipelineError::Input(_) => 12,
                PipelineError::Join(_) => 50,
            },
            CliError::Io(_) => 20,
            CliError::Command(_) => 20,
            CliError::Anyhow(_) => 50,
        }
    }
}
