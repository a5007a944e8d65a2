use thiserror::Error;

use super::input::InputError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("preprocessing worker failed: {0}")]
    Join(String),
}
