#[allow(clippy::module_inception)]
pub mod error;
pub mod input;
pub mod judge;
pub mod pipeline;

pub use error::CliError;
pub use input::InputError;
pub use judge::JudgeError;
pub use pipeline::PipelineError;
