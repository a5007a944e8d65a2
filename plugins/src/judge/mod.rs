pub mod chat;
pub mod http_client;

pub use chat::ChatJudgePlugin;
pub use http_client::{ChatClient, ChatHttpError, ChatHttpErrorKind, Sampling};
