pub mod api;
pub mod cases;
pub mod config;
pub mod context;
pub mod error;
pub mod flow_context;
pub mod judge;
pub mod pipeline;
pub mod report;
pub mod retrieval;
pub mod signals;
pub mod training;
pub mod turns;
pub mod util;
pub mod validate;
