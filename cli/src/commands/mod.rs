pub mod aggregate;
pub mod analyze;
pub mod cli;
