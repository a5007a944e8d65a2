//! nomatch-cli library: exposes modules for unit tests and the binary.

pub mod commands;
pub mod io;
