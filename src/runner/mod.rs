//! The iterative loop runner and its configuration and result types.

pub mod config;
pub mod loop_runner;
pub mod result;

pub use config::LoopConfig;
pub use loop_runner::LoopRunner;
pub use result::{FinalStatus, LoopResult};
