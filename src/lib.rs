pub mod analyzer;
pub mod cli;
pub mod client;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod gapfill;
pub mod pipeline;
pub mod retry;
