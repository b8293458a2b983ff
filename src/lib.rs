pub mod ai;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod correlate;
pub mod error;
pub mod git;
pub mod github;
pub mod narrative;
pub mod output;
pub mod pipeline;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;
