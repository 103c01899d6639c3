//! Public façade for the engine layer.

pub mod orchestrator;
pub mod types;

pub use orchestrator::{Playground, ABANDONED_ANALYSIS};
pub use types::PendingAnalysis;

#[cfg(test)]
mod tests;
