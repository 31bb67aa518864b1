//! The catalog import pipeline: session registry and background worker.

pub mod store;
pub mod worker;
