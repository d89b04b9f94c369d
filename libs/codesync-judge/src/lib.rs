//! Submission evaluation pipeline.
//!
//! Candidate source is wrapped in a self-contained harness (`harness`),
//! executed on a remote oracle (`engine`), and the oracle's raw output is
//! turned into per-case verdicts or a single top-level error (`evaluator`).
//! `executor` glues the stages together behind [`Judge`].

pub mod catalogue;
pub mod config;
pub mod engine;
pub mod evaluator;
pub mod executor;
pub mod harness;
pub mod resolver;


pub use executor::Judge;
