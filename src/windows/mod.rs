//! Carrier windows for gene-based rare variant tests.

pub mod build;
pub mod builder;
pub mod classify;
pub mod input;
pub mod output;
