//! # Integration Tests
//!
//! Bootstrap and pipeline flows that cross crate boundaries.

pub mod bootstrap;
pub mod pipeline;
pub mod scenarios;
