//! Core domain models for stagehand
//!
//! This module defines the fundamental data structures that represent
//! pipelines, stages, jobs, and their configuration.

pub mod condition;
pub mod config;
pub mod context;
pub mod job;
pub mod pipeline;
pub mod state;

pub use context::*;
pub use job::*;
pub use pipeline::*;
pub use state::*;
