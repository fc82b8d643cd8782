//! Promptlab Stages: the generation-stage contract
//!
//! The prompt optimization pipeline is built from three hosted generation
//! calls. This crate defines their contract and ships the implementations the
//! rest of the workspace plugs in.
//!
//! ## Key Components
//!
//! - `GenerationStages`: async trait for summarize / suggest / optimize
//! - `HttpStages`: JSON-over-HTTP client for a hosted stage backend
//! - `fakes`: deterministic in-memory implementations for tests

mod error;
pub mod fakes;
pub mod http;
pub mod stage_traits;

pub use error::StageError;
pub use http::{HttpStages, HttpStagesConfig};
pub use stage_traits::{
    GenerationStages, OptimizedPromptOutput, PipelineStage, StageFile, StageParams, StageResult,
    SuggestionsOutput, SummaryOutput,
};
