//! Error types for promptlab-stages

use thiserror::Error;

use crate::stage_traits::PipelineStage;

/// Errors raised by a generation stage.
///
/// The validation engine never interprets these; it passes them to its caller
/// unchanged, so the display text is the upstream message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// The stage backend answered with a non-success status
    #[error("{stage} stage rejected the request (status {status}): {message}")]
    Rejected {
        stage: PipelineStage,
        status: u16,
        message: String,
    },

    /// The request never produced a response
    #[error("{stage} stage transport error: {message}")]
    Transport {
        stage: PipelineStage,
        message: String,
    },

    /// The response body did not match the stage contract
    #[error("{stage} stage returned an invalid response: {message}")]
    InvalidResponse {
        stage: PipelineStage,
        message: String,
    },

    /// Failure injected by a fake implementation
    #[error("{0}")]
    Scripted(String),
}

impl StageError {
    /// The stage that failed, when known.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            StageError::Rejected { stage, .. }
            | StageError::Transport { stage, .. }
            | StageError::InvalidResponse { stage, .. } => Some(*stage),
            StageError::Scripted(_) => None,
        }
    }
}
