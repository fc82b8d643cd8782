//! JSON-over-HTTP client for a hosted stage backend.
//!
//! Each stage is a `POST` to `{base_url}/{endpoint}` with a camelCase JSON
//! body. Responses must decode into the matching output type.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::StageError;
use crate::stage_traits::*;

/// Connection settings for [`HttpStages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStagesConfig {
    /// Base URL, e.g. `http://127.0.0.1:8787/api`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpStagesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787/api".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeRequest<'a> {
    industry: &'a str,
    files: &'a [StageFile],
    params: &'a StageParams,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionsRequest<'a> {
    industry: &'a str,
    summary: &'a str,
    combined_text: &'a str,
    params: &'a StageParams,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OptimizeRequest<'a> {
    industry: &'a str,
    summary: &'a str,
    file_texts: &'a [String],
    customizations: &'a [String],
    params: &'a StageParams,
}

/// [`GenerationStages`] backed by a hosted HTTP service.
#[derive(Debug, Clone)]
pub struct HttpStages {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStages {
    pub fn new(config: HttpStagesConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    /// Full URL for a stage.
    pub fn endpoint(&self, stage: PipelineStage) -> String {
        let path = match stage {
            PipelineStage::Summarize => "summarize",
            PipelineStage::Suggest => "suggestions",
            PipelineStage::Optimize => "optimize",
        };
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post<B, R>(&self, stage: PipelineStage, body: &B) -> StageResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(stage);
        debug!(stage = %stage, url = %url, "calling stage backend");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| StageError::Transport {
                stage,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StageError::Rejected {
                stage,
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| StageError::InvalidResponse {
                stage,
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl GenerationStages for HttpStages {
    async fn summarize(
        &self,
        industry: &str,
        files: &[StageFile],
        params: &StageParams,
    ) -> StageResult<SummaryOutput> {
        let body = SummarizeRequest {
            industry,
            files,
            params,
        };
        self.post(PipelineStage::Summarize, &body).await
    }

    async fn generate_suggestions(
        &self,
        industry: &str,
        summary: &str,
        combined_text: &str,
        params: &StageParams,
    ) -> StageResult<SuggestionsOutput> {
        let body = SuggestionsRequest {
            industry,
            summary,
            combined_text,
            params,
        };
        self.post(PipelineStage::Suggest, &body).await
    }

    async fn generate_optimized_prompt(
        &self,
        industry: &str,
        summary: &str,
        file_texts: &[String],
        customizations: &[String],
        params: &StageParams,
    ) -> StageResult<OptimizedPromptOutput> {
        let body = OptimizeRequest {
            industry,
            summary,
            file_texts,
            customizations,
            params,
        };
        self.post(PipelineStage::Optimize, &body).await
    }
}
