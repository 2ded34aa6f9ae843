//! Summarisation: the LLM collaborator and the request-level facade.
//!
//! [`DocumentSummarizer`] is built once at startup. Each call runs
//!
//! ```text
//! size check ─▶ Resolver ─▶ SummaryRequest ─▶ Summarizer ─▶ clean_summary
//! ```
//!
//! under one deadline (`request_timeout_secs`). The Resolver and the
//! summariser never see each other's errors: a failed resolution returns
//! before any model call is made.
//!
//! ## Retry Strategy
//!
//! Only the model call is retried. HTTP 429 / 503 responses are transient
//! under load, so failed calls back off exponentially
//! (`retry_backoff_ms * 2^attempt`). A blank answer is not retried; it is
//! reported as [`DocSumError::SummarizationFailure`].

use crate::config::SummaryConfig;
use crate::error::DocSumError;
use crate::output::{ExtractionResult, SummaryOutput, SummaryRequest, SummaryResponse};
use crate::pipeline::input::{check_upload_size, InputSource};
use crate::pipeline::postprocess::clean_summary;
use crate::prompts::{default_system_prompt, summary_user_message};
use crate::resolve::Resolver;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Model used when only `GEMINI_API_KEY` is available.
pub const GEMINI_FALLBACK_MODEL: &str = "gemini-2.0-flash";

/// Turns a bounded document text into a summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, DocSumError>;
}

/// [`Summarizer`] backed by an `edgequake-llm` chat provider.
pub struct LlmSummarizer {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    temperature: f32,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &SummaryConfig) -> Self {
        Self {
            provider,
            system_prompt: system_prompt_for(config),
            temperature: config.temperature,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    /// Build the summariser from whichever provider `config` resolves to.
    pub fn from_config(config: &SummaryConfig) -> Result<Self, DocSumError> {
        Ok(Self::new(resolve_provider(config)?, config))
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, DocSumError> {
        let start = Instant::now();
        let messages = vec![
            ChatMessage::system(&self.system_prompt),
            ChatMessage::user(summary_user_message(&request.text)),
        ];
        let options = CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(request.max_output_tokens),
            ..Default::default()
        };

        let mut last_err: Option<String> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "Summary: retry {}/{} after {}ms",
                    attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match self.provider.chat(&messages, Some(&options)).await {
                Ok(response) => {
                    debug!(
                        "Summary: {} input tokens, {} output tokens, {:?}",
                        response.prompt_tokens,
                        response.completion_tokens,
                        start.elapsed()
                    );
                    if response.content.trim().is_empty() {
                        return Err(DocSumError::SummarizationFailure);
                    }
                    return Ok(response.content);
                }
                Err(e) => {
                    let err_msg = format!("{}", e);
                    warn!("Summary: attempt {} failed: {}", attempt + 1, err_msg);
                    last_err = Some(err_msg);
                }
            }
        }

        Err(DocSumError::LlmApiError {
            message: last_err.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}

/// The configured prompt override, or the default for the summary language.
pub fn system_prompt_for(config: &SummaryConfig) -> String {
    config
        .system_prompt
        .clone()
        .unwrap_or_else(|| default_system_prompt(&config.summary_language))
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, DocSumError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        DocSumError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model`; the
///    factory reads the matching API key from the environment.
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`.
/// 4. **`GEMINI_API_KEY`**: Gemini with [`GEMINI_FALLBACK_MODEL`] unless a
///    model is configured.
/// 5. Full auto-detection via [`ProviderFactory::from_env`].
pub fn resolve_provider(config: &SummaryConfig) -> Result<Arc<dyn LLMProvider>, DocSumError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(GEMINI_FALLBACK_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            let model = config.model.as_deref().unwrap_or(GEMINI_FALLBACK_MODEL);
            return create_provider("gemini", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| DocSumError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Resolve-then-summarise facade. Cheap to share behind an `Arc`.
pub struct DocumentSummarizer {
    config: SummaryConfig,
    resolver: Resolver,
    summarizer: Arc<dyn Summarizer>,
}

impl DocumentSummarizer {
    /// Build from config with the production Resolver and LLM summariser.
    ///
    /// Provider misconfiguration is reported here, not on the first request.
    pub fn new(config: SummaryConfig) -> Result<Self, DocSumError> {
        let resolver = Resolver::new(&config)?;
        let summarizer = Arc::new(LlmSummarizer::from_config(&config)?);
        info!(
            "Summariser ready (language {}, OCR {})",
            config.summary_language,
            config.ocr_language_arg()
        );
        Ok(Self::with_parts(config, resolver, summarizer))
    }

    /// Assemble from explicit parts.
    pub fn with_parts(
        config: SummaryConfig,
        resolver: Resolver,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            config,
            resolver,
            summarizer,
        }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Resolve and summarise one document.
    ///
    /// `max_output_tokens` overrides the configured default for this call.
    pub async fn summarize(
        &self,
        source: InputSource,
        max_output_tokens: Option<usize>,
    ) -> Result<SummaryOutput, DocSumError> {
        self.check_size(&source)?;

        let secs = self.config.request_timeout_secs;
        tokio::time::timeout(
            Duration::from_secs(secs),
            self.run(source, max_output_tokens),
        )
        .await
        .map_err(|_| DocSumError::Timeout { secs })?
    }

    /// [`Self::summarize`] mapped to the boundary response shape.
    pub async fn respond(
        &self,
        source: InputSource,
        max_output_tokens: Option<usize>,
    ) -> SummaryResponse {
        SummaryResponse::from(self.summarize(source, max_output_tokens).await)
    }

    /// Resolve only; no model call.
    pub async fn extract(&self, source: InputSource) -> Result<ExtractionResult, DocSumError> {
        self.check_size(&source)?;
        self.resolver
            .resolve_within(source, self.config.request_timeout_secs)
            .await
    }

    fn check_size(&self, source: &InputSource) -> Result<(), DocSumError> {
        if let InputSource::UploadedFile { bytes, .. } = source {
            check_upload_size(bytes.len() as u64, self.config.max_upload_bytes)?;
        }
        Ok(())
    }

    async fn run(
        &self,
        source: InputSource,
        max_output_tokens: Option<usize>,
    ) -> Result<SummaryOutput, DocSumError> {
        let total_start = Instant::now();
        let extraction = self.resolver.resolve(source).await?;

        let tokens = max_output_tokens.unwrap_or(self.config.max_output_tokens);
        let request = SummaryRequest::from_extraction(&extraction, tokens);

        let raw = self.summarizer.summarize(&request).await?;
        let summary = clean_summary(&raw);
        if summary.is_empty() {
            return Err(DocSumError::SummarizationFailure);
        }

        info!(
            "Summarised {} chars of {} into {} chars in {:?}",
            extraction.original_chars,
            extraction.source_type,
            summary.chars().count(),
            total_start.elapsed()
        );

        Ok(SummaryOutput {
            summary,
            source_type: extraction.source_type,
            original_length: extraction.original_chars,
            page_count: extraction.page_count,
            truncated: extraction.truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_system_prompt_wins() {
        let config = SummaryConfig::builder()
            .system_prompt("Ringkas saja.")
            .build()
            .unwrap();
        assert_eq!(system_prompt_for(&config), "Ringkas saja.");
    }

    #[test]
    fn default_prompt_follows_language() {
        let config = SummaryConfig::builder()
            .summary_language("English")
            .build()
            .unwrap();
        assert!(system_prompt_for(&config).contains("in English"));
    }
}
