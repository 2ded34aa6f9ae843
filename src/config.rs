//! Configuration types for document resolution and summarisation.
//!
//! All behaviour is controlled through [`SummaryConfig`], built via its
//! [`SummaryConfigBuilder`]. The config is constructed once at startup and
//! passed explicitly to [`crate::summarize::DocumentSummarizer`]; nothing in
//! the library reads credentials from ambient global state after that point.

use crate::error::DocSumError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Upload ceiling for direct PDF uploads: 1 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1024 * 1024;

/// Ceiling on the text handed to the summariser, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 10_000;

/// Minimum trimmed text length worth summarising, in characters.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 10;

/// Default output-token budget for a summary.
pub const DEFAULT_MAX_OUTPUT_TOKENS: usize = 512;

/// Some origins reject default HTTP client identifiers.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Configuration for resolving and summarising a document.
///
/// Built via [`SummaryConfig::builder()`] or using [`SummaryConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_docsum::SummaryConfig;
///
/// let config = SummaryConfig::builder()
///     .summary_language("English")
///     .ocr_languages(["eng"])
///     .max_output_tokens(256)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_input_chars, 10_000);
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Maximum characters passed to the summariser. Default: 10 000.
    ///
    /// Longer documents are truncated silently: a summary of the first part of
    /// a long document is accepted behaviour, not an error.
    pub max_input_chars: usize,

    /// Minimum trimmed characters required to attempt a summary. Default: 10.
    pub min_text_chars: usize,

    /// Maximum accepted size of a direct upload in bytes. Default: 1 MiB.
    ///
    /// Checked before any extraction work so huge scans never reach OCR.
    pub max_upload_bytes: u64,

    /// Maximum accepted size of a downloaded body in bytes. Default: 20 MiB.
    pub max_download_bytes: u64,

    /// Download timeout for URL inputs in seconds. Default: 30.
    pub download_timeout_secs: u64,

    /// `User-Agent` header sent by the fetcher.
    pub user_agent: String,

    /// Tesseract language codes used for scanned pages. Default: `eng`, `ind`.
    ///
    /// Always include English plus the language the summary is written in;
    /// scanned documents frequently mix both.
    pub ocr_languages: Vec<String>,

    /// Tesseract executable. Default: `tesseract` on `PATH`.
    pub tesseract_cmd: String,

    /// Longest edge of a rasterised page in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// Most pages of a scanned PDF that are rendered and OCR'd. Default: 50.
    ///
    /// OCR also stops early once `max_input_chars` of text is recovered.
    pub max_ocr_pages: usize,

    /// Output-token budget used when the caller does not supply one. Default: 512.
    pub max_output_tokens: usize,

    /// LLM model identifier, e.g. "gemini-2.0-flash", "gpt-4.1-nano".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.3.
    pub temperature: f32,

    /// Retries on a failing LLM call. Default: 2.
    ///
    /// Applies to the summariser only. Extraction strategies are never
    /// retried; a failed strategy hands over to the next one.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Language the summary is written in. Default: "Indonesian".
    pub summary_language: String,

    /// Custom summarisation prompt. If None, uses the built-in prompt.
    pub system_prompt: Option<String>,

    /// Deadline for resolve + summarise of a single request, in seconds. Default: 120.
    pub request_timeout_secs: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_download_bytes: 20 * 1024 * 1024,
            download_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            ocr_languages: vec!["eng".to_string(), "ind".to_string()],
            tesseract_cmd: "tesseract".to_string(),
            max_rendered_pixels: 2000,
            max_ocr_pages: 50,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.3,
            max_retries: 2,
            retry_backoff_ms: 500,
            summary_language: "Indonesian".to_string(),
            system_prompt: None,
            request_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("max_input_chars", &self.max_input_chars)
            .field("min_text_chars", &self.min_text_chars)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("max_download_bytes", &self.max_download_bytes)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("ocr_languages", &self.ocr_languages)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("max_ocr_pages", &self.max_ocr_pages)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("summary_language", &self.summary_language)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }

    /// Tesseract `-l` argument, e.g. `eng+ind`.
    pub fn ocr_language_arg(&self) -> String {
        self.ocr_languages.join("+")
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Debug)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    pub fn max_input_chars(mut self, n: usize) -> Self {
        self.config.max_input_chars = n;
        self
    }

    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.config.min_text_chars = n.max(1);
        self
    }

    pub fn max_upload_bytes(mut self, n: u64) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn max_download_bytes(mut self, n: u64) -> Self {
        self.config.max_download_bytes = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs.max(1);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn ocr_languages<I, S>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.ocr_languages = langs.into_iter().map(Into::into).collect();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn max_ocr_pages(mut self, n: usize) -> Self {
        self.config.max_ocr_pages = n.max(1);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn summary_language(mut self, lang: impl Into<String>) -> Self {
        self.config.summary_language = lang.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummaryConfig, DocSumError> {
        let c = &self.config;
        if c.max_input_chars == 0 {
            return Err(DocSumError::InvalidConfig(
                "max_input_chars must be ≥ 1".into(),
            ));
        }
        if c.min_text_chars > c.max_input_chars {
            return Err(DocSumError::InvalidConfig(format!(
                "min_text_chars ({}) exceeds max_input_chars ({})",
                c.min_text_chars, c.max_input_chars
            )));
        }
        if c.max_upload_bytes == 0 {
            return Err(DocSumError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        if c.ocr_languages.iter().all(|l| l.trim().is_empty()) {
            return Err(DocSumError::InvalidConfig(
                "at least one OCR language is required".into(),
            ));
        }
        if c.max_output_tokens == 0 {
            return Err(DocSumError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
