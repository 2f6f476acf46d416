use std::env;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_MAX_VARIATIONS: usize = 10;
/// Hard ceiling on variations per batch. Fan-out is unbounded below it.
pub const MAX_VARIATIONS_LIMIT: usize = 10;

fn bound_variations(count: usize) -> usize {
    count.clamp(1, MAX_VARIATIONS_LIMIT)
}

/// Supplies the API key for a single remote call.
///
/// Implementations are asked on every call, so a rotated key is picked up
/// by the next request without rebuilding the client.
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self) -> Option<String>;
}

/// Reads `GEMINI_API_KEY`, falling back to `API_KEY`.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Option<String> {
        env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct StaticCredentials {
    key: String,
}

impl StaticCredentials {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Option<String> {
        Some(self.key.clone()).filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoint and model overrides only. The key is never captured here
    /// unless set explicitly through `with_api_key`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        GeminiConfig {
            base_url: env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            model: env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            api_key: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The explicit key when one was set, otherwise the environment.
    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        match &self.api_key {
            Some(key) => Arc::new(StaticCredentials::new(key.clone())),
            None => Arc::new(EnvCredentials),
        }
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationPolicy {
    /// Any failed variant fails the whole batch.
    #[default]
    FailFast,
    /// Keep the successes and report failures per variant.
    Partial,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_variations: usize,
    pub policy: AggregationPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            max_variations: DEFAULT_MAX_VARIATIONS,
            policy: AggregationPolicy::FailFast,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let max_variations = env::var("MAX_VARIATIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &usize| *n >= 1)
            .map(bound_variations)
            .unwrap_or(DEFAULT_MAX_VARIATIONS);
        let policy = env::var("PARTIAL_RESULTS")
            .ok()
            .map_or(AggregationPolicy::FailFast, |val| {
                if val == "true" {
                    AggregationPolicy::Partial
                } else {
                    AggregationPolicy::FailFast
                }
            });

        BatchConfig {
            max_variations,
            policy,
        }
    }

    pub fn with_max_variations(mut self, max_variations: usize) -> Self {
        self.max_variations = bound_variations(max_variations);
        self
    }

    pub fn with_policy(mut self, policy: AggregationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clamp_count(&self, count: usize) -> usize {
        count.clamp(1, bound_variations(self.max_variations))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub batch: BatchConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        AppConfig {
            gemini: GeminiConfig::from_env(),
            batch: BatchConfig::from_env(),
        }
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_batch(mut self, config: BatchConfig) -> Self {
        self.batch = config;
        self
    }
}
