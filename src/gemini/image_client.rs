use crate::{
    config::{CredentialProvider, GeminiConfig},
    error::{Result, StylistError},
    gemini::traits::ImageEditor,
    models::{
        gemini::{
            Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse,
            GenerationConfig, Part,
        },
        EncodedImage,
    },
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;

const API_KEY_HEADER: &str = "x-goog-api-key";
const CREDENTIAL_MARKERS: [&str; 2] = ["API key not valid", "API_KEY_INVALID"];
const AUTH_STATUSES: [&str; 2] = ["UNAUTHENTICATED", "PERMISSION_DENIED"];

#[derive(Clone)]
pub struct GeminiImageClient {
    client: Client,
    config: GeminiConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl GeminiImageClient {
    /// Uses the key from `config` when set, otherwise the environment.
    pub fn new(config: GeminiConfig) -> Self {
        let credentials = config.credentials();
        Self::with_credentials(config, credentials)
    }

    pub fn with_credentials(config: GeminiConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client: Client::new(),
            config,
            credentials,
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn build_request(image: &EncodedImage, instruction: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::inline(image.media_type(), image.to_base64()),
                    Part::text(instruction),
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }

    /// Extracts the first generated image from a successful response body.
    pub fn parse_response(body: &str) -> Result<EncodedImage> {
        let response: GenerateContentResponse = serde_json::from_str(body)
            .map_err(|e| StylistError::ProviderError(format!("malformed response: {}", e)))?;

        let inline = response
            .first_image()
            .ok_or(StylistError::NoImageInResponse)?;

        EncodedImage::from_base64(inline.mime_type.clone(), &inline.data).map_err(|e| {
            StylistError::ProviderError(format!("model returned an unusable image: {}", e))
        })
    }

    /// Maps a non-success HTTP response onto the error taxonomy.
    pub fn error_from_body(status: StatusCode, body: &str) -> StylistError {
        let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
        let auth_status = envelope
            .as_ref()
            .and_then(|envelope| envelope.error.status.as_deref())
            .map_or(false, |status| AUTH_STATUSES.contains(&status));

        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || auth_status
            || mentions_invalid_key(body)
        {
            return StylistError::InvalidCredentials;
        }

        let message = envelope
            .map(|envelope| envelope.error.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), body.trim()));
        classify_provider_error(&message)
    }
}

fn mentions_invalid_key(text: &str) -> bool {
    CREDENTIAL_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Credential failures are told apart from everything else by their text.
pub fn classify_provider_error(message: &str) -> StylistError {
    if mentions_invalid_key(message) {
        StylistError::InvalidCredentials
    } else {
        StylistError::ProviderError(message.to_string())
    }
}

#[async_trait]
impl ImageEditor for GeminiImageClient {
    async fn edit_once(&self, image: &EncodedImage, instruction: &str) -> Result<EncodedImage> {
        let api_key = self.credentials.api_key().ok_or_else(|| {
            log::error!("No API key configured for {}", self.config.model);
            StylistError::InvalidCredentials
        })?;

        let request = Self::build_request(image, instruction);

        log::info!("Editing image with model: {}", self.config.model);
        log::debug!(
            "Edit request: {} bytes of {}, instruction of {} chars",
            image.len(),
            image.media_type(),
            instruction.len()
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Image model transport error: {}", e);
                classify_provider_error(&e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_provider_error(&e.to_string()))?;

        if !status.is_success() {
            let err = Self::error_from_body(status, &body);
            log::error!("Image model returned {}: {}", status, err);
            return Err(err);
        }

        let generated = Self::parse_response(&body)?;
        log::debug!(
            "Received {} bytes of {}",
            generated.len(),
            generated.media_type()
        );
        Ok(generated)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
