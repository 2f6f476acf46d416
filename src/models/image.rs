use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::{
    data_url,
    error::{Result, StylistError},
};

static MEDIA_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/;,\s]+/[^/;,\s]+$").expect("media type pattern is valid"));

/// Image bytes tagged with their media type.
///
/// Construction validates both, so a value of this type is always safe to
/// submit to the remote model.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    media_type: String,
    data: Vec<u8>,
}

impl EncodedImage {
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let media_type = media_type.into();
        if !MEDIA_TYPE.is_match(&media_type) {
            return Err(StylistError::InvalidImageFormat(format!(
                "media type '{}' is not of the form <type>/<subtype>",
                media_type
            )));
        }
        if data.is_empty() {
            return Err(StylistError::InvalidImageFormat("empty image payload".into()));
        }
        Ok(Self { media_type, data })
    }

    pub fn from_base64(media_type: impl Into<String>, payload: &str) -> Result<Self> {
        let data = STANDARD
            .decode(payload)
            .map_err(|e| StylistError::InvalidImageFormat(format!("undecodable payload: {}", e)))?;
        Self::new(media_type, data)
    }

    pub fn from_data_url(input: &str) -> Result<Self> {
        let parsed = data_url::parse(input)
            .ok_or_else(|| StylistError::InvalidImageFormat("malformed data URL".into()))?;
        Self::from_base64(parsed.media_type, parsed.payload)
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn to_data_url(&self) -> String {
        data_url::format(&self.media_type, &self.to_base64())
    }

    /// File extension for the media subtype, e.g. `jpeg` -> `jpg`.
    pub fn extension(&self) -> &str {
        match self.media_type.split('/').nth(1).unwrap_or("bin") {
            "jpeg" => "jpg",
            "svg+xml" => "svg",
            other => other,
        }
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("media_type", &self.media_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}
