//! Base64 data URLs: `data:<type>/<subtype>;base64,<payload>`.

use once_cell::sync::Lazy;
use regex::Regex;

static DATA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:([^/;,\s]+/[^/;,\s]+);base64,(\S+)$").expect("data URL pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    pub media_type: &'a str,
    pub payload: &'a str,
}

/// Splits a data URL into media type and base64 payload.
///
/// Returns `None` for anything outside the grammar. The payload is not
/// decoded here.
pub fn parse(input: &str) -> Option<DataUrl<'_>> {
    let caps = DATA_URL.captures(input)?;
    let media_type = caps.get(1)?.as_str();
    let payload = caps.get(2)?.as_str();
    Some(DataUrl {
        media_type,
        payload,
    })
}

pub fn format(media_type: &str, payload: &str) -> String {
    format!("data:{};base64,{}", media_type, payload)
}

impl std::fmt::Display for DataUrl<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "data:{};base64,{}", self.media_type, self.payload)
    }
}
