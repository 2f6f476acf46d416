use crate::{error::Result, models::EncodedImage};
use async_trait::async_trait;

/// One image plus one instruction in, one generated image out.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    async fn edit_once(&self, image: &EncodedImage, instruction: &str) -> Result<EncodedImage>;

    /// Short label used in log lines.
    fn name(&self) -> &str {
        "image-editor"
    }
}
