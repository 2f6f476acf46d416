pub mod image_client;
pub mod traits;

pub use image_client::{classify_provider_error, GeminiImageClient};
pub use traits::ImageEditor;
