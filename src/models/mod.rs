pub mod batch;
pub mod gemini;
pub mod image;

pub use self::batch::*;
pub use self::image::*;
