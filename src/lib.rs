//! Hairstyle try-on: capture a photo, fan a prompt out into style
//! variations, and collect one generated image per variation from a hosted
//! image-editing model.

pub mod batch;
pub mod capture;
pub mod config;
pub mod data_url;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod studio;

pub use batch::{variation_instructions, BatchOrchestrator};
pub use capture::{CameraDevice, CaptureSession, StillFrameDevice};
pub use config::{
    AggregationPolicy, AppConfig, BatchConfig, CredentialProvider, EnvCredentials, GeminiConfig,
    StaticCredentials,
};
pub use error::{Result, StylistError};
pub use gemini::{GeminiImageClient, ImageEditor};
pub use models::{BatchReport, BatchSpec, EncodedImage, VariantOutcome};
pub use studio::{BatchPhase, Studio, ViewMode};
