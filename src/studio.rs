use crate::{
    batch::BatchOrchestrator,
    config::{AggregationPolicy, MAX_VARIATIONS_LIMIT},
    gemini::ImageEditor,
    models::{BatchSpec, EncodedImage, VariantOutcome},
};

pub const DEFAULT_PROMPT: &str = "Give me a short, stylish haircut";
pub const DEFAULT_VARIATIONS: usize = 5;

const MISSING_INPUT: &str = "Please ensure you have a captured image and a prompt.";
const UNREADABLE_CAPTURE: &str = "Could not process the captured image format.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Capture,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Generating,
    Succeeded,
    Failed,
}

/// Everything a front end needs to render the capture and edit views.
#[derive(Debug)]
pub struct Studio {
    view: ViewMode,
    captured: Option<EncodedImage>,
    prompt: String,
    variations: usize,
    results: Vec<EncodedImage>,
    failures: Vec<VariantOutcome>,
    loading: bool,
    error: Option<String>,
    phase: BatchPhase,
}

impl Default for Studio {
    fn default() -> Self {
        Self {
            view: ViewMode::Capture,
            captured: None,
            prompt: DEFAULT_PROMPT.to_string(),
            variations: DEFAULT_VARIATIONS,
            results: Vec::new(),
            failures: Vec::new(),
            loading: false,
            error: None,
            phase: BatchPhase::Idle,
        }
    }
}

impl Studio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn captured(&self) -> Option<&EncodedImage> {
        self.captured.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn variations(&self) -> usize {
        self.variations
    }

    pub fn results(&self) -> &[EncodedImage] {
        &self.results
    }

    /// Failed variations, only populated under the partial policy.
    pub fn failures(&self) -> &[VariantOutcome] {
        &self.failures
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_variations(&mut self, count: usize) {
        self.variations = count.clamp(1, MAX_VARIATIONS_LIMIT);
    }

    pub fn capture(&mut self, image: EncodedImage) {
        self.captured = Some(image);
        self.view = ViewMode::Edit;
        self.clear_results();
        self.error = None;
        self.phase = BatchPhase::Idle;
    }

    pub fn capture_from_data_url(&mut self, data_url: &str) {
        match EncodedImage::from_data_url(data_url) {
            Ok(image) => self.capture(image),
            Err(e) => {
                log::warn!("Rejected captured frame: {}", e);
                self.error = Some(UNREADABLE_CAPTURE.to_string());
            }
        }
    }

    pub fn retake(&mut self) {
        self.captured = None;
        self.view = ViewMode::Capture;
        self.clear_results();
        self.error = None;
        self.phase = BatchPhase::Idle;
    }

    fn clear_results(&mut self) {
        self.results.clear();
        self.failures.clear();
    }

    /// Runs one batch for the current image and prompt.
    pub async fn generate<E: ImageEditor>(&mut self, orchestrator: &BatchOrchestrator<E>) {
        let image = match (&self.captured, self.prompt.trim().is_empty()) {
            (Some(image), false) => image.clone(),
            _ => {
                self.error = Some(MISSING_INPUT.to_string());
                return;
            }
        };

        self.loading = true;
        self.phase = BatchPhase::Generating;
        self.error = None;
        self.clear_results();

        let spec = BatchSpec::new(image, self.prompt.clone(), self.variations);
        let report = orchestrator.generate_report(&spec).await;

        match orchestrator.config().policy {
            AggregationPolicy::FailFast => match report.into_images() {
                Ok(images) => {
                    self.results = images;
                    self.phase = BatchPhase::Succeeded;
                }
                Err(e) => {
                    log::error!("❌ Generation failed: {}", e);
                    self.error = Some(format!("Generation failed: {}", e));
                    self.phase = BatchPhase::Failed;
                }
            },
            AggregationPolicy::Partial => {
                let (images, failures) = report.into_parts();
                if let Some(first) = failures.first() {
                    if let Err(e) = &first.result {
                        self.error = Some(format!(
                            "Generation failed for {} of {} styles: {}",
                            failures.len(),
                            images.len() + failures.len(),
                            e
                        ));
                    }
                }
                self.phase = if images.is_empty() {
                    BatchPhase::Failed
                } else {
                    BatchPhase::Succeeded
                };
                self.results = images;
                self.failures = failures;
            }
        }

        self.loading = false;
    }
}
