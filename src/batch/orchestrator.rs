use crate::{
    batch::prompts::variation_instructions,
    config::BatchConfig,
    error::Result,
    gemini::ImageEditor,
    logger,
    models::{BatchReport, BatchSpec, EncodedImage, GenerationRequest, VariantOutcome},
};
use futures::future::join_all;
use std::sync::Arc;

/// Fans a batch out as concurrent edits and gathers the results in
/// variation order.
pub struct BatchOrchestrator<E: ImageEditor> {
    editor: Arc<E>,
    config: BatchConfig,
}

impl<E: ImageEditor> Clone for BatchOrchestrator<E> {
    fn clone(&self) -> Self {
        Self {
            editor: Arc::clone(&self.editor),
            config: self.config.clone(),
        }
    }
}

impl<E: ImageEditor> BatchOrchestrator<E> {
    pub fn new(editor: E) -> Self {
        Self::from_shared(Arc::new(editor))
    }

    pub fn from_shared(editor: Arc<E>) -> Self {
        Self {
            editor,
            config: BatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    /// One request per variation, with the count clamped to the configured range.
    pub fn plan<'a>(&self, spec: &'a BatchSpec) -> Vec<GenerationRequest<'a>> {
        let count = self.config.clamp_count(spec.count);
        if count != spec.count {
            log::warn!(
                "Requested {} variations, clamped to {}",
                spec.count,
                count
            );
        }

        variation_instructions(&spec.base_prompt, count)
            .into_iter()
            .enumerate()
            .map(|(index, instruction)| GenerationRequest {
                image: &spec.base_image,
                instruction,
                index,
            })
            .collect()
    }

    /// Runs every variation to completion and reports each outcome.
    pub async fn generate_report(&self, spec: &BatchSpec) -> BatchReport {
        let requests = self.plan(spec);
        let _timer = logger::timer(&format!(
            "{} variations via {}",
            requests.len(),
            self.editor.name()
        ));

        let calls = requests.into_iter().map(|request| async move {
            log::debug!("Dispatching variation {}", request.index + 1);
            let result = self
                .editor
                .edit_once(request.image, &request.instruction)
                .await;
            if let Err(e) = &result {
                log::warn!("Variation {} failed: {}", request.index + 1, e);
            }
            VariantOutcome {
                index: request.index,
                instruction: request.instruction,
                result,
            }
        });

        // join_all yields outputs in input order, not completion order.
        let outcomes = join_all(calls).await;
        let report = BatchReport { outcomes };

        log::info!(
            "Batch settled: {} succeeded, {} failed",
            report.succeeded().count(),
            report.failed().count()
        );
        report
    }

    /// All-or-nothing: one failed variation fails the batch.
    pub async fn generate_variations(&self, spec: &BatchSpec) -> Result<Vec<EncodedImage>> {
        self.generate_report(spec).await.into_images()
    }

    /// Validates a raw data URL before anything is dispatched.
    pub async fn generate_from_data_url(
        &self,
        data_url: &str,
        base_prompt: &str,
        count: usize,
    ) -> Result<Vec<EncodedImage>> {
        let base_image = EncodedImage::from_data_url(data_url)?;
        let spec = BatchSpec::new(base_image, base_prompt, count);
        self.generate_variations(&spec).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::StylistError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Echoes each instruction back as the image payload. Later variations
    /// finish first so ordering is by index, not arrival.
    #[derive(Default)]
    pub(crate) struct EchoEditor {
        pub calls: Mutex<Vec<String>>,
        pub fail_on: Option<usize>,
    }

    impl EchoEditor {
        pub fn failing_at(variation: usize) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: Some(variation),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    fn variation_number(instruction: &str) -> usize {
        instruction
            .trim_end_matches('.')
            .rsplit(' ')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap()
    }

    #[async_trait]
    impl ImageEditor for EchoEditor {
        async fn edit_once(&self, _image: &EncodedImage, instruction: &str) -> Result<EncodedImage> {
            self.calls.lock().unwrap().push(instruction.to_string());
            let number = variation_number(instruction);
            tokio::time::sleep(Duration::from_millis((20 - number as u64) * 2)).await;
            if self.fail_on == Some(number) {
                return Err(StylistError::ProviderError(format!(
                    "variation {} rejected",
                    number
                )));
            }
            EncodedImage::new("image/png", instruction.as_bytes().to_vec())
        }
    }

    fn base_image() -> EncodedImage {
        EncodedImage::new("image/jpeg", vec![0xFF, 0xD8, 0xFF]).unwrap()
    }

    #[tokio::test]
    async fn test_issues_exactly_n_requests_in_order() {
        for count in 1..=10 {
            let orchestrator = BatchOrchestrator::new(EchoEditor::default());
            let spec = BatchSpec::new(base_image(), "short bob", count);
            let images = orchestrator.generate_variations(&spec).await.unwrap();

            assert_eq!(orchestrator.editor().call_count(), count);
            assert_eq!(images.len(), count);
            for (i, image) in images.iter().enumerate() {
                let text = String::from_utf8(image.data().to_vec()).unwrap();
                assert_eq!(variation_number(&text), i + 1);
            }
        }
    }

    #[tokio::test]
    async fn test_single_failure_fails_batch() {
        let orchestrator = BatchOrchestrator::new(EchoEditor::failing_at(3));
        let spec = BatchSpec::new(base_image(), "short bob", 5);
        let err = orchestrator.generate_variations(&spec).await.unwrap_err();

        match err {
            StylistError::ProviderError(message) => assert_eq!(message, "variation 3 rejected"),
            other => panic!("unexpected error: {:?}", other),
        }
        // Every call still ran to completion.
        assert_eq!(orchestrator.editor().call_count(), 5);
    }

    #[tokio::test]
    async fn test_report_keeps_partial_results() {
        let orchestrator = BatchOrchestrator::new(EchoEditor::failing_at(2));
        let spec = BatchSpec::new(base_image(), "pixie cut", 4);
        let report = orchestrator.generate_report(&spec).await;

        assert_eq!(report.len(), 4);
        let succeeded: Vec<usize> = report.succeeded().map(|(i, _)| i).collect();
        assert_eq!(succeeded, vec![0, 2, 3]);
        let failed: Vec<usize> = report.failed().map(|(i, _)| i).collect();
        assert_eq!(failed, vec![1]);
    }

    #[tokio::test]
    async fn test_count_is_clamped() {
        let orchestrator = BatchOrchestrator::new(EchoEditor::default());
        let spec = BatchSpec::new(base_image(), "afro", 15);
        let images = orchestrator.generate_variations(&spec).await.unwrap();
        assert_eq!(images.len(), 10);

        let orchestrator = BatchOrchestrator::new(EchoEditor::default());
        let spec = BatchSpec::new(base_image(), "afro", 0);
        let images = orchestrator.generate_variations(&spec).await.unwrap();
        assert_eq!(images.len(), 1);
    }

    #[tokio::test]
    async fn test_raised_cap_still_dispatches_at_most_ten() {
        let orchestrator = BatchOrchestrator::new(EchoEditor::default())
            .with_config(BatchConfig::new().with_max_variations(50));
        let spec = BatchSpec::new(base_image(), "afro", 50);
        let images = orchestrator.generate_variations(&spec).await.unwrap();

        assert_eq!(orchestrator.editor().call_count(), 10);
        assert_eq!(images.len(), 10);
    }

    #[tokio::test]
    async fn test_malformed_data_url_dispatches_nothing() {
        let orchestrator = BatchOrchestrator::new(EchoEditor::default());
        let err = orchestrator
            .generate_from_data_url("data:image/jpeg;base64,%%%", "mohawk", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, StylistError::InvalidImageFormat(_)));
        assert_eq!(orchestrator.editor().call_count(), 0);

        let err = orchestrator
            .generate_from_data_url("not a data url", "mohawk", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, StylistError::InvalidImageFormat(_)));
        assert_eq!(orchestrator.editor().call_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_data_url_runs_batch() {
        let orchestrator = BatchOrchestrator::new(EchoEditor::default());
        let images = orchestrator
            .generate_from_data_url("data:image/jpeg;base64,/9j/", "mohawk", 2)
            .await
            .unwrap();
        assert_eq!(images.len(), 2);
    }
}
