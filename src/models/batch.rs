use crate::{
    error::{Result, StylistError},
    models::EncodedImage,
};

/// One user-triggered request for `count` style variations.
#[derive(Debug, Clone)]
pub struct BatchSpec {
    pub base_image: EncodedImage,
    pub base_prompt: String,
    pub count: usize,
}

impl BatchSpec {
    pub fn new(base_image: EncodedImage, base_prompt: impl Into<String>, count: usize) -> Self {
        Self {
            base_image,
            base_prompt: base_prompt.into(),
            count,
        }
    }
}

/// A single remote edit, borrowed from the batch it belongs to.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub image: &'a EncodedImage,
    pub instruction: String,
    pub index: usize,
}

pub type GenerationResult = Result<EncodedImage>;

#[derive(Debug)]
pub struct VariantOutcome {
    pub index: usize,
    pub instruction: String,
    pub result: GenerationResult,
}

impl VariantOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-variant outcomes of a batch, in variation order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<VariantOutcome>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = (usize, &EncodedImage)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|image| (o.index, image)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (usize, &StylistError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|err| (o.index, err)))
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(VariantOutcome::is_success)
    }

    /// All-or-nothing view: the first failure by index wins.
    pub fn into_images(self) -> Result<Vec<EncodedImage>> {
        self.outcomes.into_iter().map(|o| o.result).collect()
    }

    /// Splits into successful images and the failed outcomes.
    pub fn into_parts(self) -> (Vec<EncodedImage>, Vec<VariantOutcome>) {
        let mut images = Vec::new();
        let mut failures = Vec::new();
        for outcome in self.outcomes {
            match outcome.result {
                Ok(image) => images.push(image),
                Err(err) => failures.push(VariantOutcome {
                    index: outcome.index,
                    instruction: outcome.instruction,
                    result: Err(err),
                }),
            }
        }
        (images, failures)
    }
}
