pub mod orchestrator;
pub mod prompts;

pub use orchestrator::BatchOrchestrator;
pub use prompts::{variation_instruction, variation_instructions, VARIATION_MODIFIERS};
