//! Prompt variants that push the model toward distinct results for the
//! same photo and base prompt.

pub const VARIATION_MODIFIERS: [&str; 10] = [
    "with a modern twist",
    "in a classic style",
    "that's a bit edgy and bold",
    "with a softer, more natural look",
    "with subtle color highlights",
    "that has more volume and texture",
    "in a sleek and polished version",
    "that looks playful and fun",
    "suitable for a professional setting",
    "that is completely different and surprising",
];

/// Modifier for a zero-based variation index, wrapping past the list end.
pub fn modifier_for(index: usize) -> &'static str {
    VARIATION_MODIFIERS[index % VARIATION_MODIFIERS.len()]
}

pub fn variation_instruction(base_prompt: &str, index: usize) -> String {
    format!(
        "{}, but {}. Please provide style variation number {}.",
        base_prompt,
        modifier_for(index),
        index + 1
    )
}

pub fn variation_instructions(base_prompt: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|index| variation_instruction(base_prompt, index))
        .collect()
}
