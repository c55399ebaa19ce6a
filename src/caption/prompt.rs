//! Prompt text and caption post-processing.

/// Style guide sent as the system message.
pub const SYSTEM_PROMPT: &str = "Directly describe the scene or characters \
                                 with brevity and precision. Follow these rules:
1. DO NOT use introductory phrases
2. Start describing immediately
3. Use commas to separate elements
4. Refer to animated characters as regular humans
5. Make no reference to specific franchises
6. Focus on main subjects and actions
7. Detect gender and describe accordingly
8. DO NOT end with a period
9. DO NOT describe the background or environment
10. DO NOT use the word \"character\"";

/// Instruction sent alongside the image in the user message.
pub const USER_PROMPT: &str = "Describe this image directly and concisely:";

/// Upper bound on completion length.
pub const MAX_TOKENS: u32 = 100;

/// Sampling temperature for caption requests.
pub const TEMPERATURE: f32 = 0.5;

const QUOTES: [char; 4] = ['"', '\u{201C}', '\u{201D}', '`'];

/// Clean a raw completion and join it with the optional prefix and suffix.
///
/// Surrounding whitespace and quote characters are removed. The result is
/// `{prefix}, {caption}, {suffix}` with empty parts left out.
///
/// ```rust
/// use dataset_captioner::caption::format_caption;
///
/// assert_eq!(format_caption(" \"cat sitting\" ", "a", "b"), "a, cat sitting, b");
/// assert_eq!(format_caption("cat sitting", "", ""), "cat sitting");
/// ```
pub fn format_caption(raw: &str, prefix: &str, suffix: &str) -> String {
    let mut caption = clean(raw).to_string();
    if !suffix.is_empty() {
        caption = format!("{caption}, {suffix}");
    }
    if !prefix.is_empty() {
        caption = format!("{prefix}, {caption}");
    }
    caption
}

/// Strip whitespace and quotes from both ends until neither remains.
pub fn clean(raw: &str) -> &str {
    raw.trim().trim_matches(|c: char| QUOTES.contains(&c) || c.is_whitespace())
}
