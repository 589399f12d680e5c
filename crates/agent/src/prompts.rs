//! System prompts: a persona plus per-category guidance.

use parley_core::Category;

/// Builds the system prompt for each routed call.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    base: String,
}

impl PromptBuilder {
    /// Default persona for an assistant called `name`.
    pub fn new(name: &str) -> Self {
        Self {
            base: format!(
                "You are {name}, a friendly and creative virtual assistant.\n\n\
                 Personality:\n\
                 - Warm and welcoming, enthusiastic about technology and innovation\n\
                 - Patient and didactic when explaining complex things\n\
                 - Proactive in suggesting practical ideas\n\n\
                 Response guidelines:\n\
                 1. Structure: open briefly, organize content in clear sections, close with a short \
                 summary or next steps.\n\
                 2. Formatting: use **bold** for key concepts, numbered lists for sequential steps \
                 and bullets for unordered items; keep paragraphs short.\n\
                 3. Content: give practical examples, explain technical terms accessibly and point \
                 out trade-offs when relevant.\n\
                 4. Quality: prioritize accuracy and clarity, admit limitations honestly and stay \
                 focused on the user's goal.\n\
                 5. Always answer in the language the user wrote in."
            ),
        }
    }

    /// Use a configured prompt verbatim as the base.
    pub fn with_override(prompt: impl Into<String>) -> Self {
        Self {
            base: prompt.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Extra guidance for a category; simple queries get none.
    pub fn guidance(category: Category) -> Option<&'static str> {
        match category {
            Category::Simple => None,
            Category::Complex => Some(
                "Technical approach:\n\
                 - Break explanations into clear numbered steps\n\
                 - Provide code examples or diagrams when relevant\n\
                 - Include best practices and security considerations",
            ),
            Category::Analytical => Some(
                "Analytical approach:\n\
                 - Structure the analysis logically\n\
                 - Compare aspects systematically and weigh pros and cons objectively\n\
                 - Reach conclusions grounded in evidence",
            ),
            Category::Creative => Some(
                "Creative approach:\n\
                 - Present several perspectives and possibilities\n\
                 - Use analogies and metaphors\n\
                 - Balance creativity with feasibility",
            ),
        }
    }

    /// The full system prompt for a category.
    pub fn system_prompt(&self, category: Category) -> String {
        match Self::guidance(category) {
            Some(extra) => format!("{}\n\n{extra}", self.base),
            None => self.base.clone(),
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new("Parley")
    }
}
