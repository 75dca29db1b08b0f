//! LLM prompt engineering for narrative object extraction

/// Template values a model sometimes copies back verbatim
///
/// Any of these in a response means the model echoed the template instead
/// of reading the text.
pub const PLACEHOLDER_MARKERS: &[&str] = &[
    r#""name": "string""#,
    r#""description": "string""#,
    "ExactNameFromText",
    "CorrectedName",
    "Accurate description based on the text",
];

/// Builds prompts for the LLM
pub struct PromptBuilder<'a> {
    text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder over the full text snapshot
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Prompt asking for the complete object set of the text
    pub fn extraction(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str("Text:\n---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT);
        prompt.push_str("\n\n");
        prompt.push_str(EXTRACTION_RULES);

        prompt
    }

    /// Prompt asking for one corrected object named `name`
    pub fn correction(&self, name: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "The narrative object \"{}\" extracted from this text needs correction.\n\n",
            name
        ));

        prompt.push_str("Text:\n---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        prompt.push_str(&format!(
            "The object \"{}\" is incorrect, incomplete, or inaccurate in some way.\n",
            name
        ));
        prompt.push_str(CORRECTION_FORMAT);
        prompt.push_str("\n\n");
        prompt.push_str(CORRECTION_RULES);

        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str =
    "Extract narrative objects ONLY from the following text. Do not add any objects not explicitly mentioned.";

const OUTPUT_FORMAT: &str = r#"Return valid JSON with this structure:
{
  "objects": [
    {
      "name": "string",
      "description": "string",
      "relationships": [{"target": "string", "description": "string"}]
    }
  ]
}"#;

const EXTRACTION_RULES: &str = r#"STRICT RULES:
- ONLY extract entities with specific names mentioned in the text
- Do NOT extract unnamed people (like "the detective", "a woman", "someone")
- Do NOT invent names for unnamed characters or objects
- Use exact names from the text (if the text says "Alice", use "Alice")
- Descriptions must only state facts from the text
- Relationship targets must be names of other objects
- Never use generic names like "person", "object", "character"

Return ONLY the JSON, no markdown code blocks, no explanations."#;

const CORRECTION_FORMAT: &str = r#"Provide a SINGLE corrected narrative object that better represents what should be extracted from this text.

Return ONLY valid JSON with exactly ONE object:
{
  "objects": [
    {
      "name": "CorrectedName",
      "description": "Accurate description based on the text",
      "relationships": []
    }
  ]
}"#;

const CORRECTION_RULES: &str = r#"RULES:
- Provide exactly ONE corrected object
- Use a more accurate name if the original was wrong
- Only include relationships that are clearly mentioned
- Base everything strictly on the provided text"#;
