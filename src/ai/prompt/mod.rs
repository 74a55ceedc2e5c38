//! Prompt Builder System
//!
//! Standardized prompt construction for symbol documentation requests.
//!
//! ## Design Principles
//!
//! 1. **Role Definition**: Clear AI role for each task
//! 2. **Structured Objectives**: Numbered goals
//! 3. **Context Sections**: Organized input data
//! 4. **Focus Enforcement**: Keep the answer on one symbol
//! 5. **Anti-Patterns**: Explicit bad examples

use std::collections::BTreeMap;

use super::provider::SymbolRequest;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Context with key-value pairs (rendered in key order)
    Context(BTreeMap<String, String>),
    /// Code block with language
    Code { language: String, content: String },
    /// Focus enforcement with restrictions
    Focus {
        target: String,
        restrictions: Vec<String>,
    },
    /// Anti-patterns with good/bad examples
    AntiPatterns { bad: Vec<String>, good: Vec<String> },
    /// Custom section
    Custom(String),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives(mut self, objectives: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.into_iter().map(String::from).collect(),
        ));
        self
    }

    /// Add a context item, merging into an existing context section
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        for section in &mut self.sections {
            if let PromptSection::Context(ctx) = section {
                ctx.insert(key.to_string(), value.to_string());
                return self;
            }
        }
        let mut ctx = BTreeMap::new();
        ctx.insert(key.to_string(), value.to_string());
        self.sections.push(PromptSection::Context(ctx));
        self
    }

    /// Add code block
    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add focus enforcement section
    pub fn focus(mut self, target: &str, restrictions: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Focus {
            target: target.to_string(),
            restrictions: restrictions.into_iter().map(String::from).collect(),
        });
        self
    }

    /// Add anti-patterns section
    pub fn anti_patterns(mut self, bad: Vec<&str>, good: Vec<&str>) -> Self {
        self.sections.push(PromptSection::AntiPatterns {
            bad: bad.into_iter().map(String::from).collect(),
            good: good.into_iter().map(String::from).collect(),
        });
        self
    }

    /// Add custom section
    pub fn custom(mut self, content: &str) -> Self {
        self.sections
            .push(PromptSection::Custom(content.to_string()));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(ctx) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in ctx {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Code { language, content } => {
                    prompt.push_str(&format!("```{}\n", language));
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n\n");
                }
                PromptSection::Focus {
                    target,
                    restrictions,
                } => {
                    prompt.push_str("<FOCUS>\n");
                    prompt.push_str(&format!("IMPORTANT: Focus EXCLUSIVELY on: {}\n", target));
                    for restriction in restrictions {
                        prompt.push_str(&format!("- {}\n", restriction));
                    }
                    prompt.push_str("</FOCUS>\n\n");
                }
                PromptSection::AntiPatterns { bad, good } => {
                    prompt.push_str("<what_not_to_do>\n");
                    for example in bad {
                        prompt.push_str(&format!("WRONG: {}\n", example));
                    }
                    prompt.push_str("</what_not_to_do>\n\n");
                    prompt.push_str("<what_to_do>\n");
                    for example in good {
                        prompt.push_str(&format!("CORRECT: {}\n", example));
                    }
                    prompt.push_str("</what_to_do>\n\n");
                }
                PromptSection::Custom(content) => {
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

/// Preset prompt templates
pub struct PromptTemplates;

impl PromptTemplates {
    /// Prompt asking for the doc comment of one Go symbol
    pub fn symbol_doc(request: &SymbolRequest, max_content_chars: usize) -> String {
        let subject = doc_subject(&request.identifier);
        let content = prepare_content(&request.content, request.anchor_offset, max_content_chars);

        PromptBuilder::new()
            .role("Go developer", "writing idiomatic godoc comments")
            .objectives(vec![
                "Describe what the symbol does and what callers must know",
                "Start the first sentence with the symbol name",
                "Keep it to a few short sentences",
            ])
            .context_item("File", &request.path)
            .context_item("Symbol", &request.identifier)
            .context_item("Kind", &request.kind.to_string())
            .focus(
                &request.identifier,
                vec![
                    "Do NOT document other declarations in the file",
                    "Do NOT repeat the signature",
                    "Do NOT speculate about code you cannot see",
                ],
            )
            .anti_patterns(
                vec!["// Foo does stuff.", "```go ... ```"],
                vec![&format!("{} returns ...", subject)],
            )
            .code("go", &content)
            .custom("Respond with the comment text only, without comment markers or code fences.")
            .build()
    }
}

/// Name a doc comment should open with (`*T.Name` → `Name`)
pub fn doc_subject(identifier: &str) -> &str {
    identifier
        .rsplit_once('.')
        .map(|(_, name)| name)
        .unwrap_or(identifier)
}

/// Cut file content to a window around the declaration and minify it.
///
/// The window is taken on line boundaries and leans forward from the anchor,
/// since a symbol's body follows its declaration line. Minification trims
/// trailing whitespace and collapses runs of blank lines.
pub fn prepare_content(content: &str, anchor_offset: usize, max_chars: usize) -> String {
    minify(window(content, anchor_offset, max_chars))
}

fn window(content: &str, anchor_offset: usize, max_chars: usize) -> &str {
    if max_chars == 0 || content.len() <= max_chars {
        return content;
    }

    let anchor = anchor_offset.min(content.len());
    let mut start = anchor.saturating_sub(max_chars / 4);
    let mut end = (start + max_chars).min(content.len());
    if end == content.len() {
        start = end.saturating_sub(max_chars);
    }

    while !content.is_char_boundary(start) {
        start += 1;
    }
    while !content.is_char_boundary(end) {
        end -= 1;
    }

    // Whole lines only
    if start > 0
        && let Some(nl) = content[start..end].find('\n')
    {
        start += nl + 1;
    }
    if end < content.len()
        && let Some(nl) = content[start..end].rfind('\n')
    {
        end = start + nl + 1;
    }

    &content[start..end]
}

fn minify(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut blank_run = false;

    for line in content.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            if blank_run {
                continue;
            }
            blank_run = true;
        } else {
            blank_run = false;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim_end().to_string()
}
