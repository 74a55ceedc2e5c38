//! Response cleanup
//!
//! Models wrap answers in code fences or echo comment markers even when told
//! not to. Everything here turns a raw completion into plain doc text.

use crate::types::LlmError;

/// Turn a raw completion into doc text, rejecting empty answers
pub fn clean_generated_text(raw: &str) -> Result<String, LlmError> {
    let unfenced = strip_code_fences(raw.trim_start_matches('\u{feff}').trim());
    let unblocked = strip_block_comment(unfenced);

    let lines: Vec<&str> = unblocked
        .lines()
        .map(strip_line_marker)
        .map(str::trim_end)
        .collect();

    let text = lines.join("\n").trim().to_string();
    if text.is_empty() {
        return Err(LlmError::invalid_response("empty documentation text"));
    }
    Ok(text)
}

fn strip_code_fences(s: &str) -> &str {
    let mut result = s;

    // ```go ... ``` or ``` ... ```
    if result.starts_with("```") {
        result = match result.find('\n') {
            Some(first_newline) => &result[first_newline + 1..],
            None => result.trim_start_matches('`'),
        };
    }

    if let Some(stripped) = result.trim_end().strip_suffix("```") {
        result = stripped.trim_end();
    }

    result
}

fn strip_block_comment(s: &str) -> &str {
    match s.trim().strip_prefix("/*") {
        Some(inner) => inner.strip_suffix("*/").unwrap_or(inner),
        None => s,
    }
}

fn strip_line_marker(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix("//") {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => line,
    }
}
