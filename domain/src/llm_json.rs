//! Pulls JSON out of LLM replies, which often wrap it in markdown fences,
//! reasoning blocks or explanatory prose.

use serde_json::Value;

/// Removes `<think>…</think>` reasoning blocks emitted by reasoning models.
fn strip_reasoning(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Returns the body of the first fenced code block, or the trimmed input when
/// there is none. An unterminated fence yields everything after its opening line.
pub fn strip_code_fences(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text.trim();
    };
    let after_open = &text[open + 3..];
    // Skip the language tag on the fence line
    let body = match after_open.find('\n') {
        Some(newline) => &after_open[newline + 1..],
        None => after_open,
    };
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Finds the first balanced `open … close` span, ignoring delimiters inside strings.
fn first_balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Cleans a reply expected to hold one JSON object: reasoning and fences are removed
/// and the first balanced `{…}` is returned. Falls back to the cleaned text.
pub fn clean_json_response(text: &str) -> String {
    let without_reasoning = strip_reasoning(text);
    let unfenced = strip_code_fences(&without_reasoning);
    first_balanced(unfenced, '{', '}')
        .unwrap_or(unfenced)
        .to_string()
}

/// Parses the first JSON object in a reply.
pub fn parse_object(text: &str) -> Option<Value> {
    let cleaned = clean_json_response(text);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Parses the first JSON array in a reply. An object wrapping a single array
/// (for example `{"questions": […]}`) also counts.
pub fn parse_array(text: &str) -> Option<Vec<Value>> {
    let without_reasoning = strip_reasoning(text);
    let unfenced = strip_code_fences(&without_reasoning);

    match serde_json::from_str::<Value>(unfenced) {
        Ok(Value::Array(items)) => return Some(items),
        Ok(Value::Object(map)) => {
            if let Some(items) = map.into_iter().find_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            }) {
                return Some(items);
            }
        }
        _ => {}
    }

    let candidate = first_balanced(unfenced, '[', ']')?;
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}
