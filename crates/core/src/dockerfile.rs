//! Post-processing of generated Dockerfiles

/// Instructions a Dockerfile may start with.
const LEADING_INSTRUCTIONS: &[&str] = &["FROM", "ARG"];

/// Remove a surrounding Markdown code fence from a model response.
///
/// Handles ```` ```dockerfile ````, ```` ```Dockerfile ```` and bare
/// ```` ``` ```` fences. Text without a leading fence is returned trimmed
/// but otherwise unchanged.
pub fn strip_code_fences(response: &str) -> String {
    let trimmed = response.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string (e.g. "dockerfile") on the opening line
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => "",
    };

    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);

    body.trim_matches('\n').trim_end().to_string()
}

/// Check that the text plausibly is a Dockerfile.
///
/// The first line that is not blank or a comment (parser directives are
/// comments too) must be a `FROM` or `ARG` instruction.
pub fn check_plausible(text: &str) -> Result<(), String> {
    let first = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'));

    let Some(line) = first else {
        return Err("Dockerfile contains no instructions".to_string());
    };

    let instruction = line
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();

    if LEADING_INSTRUCTIONS.contains(&instruction.as_str()) {
        Ok(())
    } else {
        Err(format!(
            "Dockerfile must start with FROM or ARG, found: {}",
            line
        ))
    }
}
