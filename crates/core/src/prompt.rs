//! Prompt assembly for Dockerfile generation

use serde::{Deserialize, Serialize};

/// Number of characters of each file included in the prompt.
pub const FILE_PREVIEW_CHARS: usize = 200;

const INSTRUCTION: &str = "\
Based on the repository information above, write a complete Dockerfile \
that builds and runs this project. Respond with the Dockerfile only.";

const NO_COMMENTS_INSTRUCTION: &str = "\
Do not include any comments in the Dockerfile and do not add explanations \
before or after it: the output is saved and executed as-is.";

/// Repository metadata and README, as fetched for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub readme: String,
}

/// A top-level file of the repository with its decoded content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryFile {
    pub name: String,
    pub content: String,
}

/// Variant of the trailing instruction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptStyle {
    #[default]
    Standard,
    /// Also forbid comments and prose in the generated file
    NoComments,
}

/// First `max_chars` characters of `text`, never splitting a character
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build the completion prompt for a repository.
///
/// Content is embedded verbatim. An absent description renders as an empty
/// string.
pub fn build_prompt(
    metadata: &RepositoryMetadata,
    files: &[RepositoryFile],
    style: PromptStyle,
) -> String {
    let mut parts = vec![
        format!("Repository name: {}", metadata.name),
        format!(
            "Description: {}",
            metadata.description.as_deref().unwrap_or_default()
        ),
        format!("README:\n{}", metadata.readme),
    ];

    let file_lines: Vec<String> = files
        .iter()
        .map(|file| format!("{}: {}", file.name, preview(&file.content, FILE_PREVIEW_CHARS)))
        .collect();
    parts.push(format!("Files:\n{}", file_lines.join("\n")));

    match style {
        PromptStyle::Standard => parts.push(INSTRUCTION.to_string()),
        PromptStyle::NoComments => {
            parts.push(format!("{} {}", INSTRUCTION, NO_COMMENTS_INSTRUCTION))
        }
    }

    parts.join("\n\n")
}
