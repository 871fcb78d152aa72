//! Fenced code block extraction from markdown

use serde::{Deserialize, Serialize};

/// Upper bound on examples returned for one document
pub const MAX_CODE_EXAMPLES: usize = 10;

/// A code block found in a README
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExample {
    /// Nearest heading above the block, or `Example N`
    pub title: String,
    pub language: Option<String>,
    pub code: String,
}

struct OpenFence {
    marker: char,
    width: usize,
    language: Option<String>,
    lines: Vec<String>,
}

/// Collect fenced code blocks (``` or ~~~) in document order.
///
/// Empty blocks are skipped and at most `MAX_CODE_EXAMPLES` are returned. An
/// unterminated fence at the end of the document is dropped.
pub fn extract_code_examples(markdown: &str) -> Vec<CodeExample> {
    let mut examples = Vec::new();
    let mut heading: Option<String> = None;
    let mut open: Option<OpenFence> = None;

    for line in markdown.lines() {
        let trimmed = line.trim_start();

        if let Some(fence) = open.as_mut() {
            if closes(trimmed, fence.marker, fence.width) {
                let code = fence.lines.join("\n");
                let language = fence.language.take();
                open = None;

                if code.trim().is_empty() {
                    continue;
                }
                let title = heading
                    .clone()
                    .unwrap_or_else(|| format!("Example {}", examples.len() + 1));
                examples.push(CodeExample { title, language, code });
                if examples.len() == MAX_CODE_EXAMPLES {
                    break;
                }
            } else {
                fence.lines.push(line.to_string());
            }
            continue;
        }

        if let Some(fence) = opens(trimmed) {
            open = Some(fence);
        } else if let Some(text) = heading_text(trimmed) {
            heading = Some(text);
        }
    }

    examples
}

fn opens(line: &str) -> Option<OpenFence> {
    let marker = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let width = line.chars().take_while(|c| *c == marker).count();
    if width < 3 {
        return None;
    }

    let info = line[width..].trim();
    // backtick fences cannot carry backticks in their info string
    if marker == '`' && info.contains('`') {
        return None;
    }

    Some(OpenFence {
        marker,
        width,
        language: info.split_whitespace().next().map(str::to_string),
        lines: Vec::new(),
    })
}

fn closes(line: &str, marker: char, width: usize) -> bool {
    let run = line.chars().take_while(|c| *c == marker).count();
    run >= width && line[run..].trim().is_empty()
}

fn heading_text(line: &str) -> Option<String> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim();
    (!text.is_empty()).then(|| text.to_string())
}
