//! Prompt-injection screening for inbound user text.
//!
//! [`detect`] and [`sanitize`] share one ordered pattern list, so anything
//! that is flagged is also redacted. Detection never blocks a message.

use regex::Regex;
use std::sync::LazyLock;

/// Replacement text for every sanitized match
pub const REDACTION_MARKER: &str = "[FILTERED]";

// Longer phrasings precede their prefixes, and bare role markers precede the
// `marker: word` forms so that sanitizing keeps the following word intact.
const PATTERNS: &[&str] = &[
    r"ignore\s+previous\s+instructions",
    r"forget\s+everything\s+above",
    r"forget\s+everything",
    r"disregard\s+all\s+previous",
    r"you\s+are\s+now\s+\w+",
    r"you\s+are\s+now",
    r"act\s+as\s+if\s+you",
    r"pretend\s+to\s+be",
    r"from\s+now\s+on",
    r"system:",
    r"system:\s*\w",
    r"assistant:",
    r"assistant:\s*\w",
    r"human:",
    r"ai:",
    r"<\|im_start\|>",
    r"<\|im_end\|>",
    r"\[INST\]",
    r"\[/INST\]",
    r"\\n\\nsystem",
];

static MATCHERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .filter_map(|pattern| Regex::new(&format!("(?i){}", pattern)).ok())
        .collect()
});

/// Whether the text matches any known injection pattern.
pub fn detect(text: &str) -> bool {
    MATCHERS.iter().any(|re| re.is_match(text))
}

/// Replace every pattern match with [`REDACTION_MARKER`].
///
/// Patterns are applied in order, each over the output of the previous one.
pub fn sanitize(text: &str) -> String {
    MATCHERS.iter().fold(text.to_string(), |acc, re| {
        re.replace_all(&acc, REDACTION_MARKER).into_owned()
    })
}
