//! Conversation title generation
//!
//! Derives a short human-readable title from the first user message of a
//! conversation: leading greetings and courtesy phrases are stripped, whole
//! words are accumulated into a 40-character budget, and the result is
//! normalized to sentence casing.

use regex::Regex;
use std::sync::OnceLock;

/// Title used when no first message is available
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum title length in characters
const TITLE_BUDGET: usize = 40;

fn greeting_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(hi|hello|hey|yo|sup|how are you|what's up)\b[,!.\s]*")
            .expect("greeting pattern is valid")
    })
}

fn courtesy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(can you|could you|please|would you)\b[,\s]*")
            .expect("courtesy pattern is valid")
    })
}

/// Generate a conversation title from a first message
///
/// Blank input falls back to [`DEFAULT_TITLE`]. When stripping leaves
/// nothing, the raw message's first 40 characters are used instead, so a
/// message consisting only of a greeting still gets a title.
///
/// # Examples
///
/// ```
/// use chatling::session::generate_title;
///
/// let title = generate_title("hi, can you explain nostalgia to a kindergartener");
/// assert_eq!(title, "Explain nostalgia to a kindergartener");
/// ```
pub fn generate_title(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    let cleaned = greeting_re().replace(trimmed, "");
    let cleaned = courtesy_re().replace(&cleaned, "");
    let cleaned = cleaned.trim();

    // Accumulate whole words until the budget would be exceeded; never cut
    // a word in half.
    let mut title = String::new();
    for word in cleaned.split_whitespace() {
        let needed = word.chars().count() + usize::from(!title.is_empty());
        if title.chars().count() + needed > TITLE_BUDGET {
            break;
        }
        if !title.is_empty() {
            title.push(' ');
        }
        title.push_str(word);
    }

    if title.is_empty() {
        title = trimmed.chars().take(TITLE_BUDGET).collect();
    }

    sentence_case(&title)
}

/// Uppercase the first character, lowercase the rest
fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
