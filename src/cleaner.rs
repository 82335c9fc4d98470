use crate::error::{CleanseError, Result};

// Trait for text cleaning steps that can be plugged into a pipeline
pub trait TextCleaner: Send + Sync {
    fn clean(&self, text: &str) -> String;
}

// Default cleaner: keeps ASCII letters and whitespace, then collapses whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct Cleanser;

impl TextCleaner for Cleanser {
    fn clean(&self, text: &str) -> String {
        cleanse(text)
    }
}

/// Removes every character that is neither an ASCII letter nor whitespace,
/// collapses whitespace runs into a single space and trims both ends.
///
/// ```
/// use text_cleanser::cleanse;
///
/// assert_eq!(cleanse("  hello,   world!! "), "hello world");
/// assert_eq!(cleanse("Good2Go!!"), "GoodGo");
/// ```
pub fn cleanse(text: &str) -> String {
    let letters: String = text
        .chars()
        .filter(|&c| c.is_ascii_alphabetic() || is_separator(c))
        .collect();

    letters
        .split(is_separator)
        .filter(|word| !word.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

// Unicode whitespace plus the ASCII file/group/record/unit separators
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Like [`cleanse`], but rejects absent input instead of coercing it.
pub fn try_cleanse(text: Option<&str>) -> Result<String> {
    match text {
        Some(text) => Ok(cleanse(text)),
        None => Err(CleanseError::InvalidInput(
            "expected a string, found nothing".to_string(),
        )),
    }
}
