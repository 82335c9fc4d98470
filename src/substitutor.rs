use std::borrow::Cow;

use regex::{NoExpand, Regex};

use crate::{
    cleaner::TextCleaner,
    dictionary::SlangDictionary,
    error::{CleanseError, Result},
};

/// Replaces whole-word slang terms with their formal counterparts.
///
/// Patterns are compiled once, in dictionary order. Each pass rewrites the
/// output of the previous one, so earlier replacements can be matched again
/// by later entries.
#[derive(Debug, Clone)]
pub struct DictionarySubstitutor {
    passes: Vec<(Regex, String)>,
}

impl DictionarySubstitutor {
    pub fn new(dictionary: &SlangDictionary) -> Result<Self> {
        let passes = dictionary
            .iter()
            .map(|entry| -> Result<(Regex, String)> {
                Ok((word_pattern(&entry.slang)?, entry.formal.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DictionarySubstitutor { passes })
    }

    pub fn substitute(&self, text: &str) -> String {
        let mut current = text.to_string();
        for (pattern, formal) in &self.passes {
            // Borrowed means nothing matched, keep the current buffer
            let replaced = match pattern.replace_all(&current, NoExpand(formal)) {
                Cow::Owned(replaced) => Some(replaced),
                Cow::Borrowed(_) => None,
            };
            if let Some(replaced) = replaced {
                current = replaced;
            }
        }
        current
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl TextCleaner for DictionarySubstitutor {
    fn clean(&self, text: &str) -> String {
        self.substitute(text)
    }
}

/// One-shot substitution; compiles the dictionary on every call.
///
/// Prefer [`DictionarySubstitutor`] when the same dictionary is reused.
///
/// ```
/// use text_cleanser::{substitute, SlangDictionary};
///
/// let dictionary = SlangDictionary::from_pairs([("lu", "kamu"), ("gpp", "tidak apa apa")]);
/// assert_eq!(substitute("lu gpp ya", &dictionary).unwrap(), "kamu tidak apa apa ya");
/// ```
pub fn substitute(text: &str, dictionary: &SlangDictionary) -> Result<String> {
    Ok(DictionarySubstitutor::new(dictionary)?.substitute(text))
}

// Case-insensitive literal match bounded by word boundaries
fn word_pattern(slang: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(slang))).map_err(|source| {
        CleanseError::InvalidPattern {
            slang: slang.to_string(),
            source,
        }
    })
}
