use std::{fmt::{self, Debug, Formatter}, sync::Arc};

use crate::{
    cleaner::{Cleanser, TextCleaner},
    dictionary::SlangDictionary,
    error::{CleanseError, Result},
    substitutor::DictionarySubstitutor,
};


/// A builder for the `Pipeline` struct
/// That allows for configuring the cleaning steps
/// before building it
pub struct PipelineBuilder {
    cleaner: Option<Arc<dyn TextCleaner>>,
    dictionary: Option<Arc<SlangDictionary>>,
    substitution: bool,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        PipelineBuilder {
            cleaner: None,
            dictionary: None,
            substitution: false,
        }
    }

    /// Replaces the default [`Cleanser`] step.
    pub fn with_cleaner<T: TextCleaner + 'static>(mut self, cleaner: T) -> Self {
        self.cleaner = Some(Arc::new(cleaner));
        self
    }

    pub fn with_dictionary(mut self, dictionary: Arc<SlangDictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Turns the dictionary substitution step on or off. Off by default.
    pub fn with_substitution(mut self, enabled: bool) -> Self {
        self.substitution = enabled;
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        if self.substitution && self.dictionary.is_none() {
            return Err(CleanseError::MissingDictionary);
        }
        // compiled even when dormant so `Pipeline::substitute` never recompiles
        let substitutor = self
            .dictionary
            .as_deref()
            .map(DictionarySubstitutor::new)
            .transpose()?
            .map(Arc::new);

        Ok(Pipeline {
            cleaner: self.cleaner.unwrap_or_else(|| Arc::new(Cleanser)),
            dictionary: self.dictionary,
            substitutor,
            substitution: self.substitution,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}


/// Raw text -> cleaner -> optional slang substitution.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use text_cleanser::{Pipeline, SlangDictionary};
///
/// let dictionary = Arc::new(SlangDictionary::from_pairs([("gpp", "tidak apa apa")]));
///
/// let plain = Pipeline::default();
/// assert_eq!(plain.process("gpp!! 123"), "gpp");
///
/// let formal = Pipeline::new()
///     .with_dictionary(dictionary)
///     .with_substitution(true)
///     .build()
///     .unwrap();
/// assert_eq!(formal.process("gpp!! 123"), "tidak apa apa");
/// ```
#[derive(Clone)]
pub struct Pipeline {
    cleaner: Arc<dyn TextCleaner>,
    dictionary: Option<Arc<SlangDictionary>>,
    substitutor: Option<Arc<DictionarySubstitutor>>,
    substitution: bool,
}

impl Debug for Pipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("dictionary_entries", &self.dictionary.as_ref().map(|d| d.len()))
            .field("substitution", &self.substitution_enabled())
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs every enabled step over `text`.
    pub fn process(&self, text: &str) -> String {
        let cleaned = self.cleaner.clean(text);
        match (&self.substitutor, self.substitution) {
            (Some(substitutor), true) => substitutor.substitute(&cleaned),
            _ => cleaned,
        }
    }

    /// Like [`Pipeline::process`], but rejects absent input.
    pub fn try_process(&self, text: Option<&str>) -> Result<String> {
        text.map(|text| self.process(text)).ok_or_else(|| {
            CleanseError::InvalidInput("expected a string, found nothing".to_string())
        })
    }

    /// Runs only the cleaning step.
    pub fn cleanse(&self, text: &str) -> String {
        self.cleaner.clean(text)
    }

    /// Runs only the substitution step against the injected dictionary,
    /// whether or not substitution is enabled for [`Pipeline::process`].
    pub fn substitute(&self, text: &str) -> Result<String> {
        self.substitutor
            .as_ref()
            .map(|substitutor| substitutor.substitute(text))
            .ok_or(CleanseError::MissingDictionary)
    }

    /// The compiled dictionary, present whenever a dictionary was supplied.
    pub fn substitutor(&self) -> Option<&DictionarySubstitutor> {
        self.substitutor.as_deref()
    }

    pub fn substitution_enabled(&self) -> bool {
        self.substitution && self.substitutor.is_some()
    }

    pub fn dictionary(&self) -> Option<&SlangDictionary> {
        self.dictionary.as_deref()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline {
            cleaner: Arc::new(Cleanser),
            dictionary: None,
            substitutor: None,
            substitution: false,
        }
    }
}
