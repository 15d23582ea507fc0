//! Text normalization as a fixed pipeline of pure stages:
//! lemmatize, then strip collection words, then strip stopwords.

use std::collections::HashSet;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;

use crate::lemma;
use crate::stopwords;

/// Word tokens; inner `-` and `.` stay inside a token ("coal-fired", "1.5").
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:[-.]\w+)*").expect("word pattern compiles"));

/// Which stages [`process`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub lemmatize: bool,
    pub remove_collection_words: bool,
    pub remove_stopwords: bool,
}

impl NormalizeOptions {
    /// Every stage on, as used for disclosure reasons.
    pub const FULL: NormalizeOptions = NormalizeOptions {
        lemmatize: true,
        remove_collection_words: true,
        remove_stopwords: true,
    };

    /// Only the two removal stages.
    pub const REMOVE_ONLY: NormalizeOptions = NormalizeOptions {
        lemmatize: false,
        remove_collection_words: true,
        remove_stopwords: true,
    };
}

///Splits text into word tokens, dropping punctuation.
/// # Example
/// ```
/// use cdp_reasons::normalize::tokenize;
/// let tokens = tokenize("coal-fired plants (closed), 1.5% less!");
/// assert_eq!(tokens, vec!["coal-fired", "plants", "closed", "1.5", "less"]);
/// ```
pub fn tokenize(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Replaces every token by its lemma under its tagged part of speech.
pub fn lemmatize_text(text: &str) -> String {
    let tokens = tokenize(text);
    let tags = lemma::tag(&tokens);
    tokens
        .iter()
        .zip(tags)
        .map(|(token, pos)| lemma::lemmatize(token, pos))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops tokens exactly equal to one of `words`.
pub fn remove_words<S: AsRef<str>>(text: &str, words: &[S]) -> String {
    let words: HashSet<&str> = words.iter().map(|w| w.as_ref()).collect();
    tokenize(text)
        .into_iter()
        .filter(|token| !words.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops standard English stopwords; the list is just another word set.
pub fn remove_stopwords(text: &str) -> String {
    remove_words(text, stopwords::ENGLISH)
}

/// Runs the enabled stages in order and returns the remaining tokens joined
/// by single spaces. Returns `""` when nothing survives.
///
/// ```
/// use cdp_reasons::normalize::{NormalizeOptions, process};
/// let collection = ["emission", "increase", "due"];
/// let out = process(
///     "emissions increased due to the growth of the city's population",
///     &collection,
///     NormalizeOptions::FULL,
/// );
/// assert_eq!(out, "growth city population");
/// ```
pub fn process<S: AsRef<str>>(
    fragment: &str,
    collection_words: &[S],
    options: NormalizeOptions,
) -> String {
    let text = tokenize(fragment).join(" ");
    let text = if options.lemmatize {
        lemmatize_text(&text)
    } else {
        text
    };
    let text = if options.remove_collection_words {
        remove_words(&text, collection_words)
    } else {
        text
    };
    if options.remove_stopwords {
        remove_stopwords(&text)
    } else {
        text
    }
}

/// A collection-word set bound to a stage selection.
#[derive(Debug, Clone)]
pub struct Normalizer {
    collection_words: Vec<String>,
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new<I, S>(collection_words: I, options: NormalizeOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Normalizer {
            collection_words: collection_words.into_iter().map(Into::into).collect(),
            options,
        }
    }

    pub fn collection_words(&self) -> &[String] {
        &self.collection_words
    }

    pub fn process(&self, fragment: &str) -> String {
        process(fragment, &self.collection_words, self.options)
    }

    /// Normalizes every fragment; output order matches input order.
    pub fn process_all<S: AsRef<str> + Sync>(&self, fragments: &[S]) -> Vec<String> {
        fragments
            .par_iter()
            .map(|fragment| self.process(fragment.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_STAGES: NormalizeOptions = NormalizeOptions {
        lemmatize: false,
        remove_collection_words: false,
        remove_stopwords: false,
    };

    #[test]
    fn empty_input_gives_empty_output() {
        let none: [&str; 0] = [];
        assert_eq!(process("", &none, NormalizeOptions::FULL), "");
        assert_eq!(process("  ,;  ", &none, NormalizeOptions::FULL), "");
        assert_eq!(process("the and of", &none, NormalizeOptions::FULL), "");
    }

    #[test]
    fn no_stages_only_rejoins_tokens() {
        let none: [&str; 0] = [];
        assert_eq!(
            process("more  buses,   fewer cars", &none, NO_STAGES),
            "more buses fewer cars"
        );
    }

    #[test]
    fn collection_words_match_after_lemmatization() {
        let collection = ["emission", "reduction"];
        let lemmatized = process("emissions reductions", &collection, NormalizeOptions::FULL);
        assert_eq!(lemmatized, "");
        let raw = process(
            "emissions reductions",
            &collection,
            NormalizeOptions::REMOVE_ONLY,
        );
        assert_eq!(raw, "emissions reductions");
    }

    #[test]
    fn collection_words_are_case_sensitive() {
        let collection = ["emission"];
        assert_eq!(remove_words("Emission emission", &collection), "Emission");
    }

    #[test]
    fn stopwords_behave_like_a_collection_set() {
        let text = "the city has more buses and the trains";
        assert_eq!(remove_stopwords(text), remove_words(text, stopwords::ENGLISH));
        assert_eq!(remove_stopwords(text), "city buses trains");
    }

    #[test]
    fn removal_stages_are_idempotent() {
        let collection = ["emission", "increase", "decrease", "year", "due"];
        let fragments = [
            "emissions increased due to new waste facilities and more inhabitants",
            "decrease in electricity consumption of public buildings",
            "the methodology was changed this year",
        ];
        for fragment in fragments {
            let once = process(fragment, &collection, NormalizeOptions::FULL);
            let twice = process(&once, &collection, NormalizeOptions::REMOVE_ONLY);
            let a: HashSet<&str> = tokenize(&once).into_iter().collect();
            let b: HashSet<&str> = tokenize(&twice).into_iter().collect();
            assert_eq!(a, b, "fragment: {fragment}");
        }
    }

    #[test]
    fn normalizer_keeps_fragment_order() {
        let normalizer = Normalizer::new(["emission"], NormalizeOptions::FULL);
        let out = normalizer.process_all(&["emissions from buses", "", "cars and trucks"]);
        assert_eq!(out, vec!["bus", "", "car truck"]);
    }
}
