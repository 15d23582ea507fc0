//! Coarse part-of-speech tagging and rule-based lemmatization.
//!
//! The tagger assigns one of four categories from a small closed-class
//! lexicon, irregular forms, suffixes and the previous token. The lemmatizer
//! follows the WordNet detachment rules (`-s`, `-es`, `-ies`, `-ed`, `-ing`,
//! `-er`, `-est`), but without a full dictionary it leans on exception tables
//! and orthographic checks to pick one candidate.

use crate::stopwords;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosTag {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

/// Tags every token. Tokens are matched lower-case; unknown words are nouns.
///
/// ```
/// use cdp_reasons::lemma::{PosTag, tag};
/// let tags = tag(&["emissions", "were", "reduced", "quickly"]);
/// assert_eq!(tags, vec![PosTag::Noun, PosTag::Verb, PosTag::Verb, PosTag::Adverb]);
/// ```
pub fn tag<S: AsRef<str>>(tokens: &[S]) -> Vec<PosTag> {
    let mut tags = Vec::with_capacity(tokens.len());
    let mut prev: Option<String> = None;
    for token in tokens {
        let word = token.as_ref().to_lowercase();
        tags.push(tag_word(&word, prev.as_deref()));
        prev = Some(word);
    }
    tags
}

fn tag_word(word: &str, prev: Option<&str>) -> PosTag {
    if verb_exception(word).is_some() {
        return PosTag::Verb;
    }
    if is_function_word(word) {
        return PosTag::Noun;
    }
    if adverb_exception(word).is_some() || is_adverb(word) {
        return PosTag::Adverb;
    }
    if adjective_base(word).is_some() || has_adjective_suffix(word) {
        return PosTag::Adjective;
    }
    let after_determiner = prev.is_some_and(is_determiner);
    if is_participle(word) {
        return if after_determiner {
            PosTag::Adjective
        } else {
            PosTag::Verb
        };
    }
    if is_gerund(word) {
        return if after_determiner {
            PosTag::Noun
        } else {
            PosTag::Verb
        };
    }
    if prev.is_some_and(is_verb_context) {
        return PosTag::Verb;
    }
    PosTag::Noun
}

/// Reduces `word` to its base form under `pos`.
///
/// Only all-lowercase ASCII words are rewritten; numbers, hyphenated
/// compounds and function words come back unchanged.
///
/// ```
/// use cdp_reasons::lemma::{PosTag, lemmatize};
/// assert_eq!(lemmatize("cities", PosTag::Noun), "city");
/// assert_eq!(lemmatize("reduced", PosTag::Verb), "reduce");
/// assert_eq!(lemmatize("larger", PosTag::Adjective), "large");
/// ```
pub fn lemmatize(word: &str, pos: PosTag) -> String {
    if !word.bytes().all(|b| b.is_ascii_lowercase()) {
        return word.to_string();
    }
    match pos {
        PosTag::Verb => {
            if let Some(base) = verb_exception(word) {
                return base.to_string();
            }
            if is_function_word(word) {
                return word.to_string();
            }
            lemmatize_verb(word)
        }
        _ if is_function_word(word) => word.to_string(),
        PosTag::Noun => lemmatize_noun(word),
        PosTag::Adjective => adjective_base(word).unwrap_or_else(|| word.to_string()),
        PosTag::Adverb => adverb_exception(word).unwrap_or(word).to_string(),
    }
}

fn lemmatize_noun(word: &str) -> String {
    if let Some(base) = noun_exception(word) {
        return base.to_string();
    }
    if word.len() <= 3 || is_singular_in_s(word) {
        return word.to_string();
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("es") {
        if stem.ends_with("ss")
            || stem.ends_with("sh")
            || stem.ends_with("ch")
            || stem.ends_with('x')
            || stem.ends_with("zz")
        {
            return stem.to_string();
        }
    }
    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}

fn lemmatize_verb(word: &str) -> String {
    if word.len() <= 3 {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("es") {
        if stem.ends_with("ss")
            || stem.ends_with("sh")
            || stem.ends_with("ch")
            || stem.ends_with('x')
            || stem.ends_with("zz")
            || stem.ends_with('o')
        {
            return stem.to_string();
        }
        return format!("{stem}e");
    }
    if word.ends_with('s') {
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return word.to_string();
        }
        return word[..word.len() - 1].to_string();
    }
    if word.ends_with("eed") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ied") {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("ed") {
        if has_vowel(stem) {
            return restore_stem(stem);
        }
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ing") {
        if has_vowel(stem) {
            return restore_stem(stem);
        }
    }
    word.to_string()
}

/// Undoes consonant doubling or restores a dropped silent `e`.
fn restore_stem(stem: &str) -> String {
    let b = stem.as_bytes();
    let n = b.len();
    if n >= 3 && b[n - 1] == b[n - 2] && !is_vowel(b[n - 1]) {
        let keep_double = match b[n - 1] {
            b's' | b'f' | b'z' => true,
            b'l' => !(stem.ends_with("ell") || (stem.ends_with("oll") && n > 5)),
            _ => false,
        };
        if !keep_double {
            return stem[..n - 1].to_string();
        }
        return stem.to_string();
    }
    if needs_silent_e(stem) {
        return format!("{stem}e");
    }
    stem.to_string()
}

fn needs_silent_e(stem: &str) -> bool {
    let b = stem.as_bytes();
    let n = b.len();
    if n < 2 || matches!(stem, "focus" | "bias" | "gas") {
        return false;
    }
    let last = b[n - 1];
    let prev = b[n - 2];
    // vowel + final consonant, with no vowel before it ("at" in "calculat", not "eat")
    let single_vowel = is_vowel(prev)
        && (n < 3 || !is_vowel(b[n - 3]) || (b[n - 3] == b'u' && n >= 4 && b[n - 4] == b'q'));
    match last {
        b'c' | b'v' | b'z' | b's' | b'u' => true,
        b'g' => {
            stem.ends_with("ang")
                || stem.ends_with("eng")
                || matches!(prev, b'r' | b'd')
                || (prev == b'a' && single_vowel)
        }
        b't' => single_vowel && matches!(prev, b'a' | b'u' | b'o'),
        b'd' => single_vowel,
        b'r' => {
            single_vowel
                && match prev {
                    b'a' | b'i' | b'u' => true,
                    b'o' => n <= 6 && !matches!(b[n - 3], b't' | b's' | b'h' | b'l' | b'n'),
                    _ => false,
                }
        }
        b'l' => single_vowel && matches!(prev, b'u' | b'i'),
        b'n' => single_vowel && prev == b'i',
        b'm' => single_vowel && prev == b'u',
        b'k' => single_vowel && matches!(prev, b'a' | b'o'),
        b'p' => single_vowel && n <= 4 && matches!(prev, b'a' | b'o' | b'y'),
        b'b' => single_vowel && prev == b'i',
        _ => false,
    }
}

/// Base form of a comparative/superlative adjective, or of a base adjective.
fn adjective_base(word: &str) -> Option<String> {
    if !word.is_ascii() {
        return None;
    }
    if let Some(base) = adjective_exception(word) {
        return Some(base.to_string());
    }
    if BASE_ADJECTIVES.contains(&word) {
        return Some(word.to_string());
    }
    let stem = word
        .strip_suffix("est")
        .or_else(|| word.strip_suffix("er"))?;
    if stem.len() < 2 {
        return None;
    }
    let mut candidates = vec![stem.to_string(), format!("{stem}e")];
    let b = stem.as_bytes();
    let n = b.len();
    if n >= 3 && b[n - 1] == b[n - 2] {
        candidates.push(stem[..n - 1].to_string());
    }
    if let Some(head) = stem.strip_suffix('i') {
        candidates.push(format!("{head}y"));
    }
    candidates
        .into_iter()
        .find(|c| BASE_ADJECTIVES.contains(&c.as_str()))
}

fn is_function_word(word: &str) -> bool {
    (stopwords::ENGLISH.contains(&word) && verb_exception(word).is_none())
        || EXTRA_FUNCTION_WORDS.contains(&word)
}

fn is_adverb(word: &str) -> bool {
    word.len() > 4 && word.ends_with("ly") && !NON_ADVERBS_IN_LY.contains(&word)
}

fn has_adjective_suffix(word: &str) -> bool {
    word.len() > 4
        && ["ous", "ful", "ive", "able", "ible", "ical", "less"]
            .iter()
            .any(|suffix| word.ends_with(suffix))
}

fn is_participle(word: &str) -> bool {
    word.len() > 3
        && word.ends_with("ed")
        && !word.ends_with("eed")
        && has_vowel(&word[..word.len() - 2])
        && !NOT_PARTICIPLES.contains(&word)
}

fn is_gerund(word: &str) -> bool {
    word.len() > 4
        && word.ends_with("ing")
        && has_vowel(&word[..word.len() - 3])
        && !NOT_GERUNDS.contains(&word)
}

fn is_determiner(word: &str) -> bool {
    matches!(
        word,
        "the" | "a" | "an" | "this" | "that" | "these" | "those" | "our" | "their" | "its"
            | "his" | "her" | "my" | "your" | "of" | "more" | "most" | "less" | "any" | "some"
            | "no" | "each" | "every"
    )
}

fn is_verb_context(word: &str) -> bool {
    matches!(
        word,
        "to" | "will" | "would" | "can" | "could" | "should" | "may" | "might" | "must" | "we"
            | "they" | "i" | "you" | "he" | "she" | "it" | "which" | "who"
    )
}

fn is_singular_in_s(word: &str) -> bool {
    matches!(
        word,
        "news" | "series" | "species" | "means" | "physics" | "economics" | "mathematics"
            | "politics" | "logistics" | "lens" | "canvas" | "atlas" | "chaos" | "ethos"
            | "whereas" | "perhaps" | "always" | "sometimes" | "thus" | "plus" | "yes"
    )
}

fn has_vowel(s: &str) -> bool {
    s.bytes().any(is_vowel)
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn verb_exception(word: &str) -> Option<&'static str> {
    Some(match word {
        "am" | "is" | "are" | "was" | "were" | "been" | "being" => "be",
        "has" | "had" | "having" => "have",
        "does" | "did" | "done" | "doing" => "do",
        "goes" | "went" | "gone" => "go",
        "made" | "making" => "make",
        "took" | "taken" | "taking" => "take",
        "undertook" | "undertaken" => "undertake",
        "gave" | "given" | "giving" => "give",
        "grew" | "grown" => "grow",
        "fell" | "fallen" => "fall",
        "rose" | "risen" => "rise",
        "arose" | "arisen" => "arise",
        "began" | "begun" => "begin",
        "built" => "build",
        "bought" => "buy",
        "brought" => "bring",
        "came" => "come",
        "became" => "become",
        "got" | "gotten" => "get",
        "kept" => "keep",
        "led" => "lead",
        "left" => "leave",
        "lost" => "lose",
        "meant" => "mean",
        "met" => "meet",
        "paid" => "pay",
        "ran" => "run",
        "said" => "say",
        "saw" | "seen" => "see",
        "sold" => "sell",
        "sent" => "send",
        "spent" => "spend",
        "stood" => "stand",
        "understood" => "understand",
        "thought" => "think",
        "told" => "tell",
        "won" => "win",
        "wrote" | "written" => "write",
        "drove" | "driven" => "drive",
        "drew" | "drawn" => "draw",
        "withdrew" | "withdrawn" => "withdraw",
        "fed" => "feed",
        "held" => "hold",
        "knew" | "known" => "know",
        "shown" => "show",
        "sought" => "seek",
        "taught" => "teach",
        "caught" => "catch",
        "dealt" => "deal",
        "threw" | "thrown" => "throw",
        "chose" | "chosen" => "choose",
        "found" => "find",
        "felt" => "feel",
        "heard" => "hear",
        "struck" => "strike",
        "shrank" | "shrunk" => "shrink",
        "sank" | "sunk" => "sink",
        "added" | "adding" => "add",
        "created" | "creating" => "create",
        "agreed" => "agree",
        "freed" => "free",
        "guaranteed" => "guarantee",
        "focused" | "focusing" | "focuses" | "focussed" => "focus",
        "biased" => "bias",
        "dying" => "die",
        "lying" => "lie",
        "tying" => "tie",
        _ => return None,
    })
}

fn noun_exception(word: &str) -> Option<&'static str> {
    Some(match word {
        "children" => "child",
        "people" => "person",
        "men" => "man",
        "women" => "woman",
        "feet" => "foot",
        "teeth" => "tooth",
        "mice" => "mouse",
        "geese" => "goose",
        "lives" => "life",
        "leaves" => "leaf",
        "halves" => "half",
        "shelves" => "shelf",
        "wives" => "wife",
        "knives" => "knife",
        "analyses" => "analysis",
        "crises" => "crisis",
        "theses" => "thesis",
        "hypotheses" => "hypothesis",
        "criteria" => "criterion",
        "phenomena" => "phenomenon",
        "indices" => "index",
        "matrices" => "matrix",
        "media" => "medium",
        "gases" => "gas",
        "biases" => "bias",
        "buses" => "bus",
        "sizes" => "size",
        _ => return None,
    })
}

fn adjective_exception(word: &str) -> Option<&'static str> {
    Some(match word {
        "better" | "best" => "good",
        "worse" | "worst" => "bad",
        "farther" | "farthest" => "far",
        _ => return None,
    })
}

fn adverb_exception(word: &str) -> Option<&'static str> {
    Some(match word {
        "likelier" | "likeliest" => "likely",
        _ => return None,
    })
}

const BASE_ADJECTIVES: &[&str] = &[
    "high", "low", "great", "large", "small", "big", "warm", "cold", "hot", "cool", "wide",
    "cheap", "strong", "weak", "fast", "slow", "long", "short", "clean", "green", "new", "old",
    "close", "early", "easy", "late", "heavy", "wet", "dry", "mild", "hard", "soft", "safe",
    "rich", "poor", "dense", "broad", "deep", "steep", "tight", "sharp", "smart", "quick",
    "simple", "fine", "full", "busy", "dirty", "healthy", "wealthy", "harsh", "fair", "near",
    "likely", "costly", "hungry", "good", "bad", "far",
];

const EXTRA_FUNCTION_WORDS: &[&str] = &[
    "also", "although", "however", "thus", "via", "within", "without", "across", "among",
    "amongst", "per", "upon", "whereas", "towards", "toward", "despite", "since", "unless",
    "perhaps", "less", "us", "yet", "nothing", "something", "anything", "everything", "whether",
    "either", "neither", "already", "still", "even", "ever", "never",
];

const NON_ADVERBS_IN_LY: &[&str] = &[
    "supply", "family", "reply", "apply", "rely", "italy", "july", "assembly", "monopoly",
    "anomaly", "butterfly", "ally", "comply", "multiply", "imply", "jelly", "belly", "bully",
    "early", "likely", "costly", "friendly", "only",
];

const NOT_PARTICIPLES: &[&str] = &[
    "hundred", "kindred", "sacred", "naked", "wicked", "ragged", "rugged", "beloved", "sled",
];

const NOT_GERUNDS: &[&str] = &[
    "during", "morning", "evening", "ceiling", "sibling", "pudding", "nothing", "something",
    "anything", "everything",
];
