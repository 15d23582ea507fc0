//! Bag-of-words count matrix over a group of fragments.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("token pattern compiles"));

///Splits a fragment into count tokens: runs of word characters, case kept.
/// # Example
/// ```
/// use cdp_reasons::matrix::count_tokens;
/// assert_eq!(count_tokens("energy-efficient LED, lights"), vec!["energy", "efficient", "LED", "lights"]);
/// ```
pub fn count_tokens(fragment: &str) -> Vec<&str> {
    TOKEN_RE.find_iter(fragment).map(|m| m.as_str()).collect()
}

///Counts the quantity of each word. Returns HashMap<&str, u64>, with &str being the word and u64 the quantity
/// # Example
/// ```
/// use cdp_reasons::matrix::count_words;
/// let counted = count_words(&["one", "two", "two"]);
/// assert_eq!(counted["two"], 2);
/// assert_eq!(counted["one"], 1);
/// ```
pub fn count_words<'a>(words: &[&'a str]) -> HashMap<&'a str, u64> {
    let mut frequency: HashMap<&str, u64> = HashMap::new();
    for &word in words {
        *frequency.entry(word).or_insert(0) += 1;
    }
    frequency
}

/// Orders column indices by `counts` descending. Equal counts keep their
/// original column order, and at most `n` indices are returned.
pub fn top_indices(counts: &[u64], n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));
    order.truncate(n);
    order
}

/// Rows are fragments in input order followed by a synthetic `total` row;
/// columns are the sorted vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyMatrix {
    vocabulary: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    row_labels: Vec<String>,
    counts: Vec<Vec<u64>>,
}

impl FrequencyMatrix {
    /// # Example
    /// ```
    /// use cdp_reasons::matrix::FrequencyMatrix;
    /// let m = FrequencyMatrix::build(&["a a b", "b c"]);
    /// assert_eq!(m.vocabulary(), ["a", "b", "c"]);
    /// assert_eq!(m.total(), [2, 2, 1]);
    /// ```
    pub fn build<S: AsRef<str>>(fragments: &[S]) -> FrequencyMatrix {
        let tokenized: Vec<Vec<&str>> = fragments
            .iter()
            .map(|fragment| count_tokens(fragment.as_ref()))
            .collect();

        let vocabulary: Vec<String> = tokenized
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(String::from)
            .collect();
        let index: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(column, word)| (word.clone(), column))
            .collect();

        let mut counts: Vec<Vec<u64>> = tokenized
            .iter()
            .map(|tokens| {
                let mut row = vec![0; vocabulary.len()];
                for (word, count) in count_words(tokens) {
                    row[index[word]] = count;
                }
                row
            })
            .collect();

        let mut total = vec![0; vocabulary.len()];
        for row in &counts {
            for (sum, count) in total.iter_mut().zip(row) {
                *sum += count;
            }
        }
        counts.push(total);

        let mut row_labels: Vec<String> = (1..=fragments.len())
            .map(|i| format!("fragment {i}"))
            .collect();
        row_labels.push("total".to_string());

        FrequencyMatrix {
            vocabulary,
            index,
            row_labels,
            counts,
        }
    }

    /// True when no tokens were seen at all (zero columns).
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn column(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Number of fragment rows, not counting `total`.
    pub fn fragment_count(&self) -> usize {
        self.counts.len() - 1
    }

    /// Counts of the `i`-th input fragment.
    pub fn row(&self, i: usize) -> Option<&[u64]> {
        if i < self.fragment_count() {
            Some(&self.counts[i])
        } else {
            None
        }
    }

    /// Column-wise sum of all fragment rows.
    pub fn total(&self) -> &[u64] {
        &self.counts[self.counts.len() - 1]
    }

    pub fn count(&self, row: usize, word: &str) -> u64 {
        match (self.row(row), self.column(word)) {
            (Some(counts), Some(column)) => counts[column],
            _ => 0,
        }
    }

    /// Columns ranked by the counts of `row`, where `row == fragment_count()`
    /// addresses `total`. Empty for an out-of-range row.
    pub fn top_columns(&self, row: usize, n: usize) -> Vec<usize> {
        self.counts
            .get(row)
            .map(|counts| top_indices(counts, n))
            .unwrap_or_default()
    }

    /// The `n` most frequent words of the `total` row with their counts.
    pub fn top_total(&self, n: usize) -> Vec<(String, u64)> {
        let total = self.total();
        top_indices(total, n)
            .into_iter()
            .map(|column| (self.vocabulary[column].clone(), total[column]))
            .collect()
    }
}
