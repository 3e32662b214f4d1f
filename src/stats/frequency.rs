//! Streaming frequency counts with first-seen ordering.

use indexmap::IndexMap;

/// Occurrence counts per entity string, as emitted (case preserved).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: IndexMap<String, usize>,
    total: usize,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, text: &str) {
        // get_mut first so repeated keys do not allocate
        match self.counts.get_mut(text) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(text.to_string(), 1);
            }
        }
        self.total += 1;
    }

    pub fn extend<I, S>(&mut self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for text in texts {
            self.record(text.as_ref());
        }
    }

    /// Fold a partial table into this one. Keys new to `self` are appended
    /// in `other`'s first-seen order.
    pub fn merge(&mut self, other: FrequencyTable) {
        for (text, count) in other.counts {
            *self.counts.entry(text).or_insert(0) += count;
        }
        self.total += other.total;
    }

    pub fn count(&self, text: &str) -> usize {
        self.counts.get(text).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct strings.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `n` most frequent strings, highest count first; equal counts keep
    /// first-seen order.
    pub fn top_n(&self, n: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(text, count)| (text.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}
