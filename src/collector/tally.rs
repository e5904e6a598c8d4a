use std::collections::HashMap;

/// Genre → occurrence count.
///
/// Counts are kept in discovery order, so the report breaks ties the same way
/// on every run over the same data.
///
/// # Example
///
/// ```rust,ignore
/// let mut tally = GenreTally::new();
/// tally.tally(["indie", "pop"]);
/// tally.tally(["indie"]);
/// assert_eq!(tally.report(), vec![("indie".to_string(), 2), ("pop".to_string(), 1)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GenreTally {
    index: HashMap<String, usize>,
    counts: Vec<(String, u64)>,
}

impl GenreTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to every genre in `genres`. Calling it twice with the same set
    /// counts twice.
    pub fn tally<I, S>(&mut self, genres: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for genre in genres {
            let genre = genre.as_ref();
            match self.index.get(genre) {
                Some(&position) => self.counts[position].1 += 1,
                None => {
                    self.index.insert(genre.to_string(), self.counts.len());
                    self.counts.push((genre.to_string(), 1));
                }
            }
        }
    }

    /// Occurrences of `genre` so far, 0 for a genre never seen.
    pub fn count(&self, genre: &str) -> u64 {
        self.index
            .get(genre)
            .map(|&position| self.counts[position].1)
            .unwrap_or(0)
    }

    /// Number of distinct genres.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(genre, count)` pairs by descending count; equal counts keep discovery order.
    pub fn report(&self) -> Vec<(String, u64)> {
        let mut report = self.counts.clone();
        report.sort_by(|a, b| b.1.cmp(&a.1));
        report
    }
}
