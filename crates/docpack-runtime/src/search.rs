//! Member search over the primary language index.

use docpack_site::SearchIndexEntry;

/// Bounded substring search over member signatures.
#[derive(Clone, Debug)]
pub struct SearchIndex {
    entries: Vec<SearchIndexEntry>,
    limit: usize,
}

impl SearchIndex {
    #[must_use]
    pub fn new(entries: Vec<SearchIndexEntry>, limit: usize) -> Self {
        Self { entries, limit }
    }

    /// Entries whose signature contains `query`, ignoring case.
    ///
    /// The query is trimmed; a blank query matches nothing. At most `limit`
    /// entries are returned, in index order.
    #[must_use]
    pub fn query(&self, query: &str) -> Vec<&SearchIndexEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| entry.signature.to_lowercase().contains(&needle))
            .take(self.limit)
            .collect()
    }

    pub fn entries(&self) -> &[SearchIndexEntry] {
        &self.entries
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}
