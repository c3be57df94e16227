use std::collections::HashSet;

/// URLs already enqueued or fetched during one run
///
/// Owned by a single checker; each URL passes through [`VisitedSet::insert`]
/// successfully at most once.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as visited
    ///
    /// Returns true if the URL was not visited before, i.e. the caller now
    /// owns the only fetch of it.
    pub fn insert(&mut self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    /// Returns true if the URL has been visited
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Returns the number of visited URLs
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Returns whether no URL has been visited yet
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
