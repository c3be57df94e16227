use super::{LinkResult, LinkStatus};

/// Append-only, ordered record of every classified link in a run
#[derive(Debug, Default, Clone)]
pub struct ResultLog {
    entries: Vec<LinkResult>,
}

impl ResultLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result
    pub fn push(&mut self, result: LinkResult) {
        self.entries.push(result);
    }

    /// Returns all results in the order they were recorded
    pub fn entries(&self) -> &[LinkResult] {
        &self.entries
    }

    /// Counts results with the given status
    pub fn count(&self, status: LinkStatus) -> usize {
        self.entries.iter().filter(|r| r.status == status).count()
    }

    /// Returns the number of results
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the log, returning the results
    pub fn into_entries(self) -> Vec<LinkResult> {
        self.entries
    }
}
