//! Results of lenient mutations.
//!
//! Guarded operations degrade to no-ops instead of failing. The outcome
//! types let callers see that a skip happened without forcing them to
//! handle an error.

/// Why a mutation was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No store context is bound.
    Unbound,
    /// A record with the same identity is already mirrored.
    Duplicate,
    /// The store context rejected the single-record write.
    StoreRejected,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unbound => "unbound",
            Self::Duplicate => "duplicate",
            Self::StoreRejected => "store_rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Skipped(SkipReason),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Applied => None,
            Self::Skipped(reason) => Some(*reason),
        }
    }
}

/// Tally of a batch operation; every element is attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub applied: usize,
    pub skipped: usize,
}

impl BatchOutcome {
    pub fn record(&mut self, outcome: MutationOutcome) {
        if outcome.is_applied() {
            self.applied += 1;
        } else {
            self.skipped += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.applied + self.skipped
    }
}

impl FromIterator<MutationOutcome> for BatchOutcome {
    fn from_iter<I: IntoIterator<Item = MutationOutcome>>(iter: I) -> Self {
        let mut batch = Self::default();
        for outcome in iter {
            batch.record(outcome);
        }
        batch
    }
}

/// Result of a diff-based replace: removals run first, then appends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub removed: BatchOutcome,
    pub appended: BatchOutcome,
}

impl ReplaceOutcome {
    /// True when the desired contents already matched the mirror.
    pub fn is_noop(&self) -> bool {
        self.removed.total() == 0 && self.appended.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchOutcome, MutationOutcome, SkipReason};

    #[test]
    fn batch_counts_applied_and_skipped() {
        let batch: BatchOutcome = [
            MutationOutcome::Applied,
            MutationOutcome::Skipped(SkipReason::Duplicate),
            MutationOutcome::Applied,
        ]
        .into_iter()
        .collect();

        assert_eq!(batch.applied, 2);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.total(), 3);
    }
}
