//! Per-run outcome accounting.

use std::fmt;

/// What happened to each visited page. One page's failure never aborts the
/// run; it lands here instead.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Pages persisted (written locally or created remotely).
    pub created: u64,
    /// Pages skipped because their source was already processed this run.
    pub duplicates: u64,
    /// Pages declined by the operator at the verification prompt.
    pub declined: u64,
    /// Pages skipped after an error at some pipeline stage.
    pub failed: u64,
}

impl RunSummary {
    pub fn visited(&self) -> u64 {
        self.created + self.duplicates + self.declined + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} duplicates skipped, {} declined, {} failed",
            self.created, self.duplicates, self.declined, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_all_counters() {
        let summary = RunSummary {
            created: 3,
            duplicates: 1,
            declined: 0,
            failed: 2,
        };
        assert_eq!(summary.visited(), 6);
        assert_eq!(
            summary.to_string(),
            "3 created, 1 duplicates skipped, 0 declined, 2 failed"
        );
    }
}
