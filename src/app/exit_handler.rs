//! Exit code logic for the archiver process.
//!
//! Single responsibility: map saved/failed counts to the process exit outcome.

use archiver_core::ProgressCounters;

use crate::ProcessExit;

/// Determines the process exit outcome from the run totals.
pub(crate) fn determine_exit_outcome(totals: &ProgressCounters) -> ProcessExit {
    let saved = totals.self_posts + totals.media + totals.link;
    if totals.failed == 0 {
        ProcessExit::Success
    } else if saved > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::determine_exit_outcome;
    use crate::ProcessExit;
    use archiver_core::ProgressCounters;

    fn totals(media: u64, failed: u64) -> ProgressCounters {
        ProgressCounters {
            media,
            failed,
            ..ProgressCounters::default()
        }
    }

    #[test]
    fn test_exit_outcome_success_when_no_failures() {
        assert_eq!(determine_exit_outcome(&totals(3, 0)), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_success_when_nothing_processed() {
        assert_eq!(determine_exit_outcome(&totals(0, 0)), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_partial_when_mixed() {
        assert_eq!(determine_exit_outcome(&totals(2, 1)), ProcessExit::Partial);
    }

    #[test]
    fn test_exit_outcome_failure_when_all_failed() {
        let only_skips_and_failures = ProgressCounters {
            failed: 2,
            skipped_duplicate: 4,
            ..ProgressCounters::default()
        };
        assert_eq!(
            determine_exit_outcome(&only_skips_and_failures),
            ProcessExit::Failure
        );
    }
}
