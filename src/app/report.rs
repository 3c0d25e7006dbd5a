//! End-of-run summary printed to stdout.

use archiver_core::RunSummary;

pub(crate) fn render_summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::with_capacity(summary.sources.len() + 2);
    for report in &summary.sources {
        lines.push(format!("{}: {}", report.source, report.counters));
    }
    let processed = summary.totals.total();
    let elapsed = summary.elapsed.as_secs_f64();
    let rate = if processed == 0 {
        String::from("n/a")
    } else {
        #[allow(clippy::cast_precision_loss)]
        let per_post = elapsed / processed as f64;
        format!("{per_post:.2}s/post")
    };
    lines.push(format!("total: {}", summary.totals));
    lines.push(format!(
        "processed {processed} posts in {elapsed:.1}s ({rate}) over {} run(s)",
        summary.cycles
    ));
    lines
}

pub(crate) fn print_run_summary(summary: &RunSummary) {
    for line in render_summary_lines(summary) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::render_summary_lines;
    use archiver_core::{ProgressCounters, RunSummary, SourceReport};
    use std::time::Duration;

    #[test]
    fn test_summary_lists_each_source_then_totals() {
        let counters = ProgressCounters {
            self_posts: 2,
            media: 2,
            ..ProgressCounters::default()
        };
        let summary = RunSummary {
            sources: vec![
                SourceReport {
                    source: "r/rust".to_string(),
                    counters,
                },
                SourceReport {
                    source: "u/someone".to_string(),
                    counters: ProgressCounters::default(),
                },
            ],
            totals: counters,
            elapsed: Duration::from_secs(8),
            cycles: 1,
        };

        let lines = render_summary_lines(&summary);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("r/rust: { self: 2, media: 2"));
        assert!(lines[1].starts_with("u/someone:"));
        assert!(lines[2].starts_with("total:"));
        assert_eq!(lines[3], "processed 4 posts in 8.0s (2.00s/post) over 1 run(s)");
    }

    #[test]
    fn test_summary_without_posts_has_no_rate() {
        let lines = render_summary_lines(&RunSummary::default());
        assert_eq!(
            lines.last().map(String::as_str),
            Some("processed 0 posts in 0.0s (n/a) over 0 run(s)")
        );
    }
}
