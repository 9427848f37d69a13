//! Failure and summary formatting.

use crate::runner::ExpectationFailure;

/// Format the failed expectations of one fixture, followed by the diff
/// report when one is available.
pub fn format_failure(
    fixture_name: &str,
    title: Option<&str>,
    failures: &[ExpectationFailure],
    report: Option<&str>,
) -> String {
    let mut output = format!("\nFAIL: {fixture_name}\n");
    if let Some(title) = title {
        output.push_str(&format!("  {title}\n"));
    }
    output.push('\n');

    for failure in failures {
        output.push_str(&format!(
            "  \u{2717} {}: expected `{}`, found `{}`\n",
            failure.check, failure.expected, failure.actual
        ));
    }

    if let Some(report) = report.filter(|r| !r.is_empty()) {
        output.push_str("\n  report:\n");
        for line in report.lines() {
            output.push_str(&format!("    {line}\n"));
        }
    }

    output
}

/// Format a summary of all results.
pub fn format_summary(fixture_name: &str, passed: usize, failed: usize) -> String {
    let status = if failed > 0 { "FAIL" } else { "PASS" };
    format!("\n{status}: {fixture_name}\n  {passed} passed, {failed} failed\n")
}
