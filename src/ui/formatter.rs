//! Pure formatting functions for UI output.
//!
//! The `format_*` functions build plain text and are testable; the `display_*`
//! functions print with colors.

use chrono::NaiveDateTime;
use console::style;

use crate::domain::{PlatformName, UserInput};
use crate::report::{CheckResult, Report};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Request header: time, goal, repository, platforms and branch.
pub fn format_summary(input: &UserInput, branch: &str, now: NaiveDateTime) -> String {
    let platforms = input
        .platforms()
        .iter()
        .map(PlatformName::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let mut summary = format!(
        "{}\n\nGoal: {}\nRepository: {}\nPlatforms: {}\nGit branch: {}\n",
        now.format("%Y-%m-%dT%H:%M:%S"),
        input.goal(),
        input.full_repository_name(),
        platforms,
        branch
    );
    if let Some(path) = input.local_path() {
        summary.push_str(&format!("Local path: {}\n", path.display()));
    }
    summary
}

/// Headline of a report without failures, e.g. "Validation was performed without any problems!"
pub fn format_success_line(report: &Report) -> String {
    let kind = report.kind().to_string().to_lowercase();
    let mut chars = kind.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{} was performed without any problems!", capitalized)
}

/// Report body.
///
/// Identical failures from several platforms are shown once with
/// `[For platforms: A,B]`, in order of first appearance.
pub fn format_report(report: &Report) -> String {
    if !report.has_failures() {
        return format_success_line(report);
    }

    let mut groups: Vec<(&CheckResult, Vec<PlatformName>)> = Vec::new();
    for failure in report.failures() {
        let existing = groups
            .iter_mut()
            .find(|(first, _)| first.code() == failure.code() && first.message() == failure.message());
        match existing {
            Some((_, platforms)) => platforms.extend(failure.platform()),
            None => groups.push((failure, failure.platform().into_iter().collect())),
        }
    }

    let mut text = format!("{} FAILED!\n\n", report.kind());
    for (failure, platforms) in groups {
        text.push_str(&failure.to_string());
        if !platforms.is_empty() {
            let names: Vec<&str> = platforms.iter().map(PlatformName::as_str).collect();
            text.push_str(&format!(" [For platforms: {}]", names.join(",")));
        }
        text.push('\n');
    }
    text
}

/// Print a report, green when clean and red otherwise.
pub fn display_report(report: &Report) {
    let text = format_report(report);
    if report.has_failures() {
        println!("{}", style(text).red());
    } else {
        println!("{}", style(text).green());
    }
}
