//! Report model: typed, mergeable collections of check results
//!
//! A [`Report`] is a monoid per [`ReportKind`]: [`Report::empty`] is the
//! identity and [`Report::merge`] concatenates results in order. Reports of
//! different kinds never merge.

use crate::domain::PlatformName;
use crate::error::{ReleaseDroidError, Result};
use std::fmt;

/// Kind of report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Validation,
    Release,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Validation => f.write_str("VALIDATION"),
            ReportKind::Release => f.write_str("RELEASE"),
        }
    }
}

/// Outcome of one check or one release action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    successful: bool,
    code: Option<String>,
    message: String,
    platform: Option<PlatformName>,
}

impl CheckResult {
    pub fn success(message: impl Into<String>) -> Self {
        CheckResult {
            successful: true,
            code: None,
            message: message.into(),
            platform: None,
        }
    }

    /// Failed result with a stable code such as `E-RD-VAL-5`
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            successful: false,
            code: Some(code.into()),
            message: message.into(),
            platform: None,
        }
    }

    /// Attribute the result to a platform unless it already has one
    pub fn for_platform(mut self, platform: PlatformName) -> Self {
        self.platform.get_or_insert(platform);
        self
    }

    pub fn is_successful(&self) -> bool {
        self.successful
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn platform(&self) -> Option<PlatformName> {
        self.platform
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, self.successful) {
            (Some(code), _) => write!(f, "{}: {}", code, self.message),
            (None, true) => write!(f, "Success. {}", self.message),
            (None, false) => write!(f, "Fail. {}", self.message),
        }
    }
}

/// Named, ordered collection of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    kind: ReportKind,
    results: Vec<CheckResult>,
}

impl Report {
    /// Identity element for merging reports of `kind`
    pub fn empty(kind: ReportKind) -> Self {
        Report {
            kind,
            results: Vec::new(),
        }
    }

    pub fn validation() -> Self {
        Self::empty(ReportKind::Validation)
    }

    pub fn release() -> Self {
        Self::empty(ReportKind::Release)
    }

    pub fn from_results(kind: ReportKind, results: impl IntoIterator<Item = CheckResult>) -> Self {
        Report {
            kind,
            results: results.into_iter().collect(),
        }
    }

    /// Report holding exactly one result
    pub fn single(kind: ReportKind, result: CheckResult) -> Self {
        Self::from_results(kind, [result])
    }

    /// Return this report with `result` appended
    pub fn with(mut self, result: CheckResult) -> Self {
        self.results.push(result);
        self
    }

    /// Concatenate two reports of the same kind, preserving order
    pub fn merge(mut self, other: Report) -> Result<Report> {
        if self.kind != other.kind {
            return Err(ReleaseDroidError::ReportMerge {
                left: self.kind,
                right: other.kind,
            });
        }
        self.results.extend(other.results);
        Ok(self)
    }

    /// Fold any number of reports into one, starting from the empty report
    pub fn merge_all(kind: ReportKind, reports: impl IntoIterator<Item = Report>) -> Result<Report> {
        reports
            .into_iter()
            .try_fold(Report::empty(kind), Report::merge)
    }

    /// Attribute every unattributed result to `platform`
    pub fn for_platform(self, platform: PlatformName) -> Self {
        Report {
            kind: self.kind,
            results: self
                .results
                .into_iter()
                .map(|r| r.for_platform(platform))
                .collect(),
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| !r.is_successful())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.is_successful())
    }

    /// Failures attributed to `platform` or to no platform at all
    pub fn has_failures_for(&self, platform: PlatformName) -> bool {
        self.failures()
            .any(|r| r.platform().map_or(true, |p| p == platform))
    }

    /// One-line verdict
    pub fn short_description(&self) -> String {
        let name = self.kind.to_string();
        if self.has_failures() {
            format!("{} Report: {} FAILED!", name, name)
        } else {
            format!("{} Report: {} is successful!", name, name.to_lowercase())
        }
    }

    /// Every result, one per line
    pub fn full_report(&self) -> String {
        self.results.iter().map(|r| format!("{}\n", r)).collect()
    }

    /// Failed results only, one per line
    pub fn failures_report(&self) -> String {
        self.failures().map(|r| format!("{}\n", r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: ReportKind, messages: &[&str]) -> Report {
        Report::from_results(kind, messages.iter().map(|m| CheckResult::success(*m)))
    }

    #[test]
    fn test_merge_same_kind_preserves_order() {
        let left = sample(ReportKind::Validation, &["a", "b"]);
        let right = sample(ReportKind::Validation, &["c"]);
        let merged = left.merge(right).unwrap();
        let messages: Vec<&str> = merged.results().iter().map(|r| r.message()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_different_kinds_fails() {
        let err = Report::validation().merge(Report::release()).unwrap_err();
        assert!(matches!(err, ReleaseDroidError::ReportMerge { .. }));
    }

    #[test]
    fn test_empty_is_identity() {
        let report = sample(ReportKind::Release, &["x", "y"]);
        assert_eq!(Report::release().merge(report.clone()).unwrap(), report);
        assert_eq!(report.clone().merge(Report::release()).unwrap(), report);
    }

    #[test]
    fn test_merge_is_associative() {
        let a = sample(ReportKind::Validation, &["a"]);
        let b = sample(ReportKind::Validation, &["b1", "b2"]);
        let c = sample(ReportKind::Validation, &["c"]);
        let left = a.clone().merge(b.clone()).unwrap().merge(c.clone()).unwrap();
        let right = a.merge(b.merge(c).unwrap()).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn test_has_failures_iff_any_failed() {
        let report = sample(ReportKind::Validation, &["ok"]);
        assert!(!report.has_failures());
        let report = report.with(CheckResult::failure("E-RD-VAL-5", "missing link"));
        assert!(report.has_failures());
        assert!(!Report::validation().has_failures());
    }

    #[test]
    fn test_platform_attribution() {
        let report = Report::validation()
            .with(CheckResult::failure("E-1", "shared"))
            .with(CheckResult::failure("E-2", "maven only").for_platform(PlatformName::Maven))
            .for_platform(PlatformName::Github);
        assert_eq!(report.results()[0].platform(), Some(PlatformName::Github));
        assert_eq!(report.results()[1].platform(), Some(PlatformName::Maven));
        assert!(report.has_failures_for(PlatformName::Maven));
        assert!(!report.has_failures_for(PlatformName::Community));
    }

    #[test]
    fn test_descriptions() {
        let report = Report::validation().with(CheckResult::success("Version format."));
        assert_eq!(
            report.short_description(),
            "VALIDATION Report: validation is successful!"
        );
        assert_eq!(report.full_report(), "Success. Version format.\n");

        let report = report.with(CheckResult::failure("E-RD-VAL-8", "no body"));
        assert_eq!(report.short_description(), "VALIDATION Report: VALIDATION FAILED!");
        assert_eq!(report.failures_report(), "E-RD-VAL-8: no body\n");
    }

    #[test]
    fn test_merge_all() {
        let merged = Report::merge_all(
            ReportKind::Release,
            vec![
                sample(ReportKind::Release, &["maven"]),
                sample(ReportKind::Release, &["github"]),
            ],
        )
        .unwrap();
        assert_eq!(merged.results().len(), 2);

        let err = Report::merge_all(ReportKind::Release, vec![Report::validation()]);
        assert!(err.is_err());
    }
}
