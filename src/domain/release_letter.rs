//! Release letter model: one `changes_<version>.md` document

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Ticket reference token in a release letter body
pub const TICKET_PATTERN: &str = r"#([1-9]\d*)\b";
/// Release date token in the title line
pub const DATE_PATTERN: &str = r"\d{4}-\d{2}-\d{2}";

const VERSION_TOKEN_PATTERN: &str = r"\b(\d+\.\d+\.\d+)\b";
const CODE_NAME_PREFIX: &str = "Code name:";
const SUMMARY_HEADING: &str = "## Summary";

fn ticket_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TICKET_PATTERN).expect("ticket pattern is valid"))
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DATE_PATTERN).expect("date pattern is valid"))
}

fn version_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_TOKEN_PATTERN).expect("version pattern is valid"))
}

/// Parsed, immutable release letter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLetter {
    file_name: String,
    header: Option<String>,
    body: Option<String>,
    version_number: Option<String>,
    release_date: Option<NaiveDate>,
    ticket_numbers: Vec<u32>,
}

impl ReleaseLetter {
    /// Start building a letter for the given file name
    pub fn builder(file_name: impl Into<String>) -> ReleaseLetterBuilder {
        ReleaseLetterBuilder {
            file_name: file_name.into(),
            header: None,
            body: None,
            version_number: None,
            release_date: None,
        }
    }

    /// Parse the raw markdown of a changes file.
    ///
    /// Expected layout:
    ///
    /// ```text
    /// # My Project 1.2.0, released 2024-05-17
    ///
    /// Code name: Faster uploads
    ///
    /// ## Summary
    /// ...
    /// ## Bug fixes
    /// * #42: Fixed ...
    /// ```
    pub fn parse(file_name: impl Into<String>, content: &str) -> Self {
        let mut lines = content.lines();
        let title = lines
            .by_ref()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("");
        let rest: Vec<&str> = lines.collect();

        let mut builder = ReleaseLetter::builder(file_name);
        if title.trim_start().starts_with('#') {
            if let Some(found) = version_token_regex().captures(title) {
                builder = builder.version_number(&found[1]);
            }
            if let Some(date) = date_regex()
                .find(title)
                .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
            {
                builder = builder.release_date(date);
            }
        }

        let code_name_index = rest
            .iter()
            .position(|line| line.trim_start().starts_with(CODE_NAME_PREFIX));
        let body_lines = match code_name_index {
            Some(index) => {
                let header = rest[index].trim_start()[CODE_NAME_PREFIX.len()..].trim();
                builder = builder.header(header);
                &rest[index + 1..]
            }
            None => &rest[..],
        };
        builder.body(body_lines.join("\n")).build()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Code name, used as the forge release title
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn version_number(&self) -> Option<&str> {
        self.version_number.as_deref()
    }

    pub fn release_date(&self) -> Option<NaiveDate> {
        self.release_date
    }

    /// Ticket numbers in order of appearance; duplicates are kept
    pub fn ticket_numbers(&self) -> &[u32] {
        &self.ticket_numbers
    }

    /// Text of the `## Summary` section, if present and non-empty
    pub fn summary(&self) -> Option<String> {
        let body = self.body.as_deref()?;
        let start = body.find(SUMMARY_HEADING)? + SUMMARY_HEADING.len();
        let section = &body[start..];
        let end = section.find("\n## ").unwrap_or(section.len());
        let summary = section[..end].trim();
        (!summary.is_empty()).then(|| summary.to_string())
    }
}

/// Builder for [`ReleaseLetter`]
#[derive(Debug, Clone)]
pub struct ReleaseLetterBuilder {
    file_name: String,
    header: Option<String>,
    body: Option<String>,
    version_number: Option<String>,
    release_date: Option<NaiveDate>,
}

impl ReleaseLetterBuilder {
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn version_number(mut self, version: impl Into<String>) -> Self {
        self.version_number = Some(version.into());
        self
    }

    pub fn release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn build(self) -> ReleaseLetter {
        let header = self
            .header
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());
        let body = self
            .body
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());
        let ticket_numbers = body
            .as_deref()
            .map(|text| {
                ticket_regex()
                    .captures_iter(text)
                    .filter_map(|c| c[1].parse::<u32>().ok())
                    .collect()
            })
            .unwrap_or_default();

        ReleaseLetter {
            file_name: self.file_name,
            header,
            body,
            version_number: self.version_number,
            release_date: self.release_date,
            ticket_numbers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: &str = "# Virtual Schema 2.3.0, released 2024-05-17

Code name: Faster uploads

## Summary

Uploads are now streamed.

## Features

* #12: Streamed uploads
* #7: Progress output, see also #12
";

    #[test]
    fn test_parse_full_letter() {
        let letter = ReleaseLetter::parse("changes_2.3.0.md", LETTER);
        assert_eq!(letter.file_name(), "changes_2.3.0.md");
        assert_eq!(letter.version_number(), Some("2.3.0"));
        assert_eq!(
            letter.release_date(),
            NaiveDate::from_ymd_opt(2024, 5, 17)
        );
        assert_eq!(letter.header(), Some("Faster uploads"));
        assert!(letter.body().unwrap().starts_with("## Summary"));
        assert_eq!(letter.ticket_numbers(), &[12, 7, 12]);
        assert_eq!(letter.summary().as_deref(), Some("Uploads are now streamed."));
    }

    #[test]
    fn test_parse_without_date_or_code_name() {
        let letter = ReleaseLetter::parse("changes_1.0.0.md", "# Project 1.0.0, released ????-??-??\n\n## Features\n* #3: x");
        assert_eq!(letter.version_number(), Some("1.0.0"));
        assert_eq!(letter.release_date(), None);
        assert_eq!(letter.header(), None);
        assert_eq!(letter.ticket_numbers(), &[3]);
        assert_eq!(letter.summary(), None);
    }

    #[test]
    fn test_parse_empty_file() {
        let letter = ReleaseLetter::parse("changes_1.0.0.md", "");
        assert_eq!(letter.version_number(), None);
        assert_eq!(letter.header(), None);
        assert_eq!(letter.body(), None);
        assert!(letter.ticket_numbers().is_empty());
    }

    #[test]
    fn test_ticket_zero_and_prefixed_zero_are_ignored() {
        let letter = ReleaseLetter::builder("changes_1.0.0.md")
            .body("#0 and #012 are not tickets, #15 is")
            .build();
        assert_eq!(letter.ticket_numbers(), &[15]);
    }

    #[test]
    fn test_builder_extracts_tickets_from_body() {
        let letter = ReleaseLetter::builder("changes_1.0.0.md")
            .body("* #4: fixed\n* #9: added")
            .build();
        assert_eq!(letter.ticket_numbers(), &[4, 9]);
    }

    #[test]
    fn test_builder_blank_values_are_absent() {
        let letter = ReleaseLetter::builder("changes_1.0.0.md")
            .header("   ")
            .body("\n\n")
            .build();
        assert_eq!(letter.header(), None);
        assert_eq!(letter.body(), None);
    }

    #[test]
    fn test_summary_stops_at_next_section() {
        let letter = ReleaseLetter::builder("changes_0.1.0.md")
            .body("## Summary \nHere is a short summary. \n## Feature")
            .build();
        assert_eq!(letter.summary().as_deref(), Some("Here is a short summary."));
    }
}
