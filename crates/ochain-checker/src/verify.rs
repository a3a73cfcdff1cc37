//! Expected-diagnostic verification for annotated fixtures.
//!
//! A fixture marks the diagnostics it expects in comments on the offending
//! line:
//!
//! ```text
//! immT?.mutateT() // expected-error{{E402}}
//! ++s?.x          // expected-error{{'Int?'}}
//! x               // expected-warning{{E500}}
//! // expected-error@+1{{E401}}
//! s?.y -= 0
//! ```
//!
//! The text between `{{` and `}}` matches a diagnostic of the same severity
//! on the target line when it equals the diagnostic's code or occurs in its
//! message. `@+N` / `@-N` shift the target line.

use std::fmt;

use ochain_types::{Diagnostic, ErrorCode, Severity};
use serde::Serialize;
use tracing::debug;

use crate::options::{CheckOptions, OptionsError};

const MARKERS: [(&str, Severity); 2] = [
    ("expected-error", Severity::Error),
    ("expected-warning", Severity::Warning),
];

/// One `expected-*{{...}}` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expectation {
    /// The line the diagnostic is expected on.
    pub line: u32,
    pub severity: Severity,
    pub text: String,
}

impl Expectation {
    fn matches(&self, diagnostic: &Diagnostic) -> bool {
        self.severity == diagnostic.severity
            && self.line == diagnostic.span.start_line
            && (self.text.parse::<ErrorCode>() == Ok(diagnostic.code)
                || diagnostic.message.contains(&self.text))
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "line {}: expected {} {{{{{}}}}}", self.line, kind, self.text)
    }
}

/// The outcome of verifying a fixture.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub file: String,
    pub options: CheckOptions,
    /// Annotations that found their diagnostic.
    pub matched: usize,
    /// Diagnostics no annotation asked for.
    pub unexpected: Vec<Diagnostic>,
    /// Annotations with no matching diagnostic.
    pub missing: Vec<Expectation>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.unexpected.is_empty() && self.missing.is_empty()
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "{}: {} expectation(s) verified", self.file, self.matched);
        }
        for diagnostic in &self.unexpected {
            writeln!(f, "unexpected: {diagnostic}")?;
        }
        for expectation in &self.missing {
            writeln!(f, "{}: missing: {expectation}", self.file)?;
        }
        Ok(())
    }
}

/// Collect every annotation in `source`, in order.
pub fn parse_expectations(source: &str) -> Vec<Expectation> {
    let mut expectations = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line_no = i64::try_from(index).map_or(i64::MAX, |i| i.saturating_add(1));
        let Some(comment) = line.find("//").map(|at| &line[at..]) else {
            continue;
        };
        let mut rest = comment;
        while let Some((at, marker, severity)) = next_marker(rest) {
            rest = &rest[at + marker.len()..];
            let (offset, after) = split_offset(rest);
            let Some(body) = after.strip_prefix("{{") else {
                continue;
            };
            let Some(end) = body.find("}}") else {
                break;
            };
            // Targets before line 1 or past u32::MAX name no line.
            let target = line_no
                .checked_add(offset)
                .and_then(|t| u32::try_from(t).ok())
                .filter(|&t| t >= 1);
            if let Some(line) = target {
                expectations.push(Expectation {
                    line,
                    severity,
                    text: body[..end].to_string(),
                });
            }
            rest = &body[end + 2..];
        }
    }
    expectations
}

/// The earliest marker in `text`.
fn next_marker(text: &str) -> Option<(usize, &'static str, Severity)> {
    MARKERS
        .iter()
        .filter_map(|&(marker, severity)| text.find(marker).map(|at| (at, marker, severity)))
        .min_by_key(|&(at, _, _)| at)
}

/// Split an optional `@+N` / `@-N` line offset off the front of `text`.
fn split_offset(text: &str) -> (i64, &str) {
    let Some(digits) = text.strip_prefix('@') else {
        return (0, text);
    };
    let end = digits
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '+' || c == '-'))))
        .map_or(digits.len(), |(i, _)| i);
    match digits[..end].parse::<i64>() {
        Ok(offset) => (offset, &digits[end..]),
        Err(_) => (0, text),
    }
}

/// Check `source` with the options from its `RUN:` line and compare the
/// diagnostics against its annotations.
pub fn verify(source: &str, file: &str) -> Result<VerifyReport, OptionsError> {
    let options = CheckOptions::from_source(source)?;
    let result = crate::check_source(source, file, &options);
    let mut pending = parse_expectations(source);
    let mut matched = 0;
    let mut unexpected = Vec::new();

    for diagnostic in result.diagnostics.iter() {
        match pending.iter().position(|e| e.matches(diagnostic)) {
            Some(index) => {
                pending.remove(index);
                matched += 1;
            }
            None => unexpected.push(diagnostic.clone()),
        }
    }
    debug!(
        file,
        matched,
        unexpected = unexpected.len(),
        missing = pending.len(),
        "verified"
    );
    Ok(VerifyReport {
        file: file.to_string(),
        options,
        matched,
        unexpected,
        missing: pending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_annotations_with_offsets() {
        let src = "a // expected-error{{E401}}\n\
                   // expected-warning@+1{{unused}}\n\
                   b\n\
                   c // expected-error@-2{{x}} expected-error{{y}}\n";
        let got = parse_expectations(src);
        assert_eq!(
            got,
            vec![
                Expectation {
                    line: 1,
                    severity: Severity::Error,
                    text: "E401".into()
                },
                Expectation {
                    line: 3,
                    severity: Severity::Warning,
                    text: "unused".into()
                },
                Expectation {
                    line: 2,
                    severity: Severity::Error,
                    text: "x".into()
                },
                Expectation {
                    line: 4,
                    severity: Severity::Error,
                    text: "y".into()
                },
            ]
        );
    }

    #[test]
    fn ignores_malformed_annotations() {
        assert!(parse_expectations("x // expected-error E401").is_empty());
        assert!(parse_expectations("x // expected-error{{E401").is_empty());
        assert!(parse_expectations("expected-error{{E401}}").is_empty());
        assert!(parse_expectations("// expected-error@-5{{E401}}").is_empty());
    }

    #[test]
    fn out_of_range_offsets_are_dropped() {
        assert!(parse_expectations("// expected-error@+9223372036854775807{{E401}}").is_empty());
        assert!(parse_expectations("a\n// expected-error@-9223372036854775808{{E401}}").is_empty());
        assert!(parse_expectations("// expected-error@+4294967296{{E401}}").is_empty());
        // Too large for i64: not an offset, so not an annotation either.
        assert!(parse_expectations("// expected-error@+99999999999999999999{{E401}}").is_empty());
        assert_eq!(
            parse_expectations("// expected-error@+4294967294{{E401}}"),
            vec![Expectation {
                line: u32::MAX,
                severity: Severity::Error,
                text: "E401".into()
            }]
        );
    }

    #[test]
    fn code_annotations_match_by_code() {
        let diagnostic = Diagnostic::new(
            "f.och",
            ErrorCode::CANNOT_ASSIGN_IMMUTABLE,
            "cannot assign to immutable member 'y'",
            ochain_types::Span::point(2, 1),
            "s?.y = 1",
        );
        let expect = |text: &str| Expectation {
            line: 2,
            severity: Severity::Error,
            text: text.into(),
        };
        assert!(expect("E401").matches(&diagnostic));
        assert!(expect("immutable member").matches(&diagnostic));
        assert!(!expect("E402").matches(&diagnostic));
        assert!(!expect("E9999").matches(&diagnostic));
    }

    #[test]
    fn offsets() {
        assert_eq!(split_offset("@+2{{x}}"), (2, "{{x}}"));
        assert_eq!(split_offset("@-1{{x}}"), (-1, "{{x}}"));
        assert_eq!(split_offset("@{{x}}"), (0, "@{{x}}"));
        assert_eq!(split_offset("{{x}}"), (0, "{{x}}"));
    }

    #[test]
    fn report_display_lists_problems() {
        let report = VerifyReport {
            file: "f.och".into(),
            options: CheckOptions::default(),
            matched: 0,
            unexpected: vec![],
            missing: vec![Expectation {
                line: 3,
                severity: Severity::Error,
                text: "E401".into(),
            }],
        };
        assert!(!report.is_ok());
        assert_eq!(
            report.to_string(),
            "f.och: missing: line 3: expected error {{E401}}\n"
        );
    }
}
