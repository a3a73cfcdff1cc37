//! Checker configuration.
//!
//! Options come from JSON (`{"optional-lvalues": false}`) or from the flags
//! on a fixture's `// RUN:` line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ochain_types::MAX_ERRORS;

/// Failure to load [`CheckOptions`].
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value '{value}' for flag '{flag}'")]
    InvalidFlagValue { flag: String, value: String },

    #[error("max-errors must be at least 1")]
    ZeroMaxErrors,
}

/// Options that change how chains and assignments are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CheckOptions {
    /// Locations reached through `?` stay assignable.
    pub optional_lvalues: bool,
    /// `=` accepts `X` for a target of type `X?` (any depth).
    pub optional_promotion: bool,
    /// Cap on stored errors per file.
    pub max_errors: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            optional_lvalues: true,
            optional_promotion: false,
            max_errors: MAX_ERRORS,
        }
    }
}

const RUN_MARKER: &str = "RUN:";

impl CheckOptions {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let options: CheckOptions = serde_json::from_str(json)?;
        options.validated()
    }

    /// Parse the flags of a `RUN:` line.
    ///
    /// Unrecognised `-` flags belong to other tools and are skipped, as is
    /// anything that is not a flag.
    pub fn from_run_line(line: &str) -> Result<Self, OptionsError> {
        let flags = match line.find(RUN_MARKER) {
            Some(at) => &line[at + RUN_MARKER.len()..],
            None => line,
        };
        let mut options = CheckOptions::default();
        for flag in flags.split_whitespace().filter(|f| f.starts_with('-')) {
            match flag {
                "-enable-optional-lvalues" => options.optional_lvalues = true,
                "-disable-optional-lvalues" => options.optional_lvalues = false,
                "-enable-optional-promotion" => options.optional_promotion = true,
                "-disable-optional-promotion" => options.optional_promotion = false,
                _ => {
                    if let Some(value) = flag.strip_prefix("-max-errors=") {
                        options.max_errors =
                            value
                                .parse()
                                .map_err(|_| OptionsError::InvalidFlagValue {
                                    flag: "-max-errors".to_string(),
                                    value: value.to_string(),
                                })?;
                    }
                }
            }
        }
        options.validated()
    }

    /// Options from the first `RUN:` comment line in `source`, or the
    /// defaults if there is none.
    pub fn from_source(source: &str) -> Result<Self, OptionsError> {
        source
            .lines()
            .map(str::trim_start)
            .find(|line| line.starts_with("//") && line.contains(RUN_MARKER))
            .map_or_else(|| Ok(CheckOptions::default()), Self::from_run_line)
    }

    fn validated(self) -> Result<Self, OptionsError> {
        if self.max_errors == 0 {
            return Err(OptionsError::ZeroMaxErrors);
        }
        Ok(self)
    }
}
