// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while validating and compiling filter rules.

use crate::rule::{FilterKind, FilterListKind, MatchSourceKind};
use camino::Utf8PathBuf;
use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;

/// A filter rule violates one of its invariants.
///
/// Produced by [`FilterRule::validate`](crate::FilterRule::validate). Validation is fail-fast, so
/// only the first violation is reported.
#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// None of `regex`, `values` or `file` was specified.
    #[error("at least one of [regex, values, file] must be specified for {kind} filter")]
    #[diagnostic(help("specify exactly one of `regex`, `values` or `file`"))]
    NoMatchSource {
        /// The kind of filter.
        kind: FilterKind,
    },

    /// More than one of `regex`, `values` or `file` was specified.
    #[error(
        "only one of [regex, values, file] can be specified for {kind} filter (found: {})",
        found.iter().join(", ")
    )]
    #[diagnostic(help("split this into several filters combined with a composition"))]
    MultipleMatchSources {
        /// The kind of filter.
        kind: FilterKind,

        /// The match sources that were specified.
        found: Vec<MatchSourceKind>,
    },

    /// A fragment index was negative.
    #[error("fragment index [{index}] must be >= 0")]
    NegativeFragmentIndex {
        /// The index that was specified.
        index: i32,
    },

    /// A fragment count was negative.
    #[error("fragment count [{count}] must be >= 0")]
    NegativeFragmentCount {
        /// The count that was specified.
        count: i32,
    },

    /// A fragment index was not less than the fragment count.
    #[error("fragment index [{index}] must be less than count [{count}]")]
    #[diagnostic(help("fragment indexes count up from 0"))]
    FragmentIndexOutOfRange {
        /// The index that was specified.
        index: i32,

        /// The count that was specified.
        count: i32,
    },
}

/// A rule inside a [`FilterSpecification`](crate::FilterSpecification) failed validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{list}[{index}] is invalid")]
pub struct InvalidFilterError {
    /// The list containing the rule.
    pub list: FilterListKind,

    /// The position of the rule within the list.
    pub index: usize,

    /// The underlying validation error.
    #[source]
    pub error: ConfigurationError,
}

/// An error that occurred while compiling a [`FilterRule`](crate::FilterRule).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FilterCompileError {
    /// The rule failed validation.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The file listing values for a rule could not be read.
    #[error("failed to read values for {kind} filter from `{path}`")]
    ReadFile {
        /// The kind of filter.
        kind: FilterKind,

        /// The path that was read, after resolving it against the base directory.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },
}

/// An invalid regular expression was specified in a filter rule.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid regex `{pattern}`: {message}")]
pub struct FilterRegexError {
    pattern: String,
    message: String,
}

impl FilterRegexError {
    pub(crate) fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    pub(crate) fn from_syntax(pattern: impl Into<String>, err: &regex_syntax::Error) -> Self {
        // Use the error kind rather than the full message: the full message reprints the pattern.
        let message = match err {
            regex_syntax::Error::Parse(err) => err.kind().to_string(),
            regex_syntax::Error::Translate(err) => err.kind().to_string(),
            other => other.to_string(),
        };
        Self::new(pattern, message)
    }

    /// Returns the pattern that failed to compile.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
