// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by testsieve-runner.

use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use std::io;
use testsieve_filtering::{
    FilterListKind,
    errors::{FilterCompileError, InvalidFilterError},
};
use thiserror::Error;

/// An error that occurred while parsing the filter config.
#[derive(Debug, Error)]
#[error("failed to parse filter config at `{config_file}`")]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of filter config parse error that occurred.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),

    /// A rule in the config was invalid.
    #[error(transparent)]
    InvalidFilter(#[from] InvalidFilterError),
}

/// An error that occurred while compiling the rules of a filter specification.
#[derive(Debug, Error)]
#[error("failed to compile {list}[{index}]")]
pub struct SelectorBuildError {
    /// The list containing the rule.
    pub list: FilterListKind,

    /// The position of the rule within the list.
    pub index: usize,

    /// The underlying error.
    #[source]
    pub error: FilterCompileError,
}

/// An error that occurred while reading a list of tests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TestListReadError {
    /// The file could not be read.
    #[error("failed to read test list from `{path}`")]
    Read {
        /// The path to the test list.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The file was read, but its contents were not a valid test list.
    #[error("failed to parse test list at `{path}`")]
    Parse {
        /// The path to the test list.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },
}

/// An error that occurred while writing a selection to the provided output.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteSelectionError {
    /// An error occurred while writing the list to the provided output.
    #[error("error writing to output")]
    Io(#[source] io::Error),

    /// An error occurred while serializing JSON, or while writing it to the provided output.
    #[error("error serializing to JSON")]
    Json(#[source] serde_json::Error),
}
