// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading lists of tests, and the formats selections are written out in.

use crate::errors::TestListReadError;
use camino::Utf8Path;
use owo_colors::Style;
use serde::Serialize;
use std::io;
use testsieve_metadata::{TestCase, TestListSummary};
use tracing::debug;

/// Reads a JSON test list from `path`.
pub fn read_test_list(path: &Utf8Path) -> Result<Vec<TestCase>, TestListReadError> {
    let contents = std::fs::read_to_string(path).map_err(|error| TestListReadError::Read {
        path: path.to_owned(),
        error,
    })?;
    let summary =
        TestListSummary::parse_json(&contents).map_err(|error| TestListReadError::Parse {
            path: path.to_owned(),
            error,
        })?;
    debug!("read {} tests from {path}", summary.tests.len());
    Ok(summary.tests)
}

/// Output formats for testsieve.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum OutputFormat {
    /// A human-readable output format.
    Human {
        /// Whether to produce verbose output.
        verbose: bool,
    },

    /// Machine-readable output format.
    Serializable(SerializableFormat),
}

/// A serialized, machine-readable output format.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum SerializableFormat {
    /// JSON with no whitespace.
    Json,
    /// JSON, prettified.
    JsonPretty,
}

impl SerializableFormat {
    /// Write this data in the given format to the writer.
    pub fn to_writer(
        self,
        value: &impl Serialize,
        writer: impl io::Write,
    ) -> serde_json::Result<()> {
        match self {
            SerializableFormat::Json => serde_json::to_writer(writer, value),
            SerializableFormat::JsonPretty => serde_json::to_writer_pretty(writer, value),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Styles {
    pub(crate) package: Style,
    pub(crate) class_name: Style,
    pub(crate) method: Style,
    pub(crate) annotation: Style,
    pub(crate) skipped: Style,
    pub(crate) count: Style,
}

impl Styles {
    pub(crate) fn colorize(&mut self) {
        self.package = Style::new().cyan();
        self.class_name = Style::new().magenta().bold();
        self.method = Style::new().blue().bold();
        self.annotation = Style::new().yellow();
        self.skipped = Style::new().dimmed();
        self.count = Style::new().bold();
    }
}
