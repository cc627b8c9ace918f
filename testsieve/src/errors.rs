// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use owo_colors::OwoColorize;
use std::error::Error;
use testsieve_metadata::TestSieveExitCode;
use testsieve_runner::errors::*;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected error, which maps to a documented exit code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("selector build error")]
    SelectorBuildError {
        #[from]
        err: SelectorBuildError,
    },
    #[error("test list read error")]
    TestListReadError {
        #[from]
        err: TestListReadError,
    },
    #[error("error writing selection")]
    WriteSelectionError {
        #[from]
        err: WriteSelectionError,
    },
    #[error("error writing JSON output")]
    WriteJsonError {
        #[source]
        err: serde_json::Error,
    },
    #[error("error writing output")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
    #[error("no tests were selected")]
    NoTestsSelected,
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. } | Self::SelectorBuildError { .. } => {
                TestSieveExitCode::INVALID_FILTER_CONFIG
            }
            Self::TestListReadError { .. } => TestSieveExitCode::TEST_LIST_READ_FAILED,
            Self::WriteSelectionError { .. }
            | Self::WriteJsonError { .. }
            | Self::WriteOutputError { .. } => TestSieveExitCode::WRITE_OUTPUT_ERROR,
            Self::NoTestsSelected => TestSieveExitCode::NO_TESTS_SELECTED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigParseError { err } => match err.kind() {
                ConfigParseErrorKind::InvalidFilter(invalid) => {
                    error!(
                        "in config file `{}`, {invalid}:",
                        err.config_file().style(styles.bold)
                    );
                    let report = miette::Report::new(invalid.error.clone());
                    error!(target: NO_HEADING_TARGET, "{:?}", report);
                    None
                }
                kind => {
                    error!(
                        "failed to parse filter config at `{}`",
                        err.config_file().style(styles.bold)
                    );
                    Some(kind as &dyn Error)
                }
            },
            Self::SelectorBuildError { err } => {
                error!(
                    "failed to compile rule {}",
                    format!("{}[{}]", err.list, err.index).style(styles.bold)
                );
                Some(&err.error as &dyn Error)
            }
            Self::TestListReadError { err } => {
                error!("{err}");
                err.source()
            }
            Self::WriteSelectionError { err } => {
                error!("failed to write selection");
                Some(err as &dyn Error)
            }
            Self::WriteJsonError { err } => {
                error!("failed to write JSON output");
                Some(err as &dyn Error)
            }
            Self::WriteOutputError { err } => {
                error!("failed to write output");
                Some(err as &dyn Error)
            }
            Self::NoTestsSelected => {
                error!("no tests were selected (--fail-if-empty was passed)");
                None
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
