// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `testsieve` failures.
///
/// `testsieve` invocations may fail for a variety of reasons. This structure documents the exit
/// codes that may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum TestSieveExitCode {}

impl TestSieveExitCode {
    /// No errors occurred and testsieve exited normally.
    pub const OK: i32 = 0;

    /// No tests were selected, and `--fail-if-empty` was passed.
    pub const NO_TESTS_SELECTED: i32 = 4;

    /// A user issue happened while setting up a testsieve invocation.
    pub const SETUP_ERROR: i32 = 96;

    /// The filter configuration failed to load or was invalid.
    pub const INVALID_FILTER_CONFIG: i32 = 97;

    /// Reading the list of tests produced an error.
    pub const TEST_LIST_READ_FAILED: i32 = 104;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
