// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for testsieve.
//!
//! The basic flow of operations is:
//!
//! 1. A [`FilterConfig`](config::FilterConfig) is loaded and validated from a config file.
//! 2. A [`TestSelector`](selector::TestSelector) compiles its rules, reading any referenced files.
//! 3. A list of tests is read with [`read_test_list`](test_list::read_test_list) and passed to
//!    [`TestSelector::select`](selector::TestSelector::select).
//! 4. The resulting [`SelectedTests`](selector::SelectedTests) are written out.

pub mod config;
pub mod errors;
pub mod selector;
pub mod test_list;
