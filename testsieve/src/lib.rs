// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line interface for testsieve.
//!
//! testsieve reads a list of tests discovered by some other tool, applies the allowlist and
//! blocklist rules from a filter config, and prints the tests that were selected.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{Color, OutputContext, StderrStyles};
